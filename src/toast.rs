//! Transient notifications.
//!
//! Every failed store operation pushes one error toast. Commands add warnings
//! and confirmations of their own. The front end drains the queue after each
//! command and prints whatever is pending.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Toasts older than this are dropped on the next drain.
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Maximum number of pending toasts; the oldest is evicted first.
pub const MAX_PENDING_TOASTS: usize = 16;

/// A toast notification message
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    pub timestamp: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Warning,
    Error,
    Success,
}

impl Toast {
    pub fn new(message: String, level: ToastLevel) -> Self {
        Self {
            message,
            level,
            timestamp: Instant::now(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Warning)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Error)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message.into(), ToastLevel::Success)
    }

    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.timestamp.elapsed() >= ttl
    }

    /// Colored single-line rendering for the terminal.
    pub fn render(&self) -> String {
        match self.level {
            ToastLevel::Warning => format!("{} {}", "warning:".yellow(), self.message),
            ToastLevel::Error => format!("{} {}", "error:".red().bold(), self.message),
            ToastLevel::Success => format!("{} {}", "ok:".green(), self.message),
        }
    }
}

/// Shared queue of pending toasts.
///
/// Clones share the same queue, so every store in an application context
/// reports into one place.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: Arc<Mutex<VecDeque<Toast>>>,
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, toast: Toast) {
        let mut queue = self.queue.lock();
        if queue.len() >= MAX_PENDING_TOASTS {
            queue.pop_front();
        }
        queue.push_back(toast);
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Most recent toast without removing it.
    pub fn latest(&self) -> Option<Toast> {
        self.queue.lock().back().cloned()
    }

    /// Take every pending toast that has not expired, oldest first.
    pub fn drain(&self, ttl: Duration) -> Vec<Toast> {
        self.queue
            .lock()
            .drain(..)
            .filter(|toast| !toast.is_expired(ttl))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_level() {
        assert_eq!(Toast::warning("a").level, ToastLevel::Warning);
        assert_eq!(Toast::error("a").level, ToastLevel::Error);
        assert_eq!(Toast::success("a").level, ToastLevel::Success);
    }

    #[test]
    fn test_render_contains_message() {
        let toast = Toast::error("Failed to fetch leads");
        assert!(toast.render().contains("Failed to fetch leads"));
    }

    #[test]
    fn test_queue_is_bounded() {
        let notifications = Notifications::new();
        for i in 0..(MAX_PENDING_TOASTS + 3) {
            notifications.push(Toast::warning(format!("toast {i}")));
        }
        assert_eq!(notifications.len(), MAX_PENDING_TOASTS);

        let drained = notifications.drain(TOAST_TTL);
        assert_eq!(drained.first().unwrap().message, "toast 3");
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_drain_drops_expired() {
        let notifications = Notifications::new();
        notifications.push(Toast::error("stale"));
        assert!(notifications.drain(Duration::ZERO).is_empty());
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_clones_share_queue() {
        let notifications = Notifications::new();
        let shared = notifications.clone();
        shared.push(Toast::warning("heads up"));
        assert_eq!(notifications.latest().unwrap().message, "heads up");
    }
}
