//! Bearer credential holder.
//!
//! A [`Credentials`] instance is created once per application context and
//! handed to the HTTP client, which reads it on every request. Logging in or
//! out swaps the token in place; nothing is stored in process-global state.
//!
//! The token never appears in `Debug` or `Display` output. The header built
//! from it is wrapped in [`RedactedHeader`] and marked sensitive so reqwest
//! also redacts it from its own request logging.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretBox};

use crate::error::{LeadflowError, Result};

/// Shared, swappable bearer token.
#[derive(Clone, Default)]
pub struct Credentials {
    token: Arc<RwLock<Option<SecretBox<String>>>>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let credentials = Self::new();
        credentials.set(token);
        credentials
    }

    /// Build from an optional token, e.g. the configured one.
    pub fn from_option(token: Option<String>) -> Self {
        match token {
            Some(token) => Self::with_token(token),
            None => Self::new(),
        }
    }

    /// Install a token. Empty tokens clear the holder.
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        let mut guard = self.token.write();
        *guard = if token.is_empty() {
            None
        } else {
            Some(SecretBox::new(Box::new(token)))
        };
    }

    pub fn clear(&self) {
        *self.token.write() = None;
    }

    pub fn is_set(&self) -> bool {
        self.token.read().is_some()
    }

    /// The `Authorization` header for the current token, if any.
    pub fn authorization(&self) -> Option<RedactedHeader> {
        self.token
            .read()
            .as_ref()
            .map(|token| RedactedHeader::bearer(token.expose_secret()))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &self.is_set().then_some("[REDACTED]"))
            .finish()
    }
}

/// Wrapper for an `Authorization` header value that redacts itself when
/// formatted.
pub struct RedactedHeader {
    value: SecretBox<String>,
}

impl RedactedHeader {
    fn bearer(token: &str) -> Self {
        Self {
            value: SecretBox::new(Box::new(format!("Bearer {token}"))),
        }
    }

    pub fn as_header_value(&self) -> Result<HeaderValue> {
        let mut value = HeaderValue::from_str(self.value.expose_secret()).map_err(|_| {
            LeadflowError::Auth("bearer token contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Display for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Debug for RedactedHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedactedHeader")
            .field("value", &"[REDACTED]")
            .finish()
    }
}
