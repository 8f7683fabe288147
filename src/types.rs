use std::fmt;

use crate::error::LeadflowError;

/// Directory holding the local configuration file.
pub const LEADFLOW_DIR: &str = ".leadflow";

/// Default page size for list requests.
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// The CRM object kinds served by the REST collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Lead,
    Property,
    Task,
}

impl EntityKind {
    /// Collection path segment and response key (`leads`, `properties`, `tasks`).
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Lead => "leads",
            EntityKind::Property => "properties",
            EntityKind::Task => "tasks",
        }
    }

    /// Singular noun used in user-facing messages.
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Property => "property",
            EntityKind::Task => "task",
        }
    }

    /// Statuses this client knows for the kind, in workflow order.
    pub fn known_statuses(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Lead => LeadStatus::ALL_STRINGS,
            EntityKind::Property => PropertyStatus::ALL_STRINGS,
            EntityKind::Task => TaskStatus::ALL_STRINGS,
        }
    }

    /// Canonical form of a status filter for this kind.
    ///
    /// `all` and known statuses are lowercased. Anything else is sent as
    /// typed, minus surrounding whitespace.
    pub fn parse_status(&self, status: &str) -> StatusFilter {
        let trimmed = status.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return StatusFilter::Known("all".to_string());
        }
        let known = match self {
            EntityKind::Lead => trimmed.parse::<LeadStatus>().map(|s| s.as_str()),
            EntityKind::Property => trimmed.parse::<PropertyStatus>().map(|s| s.as_str()),
            EntityKind::Task => trimmed.parse::<TaskStatus>().map(|s| s.as_str()),
        };
        match known {
            Ok(canonical) => StatusFilter::Known(canonical.to_string()),
            Err(_) => StatusFilter::Unlisted(trimmed.to_string()),
        }
    }
}

/// A parsed status filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    Known(String),
    /// Not a status this client knows; the server may still have records with it
    Unlisted(String),
}

impl StatusFilter {
    pub fn into_string(self) -> String {
        match self {
            StatusFilter::Known(s) | StatusFilter::Unlisted(s) => s,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Won,
    Lost,
}

enum_display_fromstr!(
    LeadStatus,
    LeadflowError::InvalidStatus,
    {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Won => "won",
        Lost => "lost",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyStatus {
    #[default]
    Available,
    Pending,
    Sold,
    Rented,
}

enum_display_fromstr!(
    PropertyStatus,
    LeadflowError::InvalidStatus,
    {
        Available => "available",
        Pending => "pending",
        Sold => "sold",
        Rented => "rented",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

enum_display_fromstr!(
    TaskStatus,
    LeadflowError::InvalidStatus,
    {
        Pending => "pending",
        InProgress => "in_progress",
        Completed => "completed",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

enum_display_fromstr!(
    TaskPriority,
    LeadflowError::InvalidPriority,
    {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
);
