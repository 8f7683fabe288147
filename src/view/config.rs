//! Per-view search and sort settings.
//!
//! A [`ViewConfig`] belongs to one table on screen and is never persisted.

use crate::error::LeadflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

enum_display_fromstr!(
    SortDirection,
    LeadflowError::InvalidSortDirection,
    {
        Ascending => "asc",
        Descending => "desc",
    }
);

impl SortDirection {
    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header marker shown next to the sorted column.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

/// Sort by one column in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Search term plus optional sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewConfig {
    pub search: String,
    pub sort: Option<SortKey>,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Header click on `column`.
    ///
    /// Clicking the sorted column flips its direction; any other column
    /// becomes the sort key in ascending order.
    pub fn toggle_sort(&mut self, column: &str) {
        self.sort = Some(match self.sort.take() {
            Some(key) if key.column == column => SortKey {
                direction: key.direction.reversed(),
                ..key
            },
            _ => SortKey::ascending(column),
        });
    }

    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        self.sort
            .as_ref()
            .filter(|key| key.column == column)
            .map(|key| key.direction)
    }
}
