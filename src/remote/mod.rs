//! Remote collection client.
//!
//! A [`CollectionClient`] performs paginated list, create, update and delete
//! requests for one entity kind against the CRM REST API. Clients never touch
//! a store: they return the server's representation (or an error carrying a
//! user-facing message) and the caller decides what to do with it.
//!
//! Two implementations are provided:
//! - [`HttpClient`]: the reqwest-backed client used by the CLI
//! - [`MemoryCollection`]: an in-process collection with the same contract

pub mod analytics;
pub mod error;
pub mod http;
pub mod memory;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::entity::Entity;
use crate::error::Result;
use crate::types::{DEFAULT_PAGE_LIMIT, EntityKind};

pub use analytics::{DashboardStats, LeadAnalytics, MonthlyLeads, PropertyAnalytics, Slice};
pub use http::HttpClient;
pub use memory::MemoryCollection;

/// Field map sent as a create or update body.
pub type Fields = Map<String, Value>;

/// Contract shared by every collaborator serving one entity kind.
///
/// Each call makes a single attempt. Nothing is retried.
#[async_trait]
pub trait CollectionClient<E: Entity>: Send + Sync {
    /// Fetch one page of the collection.
    async fn list(&self, query: &ListQuery) -> Result<ListPage<E>>;

    /// Create a record and return the server's representation.
    async fn create(&self, fields: &Fields) -> Result<E>;

    /// Apply a partial update and return the full updated record.
    async fn update(&self, id: &str, fields: &Fields) -> Result<E>;

    /// Delete a record, returning the id that was deleted.
    async fn delete(&self, id: &str) -> Result<String>;
}

/// The client operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Message shown when the server gives no `detail`.
    pub fn fallback_message(&self, kind: EntityKind) -> String {
        match self {
            Operation::List => format!("Failed to fetch {}", kind.collection()),
            Operation::Create => format!("Failed to create {}", kind.singular()),
            Operation::Update => format!("Failed to update {}", kind.singular()),
            Operation::Delete => format!("Failed to delete {}", kind.singular()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::List => write!(f, "list"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Filter for a list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            search: None,
            status: None,
        }
    }
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Query-string pairs for the given collection.
    ///
    /// Tasks are filtered by `status` only, which defaults to `all`. Leads
    /// and properties take `search`, plus `status` when one is given. Blank
    /// values are left out.
    pub fn to_pairs(&self, kind: EntityKind) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];

        if kind == EntityKind::Task {
            let status = non_blank(&self.status).unwrap_or("all");
            pairs.push(("status", status.to_string()));
            return pairs;
        }

        if let Some(search) = non_blank(&self.search) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(status) = non_blank(&self.status) {
            pairs.push(("status", status.to_string()));
        }

        pairs
    }

    /// Status filter, with `all` treated as no filter.
    pub fn status_filter(&self) -> Option<&str> {
        non_blank(&self.status).filter(|s| !s.eq_ignore_ascii_case("all"))
    }

    pub fn search_term(&self) -> Option<&str> {
        non_blank(&self.search)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Pagination metadata reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            total: 0,
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<E> {
    pub items: Vec<E>,
    /// `None` when the response carried no pagination block.
    pub pagination: Option<Pagination>,
    pub total: u64,
}

impl<E: Entity> ListPage<E> {
    /// Decode a `{ <collection>: [...], pagination, total }` response body.
    ///
    /// A missing collection key yields an empty page and a missing `total`
    /// reads as zero.
    pub fn from_response(body: Value) -> serde_json::Result<Self> {
        let Value::Object(mut body) = body else {
            return Ok(ListPage {
                items: Vec::new(),
                pagination: None,
                total: 0,
            });
        };

        let items = match body.remove(E::KIND.collection()) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<std::result::Result<Vec<E>, _>>()?,
            _ => Vec::new(),
        };

        let pagination = match body.remove("pagination") {
            Some(value @ Value::Object(_)) => Some(serde_json::from_value(value)?),
            _ => None,
        };

        let total = body.get("total").and_then(Value::as_u64).unwrap_or(0);

        Ok(ListPage {
            items,
            pagination,
            total,
        })
    }
}
