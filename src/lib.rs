#[macro_use]
mod macros;

pub mod app;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod entity;
pub mod error;
pub mod form;
pub mod remote;
pub mod store;
pub mod toast;
pub mod types;
pub mod view;

pub use app::{AppContext, Clients, StoreAccess};
pub use config::Config;
pub use entity::{Entity, FieldValue, Lead, Property, Task};
pub use error::{LeadflowError, Result};
pub use form::{EditMode, EditSession};
pub use remote::{CollectionClient, HttpClient, ListPage, ListQuery, MemoryCollection, Pagination};
pub use store::{CollectionSnapshot, EntityStore, FetchOutcome, RequestState, StorePolicy};
pub use types::{EntityKind, LeadStatus, PropertyStatus, StatusFilter, TaskPriority, TaskStatus};
pub use view::{TableView, ViewConfig, project};
