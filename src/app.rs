//! Application context.
//!
//! One [`AppContext`] is built at startup and passed to every command. It
//! owns the credential holder, the HTTP client and one store per entity
//! kind; nothing here lives in process-global state.

use std::sync::Arc;

use crate::auth::Credentials;
use crate::config::Config;
use crate::entity::{Entity, Lead, Property, Task};
use crate::error::{LeadflowError, Result};
use crate::remote::{CollectionClient, HttpClient, ListQuery};
use crate::store::{EntityStore, StorePolicy};
use crate::toast::Notifications;

#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: Config,
    pub credentials: Credentials,
    pub notifications: Notifications,
    pub leads: EntityStore<Lead>,
    pub properties: EntityStore<Property>,
    pub tasks: EntityStore<Task>,
    http: Option<HttpClient>,
}

/// Collaborators backing each store.
pub struct Clients {
    pub leads: Arc<dyn CollectionClient<Lead>>,
    pub properties: Arc<dyn CollectionClient<Property>>,
    pub tasks: Arc<dyn CollectionClient<Task>>,
}

impl AppContext {
    /// Build a context talking to the configured REST API.
    pub fn from_config(config: Config) -> Result<Self> {
        let credentials = Credentials::from_option(config.token());
        let http = HttpClient::from_config(&config, credentials.clone())?;
        let shared = Arc::new(http.clone());

        let clients = Clients {
            leads: shared.clone(),
            properties: shared.clone(),
            tasks: shared,
        };

        let mut context = Self::with_clients(config, credentials, clients);
        context.http = Some(http);
        Ok(context)
    }

    /// Build a context over explicit collaborators.
    pub fn with_clients(config: Config, credentials: Credentials, clients: Clients) -> Self {
        let policy = StorePolicy {
            keep_stale_on_error: config.keep_stale_on_error,
        };
        let notifications = Notifications::new();

        Self {
            leads: EntityStore::new(clients.leads, policy, notifications.clone()),
            properties: EntityStore::new(clients.properties, policy, notifications.clone()),
            tasks: EntityStore::new(clients.tasks, policy, notifications.clone()),
            config,
            credentials,
            notifications,
            http: None,
        }
    }

    /// The HTTP client, for endpoints outside the entity collections.
    pub fn http(&self) -> Result<&HttpClient> {
        self.http.as_ref().ok_or_else(|| {
            LeadflowError::Config("no REST API client is configured".to_string())
        })
    }

    pub fn store<E: StoreAccess>(&self) -> &EntityStore<E> {
        E::store(self)
    }

    /// Default list query for the configured page size.
    pub fn list_query(&self) -> ListQuery {
        ListQuery::default().limit(self.config.page_limit)
    }

    /// Fetch the first page of every collection concurrently.
    ///
    /// Every fetch runs to completion; the first failure is returned.
    pub async fn refresh_all(&self) -> Result<()> {
        let query = self.list_query();
        let (leads, properties, tasks) = futures::join!(
            self.leads.fetch(&query),
            self.properties.fetch(&query),
            self.tasks.fetch(&query),
        );
        leads?;
        properties?;
        tasks?;
        Ok(())
    }
}

/// Entity kinds with a store in [`AppContext`].
pub trait StoreAccess: Entity {
    fn store(context: &AppContext) -> &EntityStore<Self>;
}

impl StoreAccess for Lead {
    fn store(context: &AppContext) -> &EntityStore<Self> {
        &context.leads
    }
}

impl StoreAccess for Property {
    fn store(context: &AppContext) -> &EntityStore<Self> {
        &context.properties
    }
}

impl StoreAccess for Task {
    fn store(context: &AppContext) -> &EntityStore<Self> {
        &context.tasks
    }
}
