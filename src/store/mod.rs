//! Client-side cache of one entity collection.
//!
//! [`EntityStore`] wraps a [`CollectionClient`] and keeps the last confirmed
//! snapshot of its collection along with the status of the latest request.
//! Each operation records its start and outcome through the pure reducer in
//! [`model`]; the state lock is only held while an action is applied, never
//! across a network call.
//!
//! Operations are not queued. Two concurrent updates of the same record race
//! and the one that resolves last wins. List requests carry a sequence
//! number, so a superseded list response is discarded instead of overwriting
//! newer data.

pub mod model;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::entity::Entity;
use crate::error::{LeadflowError, Result};
use crate::remote::{CollectionClient, Fields, ListQuery, Operation};
use crate::toast::{Notifications, Toast};
use crate::types::EntityKind;

pub use model::{
    CollectionSnapshot, RequestState, StoreAction, StorePolicy, StoreState, reduce_store_state,
};

/// Result of a list fetch that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response replaced the snapshot
    Applied,
    /// A newer list request was issued meanwhile; the response was dropped
    Superseded,
}

/// Async façade over the store reducer. Clones share state.
#[derive(Clone)]
pub struct EntityStore<E: Entity> {
    state: Arc<Mutex<StoreState<E>>>,
    client: Arc<dyn CollectionClient<E>>,
    policy: StorePolicy,
    notifications: Notifications,
}

impl<E: Entity> std::fmt::Debug for EntityStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &E::KIND)
            .field("state", &*self.state.lock())
            .field("policy", &self.policy)
            .finish()
    }
}

impl<E: Entity> EntityStore<E> {
    pub fn new(
        client: Arc<dyn CollectionClient<E>>,
        policy: StorePolicy,
        notifications: Notifications,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState::default())),
            client,
            policy,
            notifications,
        }
    }

    pub fn kind(&self) -> EntityKind {
        E::KIND
    }

    pub fn policy(&self) -> StorePolicy {
        self.policy
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    /// Copy of the current state.
    pub fn state(&self) -> StoreState<E> {
        self.state.lock().clone()
    }

    pub fn snapshot(&self) -> CollectionSnapshot<E> {
        self.state.lock().snapshot.clone()
    }

    pub fn request_state(&self) -> RequestState {
        self.state.lock().request.clone()
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.state.lock().snapshot.get(id).cloned()
    }

    fn dispatch(&self, action: StoreAction<E>) {
        let mut guard = self.state.lock();
        let current = std::mem::take(&mut *guard);
        *guard = reduce_store_state(current, action, &self.policy);
    }

    fn report(&self, operation: Operation, error: &LeadflowError) {
        warn!(kind = %E::KIND, %operation, %error, "store operation failed");
        self.notifications.push(Toast::error(error.user_message()));
    }

    /// Fetch one page and replace the snapshot with it.
    ///
    /// A failure records the error (keeping or clearing the previous data
    /// per [`StorePolicy`]) and is returned. Responses to a superseded request
    /// are dropped whether they succeeded or failed.
    pub async fn fetch(&self, query: &ListQuery) -> Result<FetchOutcome> {
        let seq = {
            let mut guard = self.state.lock();
            let seq = guard.latest_list_seq + 1;
            let current = std::mem::take(&mut *guard);
            *guard = reduce_store_state(current, StoreAction::ListPending { seq }, &self.policy);
            seq
        };
        debug!(kind = %E::KIND, seq, "list issued");

        let result = self.client.list(query).await;

        let latest = self.state.lock().latest_list_seq;
        if seq != latest {
            debug!(kind = %E::KIND, seq, latest, "list response superseded");
            return Ok(FetchOutcome::Superseded);
        }

        match result {
            Ok(page) => {
                self.dispatch(StoreAction::ListFulfilled { seq, page });
                Ok(FetchOutcome::Applied)
            }
            Err(error) => {
                self.dispatch(StoreAction::ListRejected {
                    seq,
                    message: error.user_message(),
                });
                self.report(Operation::List, &error);
                Err(error)
            }
        }
    }

    /// Create a record; on success it becomes the first item of the snapshot.
    pub async fn create(&self, fields: &Fields) -> Result<E> {
        self.dispatch(StoreAction::CreatePending);

        match self.client.create(fields).await {
            Ok(entity) => {
                debug!(kind = %E::KIND, id = entity.id(), "create resolved");
                self.dispatch(StoreAction::CreateFulfilled(entity.clone()));
                Ok(entity)
            }
            Err(error) => {
                self.dispatch(StoreAction::CreateRejected(error.user_message()));
                self.report(Operation::Create, &error);
                Err(error)
            }
        }
    }

    /// Update a record; on success the server's representation replaces the
    /// cached one at the same position.
    pub async fn update(&self, id: &str, fields: &Fields) -> Result<E> {
        match self.client.update(id, fields).await {
            Ok(entity) => {
                debug!(kind = %E::KIND, id, "update resolved");
                self.dispatch(StoreAction::UpdateFulfilled(entity.clone()));
                Ok(entity)
            }
            Err(error) => {
                self.dispatch(StoreAction::UpdateRejected(error.user_message()));
                self.report(Operation::Update, &error);
                Err(error)
            }
        }
    }

    /// Delete a record; on success it is removed from the snapshot.
    pub async fn delete(&self, id: &str) -> Result<String> {
        match self.client.delete(id).await {
            Ok(deleted) => {
                debug!(kind = %E::KIND, id = %deleted, "delete resolved");
                self.dispatch(StoreAction::DeleteFulfilled(deleted.clone()));
                Ok(deleted)
            }
            Err(error) => {
                self.dispatch(StoreAction::DeleteRejected(error.user_message()));
                self.report(Operation::Delete, &error);
                Err(error)
            }
        }
    }

    pub fn clear_error(&self) {
        self.dispatch(StoreAction::ClearError);
    }
}
