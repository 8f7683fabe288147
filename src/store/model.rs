//! Entity store model types for testable state management
//!
//! The store's state only changes through [`reduce_store_state`], a pure
//! function of the previous state and one completed (or started) client
//! operation. The async façade in the parent module issues requests and feeds
//! their outcomes through here.

use tracing::debug;

use crate::entity::Entity;
use crate::remote::{ListPage, Pagination};

// ============================================================================
// State Types
// ============================================================================

/// Status of the most recent request. Independent of the snapshot: data may
/// be visible while `Loading` or next to an `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Error(String),
}

impl RequestState {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Records of one kind as last confirmed by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionSnapshot<E> {
    pub items: Vec<E>,
    pub pagination: Pagination,
    /// Server-reported record count, adjusted locally on create and delete
    pub total: u64,
}

impl<E> Default for CollectionSnapshot<E> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            total: 0,
        }
    }
}

impl<E: Entity> CollectionSnapshot<E> {
    pub fn get(&self, id: &str) -> Option<&E> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// What happens to visible data when a list request fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePolicy {
    /// Keep the previous snapshot on a failed list. When `false` the
    /// snapshot is emptied instead.
    pub keep_stale_on_error: bool,
}

impl Default for StorePolicy {
    fn default() -> Self {
        Self {
            keep_stale_on_error: true,
        }
    }
}

/// Full state of one entity store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreState<E> {
    pub snapshot: CollectionSnapshot<E>,
    pub request: RequestState,
    /// Sequence number of the most recently issued list request
    pub latest_list_seq: u64,
}

impl<E> Default for StoreState<E> {
    fn default() -> Self {
        Self {
            snapshot: CollectionSnapshot::default(),
            request: RequestState::Idle,
            latest_list_seq: 0,
        }
    }
}

// ============================================================================
// Action Types
// ============================================================================

/// Lifecycle events of client operations.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction<E> {
    ListPending { seq: u64 },
    ListFulfilled { seq: u64, page: ListPage<E> },
    ListRejected { seq: u64, message: String },
    CreatePending,
    CreateFulfilled(E),
    CreateRejected(String),
    UpdateFulfilled(E),
    UpdateRejected(String),
    DeleteFulfilled(String),
    DeleteRejected(String),
    ClearError,
}

// ============================================================================
// Reducer
// ============================================================================

/// Apply one action to the store state.
///
/// List outcomes whose `seq` is not the latest issued are dropped so that a
/// superseded request can never overwrite newer data. Mutations are only
/// applied on success; a failure touches nothing but `request`.
pub fn reduce_store_state<E: Entity>(
    mut state: StoreState<E>,
    action: StoreAction<E>,
    policy: &StorePolicy,
) -> StoreState<E> {
    match action {
        StoreAction::ListPending { seq } => {
            state.latest_list_seq = state.latest_list_seq.max(seq);
            state.request = RequestState::Loading;
        }
        StoreAction::ListFulfilled { seq, page } => {
            if seq != state.latest_list_seq {
                debug!(kind = %E::KIND, seq, latest = state.latest_list_seq, "discarding superseded list response");
                return state;
            }
            state.snapshot.items = dedup_by_id(page.items);
            state.snapshot.pagination = page.pagination.unwrap_or(state.snapshot.pagination);
            state.snapshot.total = page.total;
            state.request = RequestState::Idle;
        }
        StoreAction::ListRejected { seq, message } => {
            if seq != state.latest_list_seq {
                debug!(kind = %E::KIND, seq, latest = state.latest_list_seq, "discarding superseded list failure");
                return state;
            }
            if !policy.keep_stale_on_error {
                state.snapshot = CollectionSnapshot::default();
            }
            state.request = RequestState::Error(message);
        }
        StoreAction::CreatePending => {
            state.request = RequestState::Loading;
        }
        StoreAction::CreateFulfilled(entity) => {
            let existing = state.snapshot.position(entity.id());
            if let Some(index) = existing {
                state.snapshot.items.remove(index);
            } else {
                state.snapshot.total += 1;
            }
            state.snapshot.items.insert(0, entity);
            state.request = RequestState::Idle;
        }
        StoreAction::UpdateFulfilled(entity) => {
            if let Some(index) = state.snapshot.position(entity.id()) {
                state.snapshot.items[index] = entity;
            }
        }
        StoreAction::DeleteFulfilled(id) => {
            state.snapshot.items.retain(|item| item.id() != id);
            state.snapshot.total = state.snapshot.total.saturating_sub(1);
        }
        StoreAction::CreateRejected(message)
        | StoreAction::UpdateRejected(message)
        | StoreAction::DeleteRejected(message) => {
            state.request = RequestState::Error(message);
        }
        StoreAction::ClearError => {
            if matches!(state.request, RequestState::Error(_)) {
                state.request = RequestState::Idle;
            }
        }
    }
    state
}

/// Drop later records that repeat an earlier id.
fn dedup_by_id<E: Entity>(items: Vec<E>) -> Vec<E> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}
