//! In-process collection with the same contract as the REST API.
//!
//! Records are kept newest first, ids are generated with `uuid` and
//! timestamps with `jiff`. Missing ids answer with a `NotFound` error whose
//! message mirrors the server's `detail` (`"Lead not found"`). Failures can
//! be queued with [`MemoryCollection::fail_next`] to exercise error paths.

use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::entity::Entity;
use crate::error::{LeadflowError, Result};
use crate::view::filter::matches_search;

use super::{CollectionClient, Fields, ListPage, ListQuery, Pagination};

#[derive(Debug)]
struct Inner {
    records: Vec<Fields>,
    failures: VecDeque<LeadflowError>,
}

/// Shared in-memory collection. Clones see the same records.
#[derive(Debug, Clone)]
pub struct MemoryCollection<E> {
    inner: Arc<Mutex<Inner>>,
    _kind: PhantomData<fn() -> E>,
}

impl<E: Entity> Default for MemoryCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryCollection<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                records: Vec::new(),
                failures: VecDeque::new(),
            })),
            _kind: PhantomData,
        }
    }

    /// Seed the collection, first record first.
    pub fn with_records(records: impl IntoIterator<Item = E>) -> Self {
        let collection = Self::new();
        collection.inner.lock().records = records.into_iter().map(|r| r.fields()).collect();
        collection
    }

    /// Make the next call fail with `error`, whatever the operation.
    pub fn fail_next(&self, error: LeadflowError) {
        self.inner.lock().failures.push_back(error);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().records.is_empty()
    }

    /// Current records in server order.
    pub fn records(&self) -> Result<Vec<E>> {
        self.inner
            .lock()
            .records
            .iter()
            .map(|fields| decode(fields.clone()))
            .collect()
    }

    fn not_found() -> LeadflowError {
        let noun = E::KIND.singular();
        let mut chars = noun.chars();
        let capitalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        LeadflowError::NotFound(format!("{capitalized} not found"))
    }
}

fn decode<E: Entity>(fields: Fields) -> Result<E> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| LeadflowError::Validation(format!("invalid {}: {e}", E::KIND.singular())))
}

fn now() -> String {
    jiff::Timestamp::now().to_string()
}

#[async_trait]
impl<E: Entity> CollectionClient<E> for MemoryCollection<E> {
    async fn list(&self, query: &ListQuery) -> Result<ListPage<E>> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.pop_front() {
            return Err(error);
        }

        let matching: Vec<&Fields> = inner
            .records
            .iter()
            .filter(|fields| query.search_term().is_none_or(|term| matches_search(fields, term)))
            .filter(|fields| {
                query.status_filter().is_none_or(|status| {
                    fields
                        .get("status")
                        .and_then(Value::as_str)
                        .is_some_and(|s| s.eq_ignore_ascii_case(status))
                })
            })
            .collect();

        let total = matching.len() as u64;
        let offset = (query.page.saturating_sub(1) as usize).saturating_mul(query.limit as usize);
        let items = matching
            .into_iter()
            .skip(offset)
            .take(query.limit as usize)
            .map(|fields| decode(fields.clone()))
            .collect::<Result<Vec<E>>>()?;

        Ok(ListPage {
            items,
            pagination: Some(Pagination {
                page: query.page,
                limit: query.limit,
                total,
            }),
            total,
        })
    }

    async fn create(&self, fields: &Fields) -> Result<E> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.pop_front() {
            return Err(error);
        }

        let mut record = fields.clone();
        let timestamp = now();
        record.insert("id".to_string(), Value::String(uuid::Uuid::new_v4().to_string()));
        record.insert("created_at".to_string(), Value::String(timestamp.clone()));
        record.insert("updated_at".to_string(), Value::String(timestamp));

        let entity: E = decode(record)?;
        inner.records.insert(0, entity.fields());
        Ok(entity)
    }

    async fn update(&self, id: &str, fields: &Fields) -> Result<E> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.pop_front() {
            return Err(error);
        }

        let Some(index) = inner
            .records
            .iter()
            .position(|r| r.get("id").and_then(Value::as_str) == Some(id))
        else {
            return Err(Self::not_found());
        };

        let mut record = inner.records[index].clone();
        for (key, value) in fields {
            if key != "id" {
                record.insert(key.clone(), value.clone());
            }
        }
        record.insert("updated_at".to_string(), Value::String(now()));

        let entity: E = decode(record)?;
        inner.records[index] = entity.fields();
        Ok(entity)
    }

    async fn delete(&self, id: &str) -> Result<String> {
        let mut inner = self.inner.lock();
        if let Some(error) = inner.failures.pop_front() {
            return Err(error);
        }

        let before = inner.records.len();
        inner
            .records
            .retain(|r| r.get("id").and_then(Value::as_str) != Some(id));
        if inner.records.len() == before {
            return Err(Self::not_found());
        }
        Ok(id.to_string())
    }
}
