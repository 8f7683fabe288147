//! Record builders and in-memory contexts shared by the integration tests.

use std::ffi::OsString;
use std::sync::Arc;

use serde_json::{Value, json};

use leadflow::app::{AppContext, Clients};
use leadflow::auth::Credentials;
use leadflow::config::Config;
use leadflow::entity::{Lead, Property, Task};
use leadflow::remote::MemoryCollection;

pub fn lead(id: &str, name: &str, score: Option<u32>) -> Lead {
    serde_json::from_value(json!({
        "id": id,
        "name": name,
        "email": format!("{}@example.com", name.to_lowercase()),
        "score": score,
    }))
    .expect("valid lead")
}

pub fn property(id: &str, title: &str, price: f64) -> Property {
    serde_json::from_value(json!({
        "id": id,
        "title": title,
        "address": "1 Main St",
        "property_type": "house",
        "price": price,
    }))
    .expect("valid property")
}

pub fn task(id: &str, title: &str, status: &str) -> Task {
    serde_json::from_value(json!({"id": id, "title": title, "status": status}))
        .expect("valid task")
}

/// A list response body in the server's shape.
pub fn list_body(collection: &str, items: Vec<Value>, total: u64) -> Value {
    let mut body = json!({
        "pagination": {"page": 1, "limit": 10, "total": total},
        "total": total,
    });
    body[collection] = Value::Array(items);
    body
}

/// In-memory collaborators, handed back so tests can seed or inspect them.
pub struct MemoryBackend {
    pub leads: MemoryCollection<Lead>,
    pub properties: MemoryCollection<Property>,
    pub tasks: MemoryCollection<Task>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            leads: MemoryCollection::new(),
            properties: MemoryCollection::new(),
            tasks: MemoryCollection::new(),
        }
    }

    pub fn context(&self, config: Config) -> AppContext {
        AppContext::with_clients(
            config,
            Credentials::new(),
            Clients {
                leads: Arc::new(self.leads.clone()),
                properties: Arc::new(self.properties.clone()),
                tasks: Arc::new(self.tasks.clone()),
            },
        )
    }
}

/// RAII guard that sets an environment variable and restores it on drop.
///
/// # Safety
/// This modifies the process environment. Tests using this should be marked with `#[serial]`.
pub struct EnvGuard {
    key: &'static str,
    original: Option<OsString>,
}

impl EnvGuard {
    pub fn set(key: &'static str, value: &str) -> Self {
        let original = std::env::var_os(key);
        // SAFETY: tests using EnvGuard are marked #[serial]
        unsafe { std::env::set_var(key, value) };
        Self { key, original }
    }

    pub fn remove(key: &'static str) -> Self {
        let original = std::env::var_os(key);
        // SAFETY: tests using EnvGuard are marked #[serial]
        unsafe { std::env::remove_var(key) };
        Self { key, original }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: Drop runs during test teardown of a #[serial] test
        match &self.original {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}
