//! CRM records and the field-level view the table model works on.
//!
//! Every record kind implements [`Entity`]. The view model never looks at the
//! concrete struct: it reads fields through [`Entity::fields`], the same
//! name → value map the REST collaborator sends over the wire.

use std::cmp::Ordering;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::types::{EntityKind, LeadStatus, PropertyStatus, TaskPriority, TaskStatus};

// Statuses and priorities are free text on the server. Records keep whatever
// string arrived; the typed enums are parsed on demand.

/// A record of one CRM kind with a stable identifier.
pub trait Entity:
    Serialize + DeserializeOwned + Clone + fmt::Debug + PartialEq + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Field values of a blank record, used when a form opens for "add".
    fn template() -> Map<String, Value>;

    /// Fields a form refuses to submit while blank.
    fn required_fields() -> &'static [&'static str];

    /// Fields whose wire type is a number.
    fn numeric_fields() -> &'static [&'static str] {
        &[]
    }

    /// The record as a field map, in wire representation.
    fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// A single field value as seen by search and sort.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    /// Arrays and objects, kept as compact JSON.
    Nested(String),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Ordering of two raw values for column sort.
    ///
    /// Values of the same type compare natively: numbers numerically, strings
    /// by code point, booleans with `false < true`. Values of different types
    /// are grouped by type (booleans, numbers, strings, nested) and nulls sort
    /// after everything else, which keeps the ordering total.
    pub fn sort_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Nested(a), FieldValue::Nested(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Text(_) => 2,
            FieldValue::Nested(_) => 3,
            FieldValue::Null => 4,
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null),
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Nested(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(s) | FieldValue::Nested(s) => f.write_str(s),
        }
    }
}

/// A sales lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default = "default_lead_status")]
    pub status: String,
    /// Lead score, 0-100
    #[serde(default)]
    pub score: Option<u32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Fields the client does not model (owner ids, server bookkeeping)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Lead {
    const KIND: EntityKind = EntityKind::Lead;

    fn id(&self) -> &str {
        &self.id
    }

    fn template() -> Map<String, Value> {
        object(json!({
            "name": "",
            "email": "",
            "phone": "",
            "company": "",
            "status": LeadStatus::default().as_str(),
            "source": "",
            "notes": "",
        }))
    }

    fn required_fields() -> &'static [&'static str] {
        &["name", "email"]
    }

    fn numeric_fields() -> &'static [&'static str] {
        &["score"]
    }
}

/// A real-estate listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub property_type: String,
    #[serde(default = "default_property_status")]
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity for Property {
    const KIND: EntityKind = EntityKind::Property;

    fn id(&self) -> &str {
        &self.id
    }

    fn template() -> Map<String, Value> {
        object(json!({
            "title": "",
            "address": "",
            "price": null,
            "property_type": "house",
            "status": PropertyStatus::default().as_str(),
            "description": "",
        }))
    }

    fn required_fields() -> &'static [&'static str] {
        &["title", "address", "property_type"]
    }

    fn numeric_fields() -> &'static [&'static str] {
        &["price"]
    }
}

/// A to-do item shown in the task list and on the scrum board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default = "default_task_status")]
    pub status: String,
    #[serde(default = "default_task_priority")]
    pub priority: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// The status as a board column, if it is one.
    pub fn status_kind(&self) -> Option<TaskStatus> {
        self.status.parse().ok()
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn template() -> Map<String, Value> {
        object(json!({
            "title": "",
            "description": "",
            "due_date": null,
            "status": TaskStatus::default().as_str(),
            "priority": TaskPriority::default().as_str(),
            "assigned_to": "",
        }))
    }

    fn required_fields() -> &'static [&'static str] {
        &["title"]
    }
}

fn default_lead_status() -> String {
    LeadStatus::default().to_string()
}

fn default_property_status() -> String {
    PropertyStatus::default().to_string()
}

fn default_task_status() -> String {
    TaskStatus::default().to_string()
}

fn default_task_priority() -> String {
    TaskPriority::default().to_string()
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
