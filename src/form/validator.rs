//! Form validation
//!
//! Only the checks a browser form would make before submitting: required
//! fields must be non-blank. Everything else is left to the server.

use serde_json::{Map, Number, Value};

use crate::entity::Entity;
use crate::error::{LeadflowError, Result};

/// Result of form validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn failure(message: String) -> Self {
        Self {
            is_valid: false,
            error: Some(message),
        }
    }
}

/// Validator for entity edit forms
pub struct FormValidator;

impl FormValidator {
    /// Check that every required field of `E` is present and non-blank.
    pub fn validate<E: Entity>(buffer: &Map<String, Value>) -> ValidationResult {
        let missing: Vec<&str> = E::required_fields()
            .iter()
            .copied()
            .filter(|field| is_blank(buffer.get(*field)))
            .collect();
        report(&missing)
    }

    /// Check only the required fields the buffer carries, for partial
    /// updates: a required field may be omitted but not blanked.
    pub fn validate_present<E: Entity>(buffer: &Map<String, Value>) -> ValidationResult {
        let missing: Vec<&str> = E::required_fields()
            .iter()
            .copied()
            .filter(|field| buffer.contains_key(*field) && is_blank(buffer.get(*field)))
            .collect();
        report(&missing)
    }
}

fn report(missing: &[&str]) -> ValidationResult {
    match missing {
        [] => ValidationResult::success(),
        [field] => ValidationResult::failure(format!("{} is required", label(field))),
        fields => ValidationResult::failure(format!(
            "{} are required",
            fields.iter().map(|f| label(f)).collect::<Vec<_>>().join(", ")
        )),
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// `property_type` → `Property type`
fn label(field: &str) -> String {
    let spaced = field.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert raw text typed into a form field into its wire value.
///
/// Numeric fields parse as numbers (blank means null); every other field is
/// kept as text.
pub fn parse_field_value<E: Entity>(field: &str, raw: &str) -> Result<Value> {
    if !E::numeric_fields().contains(&field) {
        return Ok(Value::String(raw.to_string()));
    }

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Ok(Value::Number(n.into()));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| LeadflowError::InvalidField(format!("{field} must be a number, got '{raw}'")))
}
