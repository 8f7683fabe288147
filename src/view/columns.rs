//! Column schemas and cell formatters.

use owo_colors::OwoColorize;
use serde_json::Value;

use crate::entity::FieldValue;
use crate::error::{LeadflowError, Result};
use crate::types::{EntityKind, TaskPriority};

/// How a column turns a raw field value into display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellFormat {
    Raw,
    /// `$1,250,000`; cents are shown only when present
    Currency,
    StatusBadge,
    /// 0-100 score as one to five stars
    StarRating,
    /// Date part of an ISO-8601 timestamp
    Date,
    Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
    pub format: CellFormat,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str, format: CellFormat) -> Self {
        Self { key, label, format }
    }

    /// Plain display text for `value`. Null renders empty.
    pub fn format_value(&self, value: &Value) -> String {
        let field = FieldValue::from(value);
        if field.is_null() {
            return String::new();
        }

        match self.format {
            CellFormat::Raw | CellFormat::StatusBadge | CellFormat::Priority => field.to_string(),
            CellFormat::Currency => match as_number(&field) {
                Some(amount) => format_currency(amount),
                None => field.to_string(),
            },
            CellFormat::StarRating => match as_number(&field) {
                Some(score) => format_stars(star_rating(score)),
                None => field.to_string(),
            },
            CellFormat::Date => format_date(&field.to_string()),
        }
    }

    /// Terminal rendering of already formatted text.
    pub fn paint(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        match self.format {
            CellFormat::StatusBadge => status_colored(text),
            CellFormat::Priority => priority_colored(text),
            CellFormat::StarRating => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn as_number(field: &FieldValue) -> Option<f64> {
    match field {
        FieldValue::Number(n) => Some(*n),
        FieldValue::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Number of stars (1-5) for a 0-100 score.
///
/// Scores fall into five bins of width 20; out-of-range scores are clamped.
pub fn star_rating(score: f64) -> u8 {
    let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 100.0) };
    ((score / 20.0).floor() as u8 + 1).min(5)
}

pub fn format_stars(stars: u8) -> String {
    let filled = stars.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// US-style currency with thousands separators.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents_total = (amount.abs() * 100.0).round() as u64;
    let dollars = cents_total / 100;
    let cents = cents_total % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    if cents == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{cents:02}")
    }
}

/// First ten characters of a timestamp (`2024-03-01T10:00:00Z` → `2024-03-01`).
pub fn format_date(timestamp: &str) -> String {
    timestamp.chars().take(10).collect()
}

/// Colour a status by its lowercase form; the text itself is kept as given.
pub fn status_colored(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "new" | "pending" => status.yellow().to_string(),
        "contacted" | "in_progress" => status.cyan().to_string(),
        "qualified" => status.magenta().to_string(),
        "won" | "completed" | "available" => status.green().to_string(),
        "lost" => status.red().to_string(),
        "sold" | "rented" => status.dimmed().to_string(),
        _ => status.to_string(),
    }
}

pub fn priority_colored(priority: &str) -> String {
    match priority.parse::<TaskPriority>() {
        Ok(TaskPriority::High) => priority.red().to_string(),
        Ok(TaskPriority::Medium) => priority.yellow().to_string(),
        Ok(TaskPriority::Low) => priority.dimmed().to_string(),
        Err(_) => priority.to_string(),
    }
}

const LEAD_COLUMNS: &[Column] = &[
    Column::new("name", "Name", CellFormat::Raw),
    Column::new("email", "Email", CellFormat::Raw),
    Column::new("company", "Company", CellFormat::Raw),
    Column::new("status", "Status", CellFormat::StatusBadge),
    Column::new("score", "Score", CellFormat::StarRating),
    Column::new("source", "Source", CellFormat::Raw),
    Column::new("created_at", "Created", CellFormat::Date),
];

const PROPERTY_COLUMNS: &[Column] = &[
    Column::new("title", "Title", CellFormat::Raw),
    Column::new("address", "Address", CellFormat::Raw),
    Column::new("property_type", "Type", CellFormat::Raw),
    Column::new("price", "Price", CellFormat::Currency),
    Column::new("status", "Status", CellFormat::StatusBadge),
    Column::new("created_at", "Listed", CellFormat::Date),
];

const TASK_COLUMNS: &[Column] = &[
    Column::new("title", "Title", CellFormat::Raw),
    Column::new("status", "Status", CellFormat::StatusBadge),
    Column::new("priority", "Priority", CellFormat::Priority),
    Column::new("due_date", "Due", CellFormat::Date),
    Column::new("assigned_to", "Assignee", CellFormat::Raw),
];

pub fn lead_columns() -> &'static [Column] {
    LEAD_COLUMNS
}

pub fn property_columns() -> &'static [Column] {
    PROPERTY_COLUMNS
}

pub fn task_columns() -> &'static [Column] {
    TASK_COLUMNS
}

pub fn columns_for(kind: EntityKind) -> &'static [Column] {
    match kind {
        EntityKind::Lead => lead_columns(),
        EntityKind::Property => property_columns(),
        EntityKind::Task => task_columns(),
    }
}

/// Validate a sort column against a schema.
///
/// Any declared column key is accepted, as is `id` and the timestamps every
/// record carries.
pub fn sortable_column(columns: &[Column], key: &str) -> Result<String> {
    let key = key.trim();
    let known = columns.iter().any(|c| c.key == key)
        || matches!(key, "id" | "created_at" | "updated_at");
    if known {
        Ok(key.to_string())
    } else {
        let valid: Vec<&str> = columns.iter().map(|c| c.key).collect();
        Err(LeadflowError::InvalidSortColumn(format!(
            "{key} (expected one of: {})",
            valid.join(", ")
        )))
    }
}
