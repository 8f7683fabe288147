mod board;
mod config;
mod entity;
mod stats;

pub use board::{BoardMove, cmd_board};
pub use config::{cmd_config_set, cmd_config_show};
pub use entity::{ListOptions, cmd_add, cmd_ls, cmd_rm, cmd_update};
pub use stats::cmd_stats;

use serde_json::Value;

use crate::cli::OutputOptions;
use crate::entity::Entity;
use crate::error::{LeadflowError, Result};
use crate::form::parse_field_value;
use crate::toast::{Notifications, TOAST_TTL};

/// Output of a command in both of its forms.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Print JSON when requested, otherwise the text form (falling back to
    /// JSON when there is none).
    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => {
                println!("{text}");
                Ok(())
            }
            _ => print_json(&self.json),
        }
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print pending notifications to stderr.
pub fn print_notifications(notifications: &Notifications) {
    for toast in notifications.drain(TOAST_TTL) {
        eprintln!("{}", toast.render());
    }
}

/// Parse `FIELD=VALUE` assignments into typed field values for `E`.
pub fn parse_assignments<E: Entity>(assignments: &[String]) -> Result<Vec<(String, Value)>> {
    assignments
        .iter()
        .map(|assignment| {
            let (field, raw) = assignment.split_once('=').ok_or_else(|| {
                LeadflowError::InvalidField(format!("expected FIELD=VALUE, got '{assignment}'"))
            })?;
            let field = field.trim();
            if field.is_empty() {
                return Err(LeadflowError::InvalidField(format!(
                    "missing field name in '{assignment}'"
                )));
            }
            Ok((field.to_string(), parse_field_value::<E>(field, raw)?))
        })
        .collect()
}
