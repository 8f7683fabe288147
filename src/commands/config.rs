//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config set`: Set a configuration value

use std::path::Path;

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{API_URL_ENV, Config, TOKEN_ENV};
use crate::error::Result;

/// Mask a sensitive value by showing only the first 2 and last 2 characters
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    config_show_at(&Config::config_path(), output)
}

fn config_show_at(path: &Path, output: OutputOptions) -> Result<()> {
    let config = Config::load_from(path)?;
    let token = config.token();
    let masked = token.as_deref().map(mask_sensitive_value);

    let json_output = json!({
        "api_url": config.api_url(),
        "auth": {
            "token_configured": token.is_some(),
            "token": masked,
        },
        "page_limit": config.page_limit,
        "keep_stale_on_error": config.keep_stale_on_error,
        "request_timeout": config.request_timeout,
        "config_file": path.to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text_output.push_str(&format!("{}: {}\n", "api_url".cyan(), config.api_url()));
    if std::env::var(API_URL_ENV).is_ok_and(|v| !v.is_empty()) {
        text_output.push_str(&format!("  {}\n", format!("(from {API_URL_ENV})").dimmed()));
    }

    let token_status = match &masked {
        Some(masked) => masked.green().to_string(),
        None => "not configured".dimmed().to_string(),
    };
    text_output.push_str(&format!("{}: {token_status}\n", "auth.token".cyan()));
    if std::env::var(TOKEN_ENV).is_ok_and(|v| !v.is_empty()) {
        text_output.push_str(&format!("  {}\n", format!("(from {TOKEN_ENV})").dimmed()));
    }

    text_output.push_str(&format!("{}: {}\n", "page_limit".cyan(), config.page_limit));
    text_output.push_str(&format!(
        "{}: {}\n",
        "keep_stale_on_error".cyan(),
        config.keep_stale_on_error
    ));
    let timeout = match config.request_timeout() {
        Some(timeout) => format!("{}s", timeout.as_secs()),
        None => "none".dimmed().to_string(),
    };
    text_output.push_str(&format!("{}: {timeout}\n", "request_timeout".cyan()));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", path.display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    config_set_at(&Config::config_path(), key, value, output)
}

fn config_set_at(path: &Path, key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load_from(path)?;
    config.set_value(key, value)?;
    config.save_to(path)?;

    let shown = if key == "auth.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), shown))
    .print(output)
}
