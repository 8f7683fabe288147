//! Application configuration.
//!
//! Configuration is stored in `.leadflow/config.yaml` and includes:
//! - The REST API base URL
//! - The bearer token attached to every request
//! - List and store behavior (page size, stale-data policy, request timeout)
//!
//! `LEADFLOW_API_URL` and `LEADFLOW_TOKEN` override the file when set.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LeadflowError, Result};
use crate::types::{DEFAULT_PAGE_LIMIT, LEADFLOW_DIR};

pub const API_URL_ENV: &str = "LEADFLOW_API_URL";
pub const TOKEN_ENV: &str = "LEADFLOW_TOKEN";

/// Keys accepted by `config set`.
pub const VALID_KEYS: &[&str] = &[
    "api_url",
    "auth.token",
    "page_limit",
    "keep_stale_on_error",
    "request_timeout",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the CRM REST API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Authentication
    #[serde(default)]
    pub auth: AuthConfig,

    /// Page size for list requests (default: 10)
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,

    /// Keep the previous list visible when a refresh fails (default: true)
    #[serde(default = "default_keep_stale_on_error")]
    pub keep_stale_on_error: bool,

    /// Request timeout in seconds (default: 0, no timeout)
    #[serde(default)]
    pub request_timeout: u64,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_page_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

fn default_keep_stale_on_error() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth: AuthConfig::default(),
            page_limit: default_page_limit(),
            keep_stale_on_error: default_keep_stale_on_error(),
            request_timeout: 0,
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(LEADFLOW_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LeadflowError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                LeadflowError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            LeadflowError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // The file may hold a bearer token; owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions)?;
        }

        Ok(())
    }

    /// Get the API base URL from environment variable or config
    pub fn api_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api_url.clone()
    }

    /// Get the bearer token from environment variable or config
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(token);
        }
        self.auth.token.clone()
    }

    /// Request timeout, `None` when unset (requests wait indefinitely)
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout > 0).then(|| Duration::from_secs(self.request_timeout))
    }

    /// Set a value by its dotted key
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_url" => {
                url::Url::parse(value)?;
                self.api_url = value.to_string();
            }
            "auth.token" => {
                self.auth.token = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "page_limit" => {
                let limit: u32 = value.parse().map_err(|_| {
                    LeadflowError::Config(format!("page_limit must be a positive integer, got '{value}'"))
                })?;
                if limit == 0 {
                    return Err(LeadflowError::Config(
                        "page_limit must be greater than zero".to_string(),
                    ));
                }
                self.page_limit = limit;
            }
            "keep_stale_on_error" => {
                self.keep_stale_on_error = parse_bool(value).ok_or_else(|| {
                    LeadflowError::Config(format!(
                        "keep_stale_on_error must be true or false, got '{value}'"
                    ))
                })?;
            }
            "request_timeout" => {
                self.request_timeout = value.parse().map_err(|_| {
                    LeadflowError::Config(format!(
                        "request_timeout must be a number of seconds, got '{value}'"
                    ))
                })?;
            }
            _ => {
                return Err(LeadflowError::Config(format!(
                    "unknown config key '{key}'. Valid keys: {}",
                    VALID_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert!(config.auth.token.is_none());
        assert_eq!(config.page_limit, 10);
        assert!(config.keep_stale_on_error);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_config_partial_yaml_uses_defaults() {
        let yaml = r#"
api_url: https://crm.example.com/api
keep_stale_on_error: false
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.api_url, "https://crm.example.com/api");
        assert!(!config.keep_stale_on_error);
        assert_eq!(config.page_limit, 10);
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let mut config = Config::default();
        config.set_value("auth.token", "secret-token").unwrap();
        config.set_value("page_limit", "25").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(parsed.auth.token.as_deref(), Some("secret-token"));
        assert_eq!(parsed.page_limit, 25);
    }

    #[test]
    fn test_auth_debug_is_redacted() {
        let mut config = Config::default();
        config.auth.token = Some("super-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_set_value_rejects_bad_input() {
        let mut config = Config::default();
        assert!(config.set_value("page_limit", "0").is_err());
        assert!(config.set_value("page_limit", "ten").is_err());
        assert!(config.set_value("keep_stale_on_error", "maybe").is_err());
        assert!(config.set_value("api_url", "not a url").is_err());
        assert!(config.set_value("colour", "blue").is_err());
    }

    #[test]
    fn test_set_value_request_timeout() {
        let mut config = Config::default();
        config.set_value("request_timeout", "15").unwrap();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_empty_token_clears_auth() {
        let mut config = Config::default();
        config.set_value("auth.token", "abc").unwrap();
        config.set_value("auth.token", "").unwrap();
        assert!(config.auth.token.is_none());
    }
}
