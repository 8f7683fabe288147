use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadflowError {
    // Remote collaborator errors
    #[error("network error: {0}")]
    Network(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// A success response with an unreadable body
    #[error("{0}")]
    Decode(String),

    // Local errors
    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("invalid sort column '{0}'")]
    InvalidSortColumn(String),

    #[error("invalid sort direction '{0}'")]
    InvalidSortDirection(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

impl LeadflowError {
    /// Message suitable for a notification banner.
    ///
    /// Remote errors already carry either the server's `detail` text or the
    /// per-operation fallback, so they are shown verbatim.
    pub fn user_message(&self) -> String {
        match self {
            LeadflowError::Network(msg)
            | LeadflowError::Validation(msg)
            | LeadflowError::NotFound(msg)
            | LeadflowError::Auth(msg)
            | LeadflowError::Decode(msg) => msg.clone(),
            LeadflowError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadflowError>;
