use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("No flight sources are authorized for this request")]
    NoSourcesAuthorized,

    #[error("Provider request failed: {0}")]
    ProviderError(#[from] reqwest::Error),

    #[error("Provider returned HTTP status {status}")]
    ProviderStatusError { status: u16 },

    #[error("Provider returned malformed data: {message}")]
    MalformedResponseError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

pub type Result<T> = std::result::Result<T, SearchError>;
