//! Error types for pixelforge

use thiserror::Error;

/// The main error type for pixelforge operations.
///
/// `ConfigError` and `CredentialError` abort a run before any task starts.
/// Every other variant is scoped to the task that produced it.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Credential error: {0}")]
    CredentialError(String),

    #[error("[{job_id}] {kind} file not found: {path}")]
    MissingFile {
        job_id: String,
        kind: String,
        path: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Transport error: {0}")]
    TransportError(String),

    #[error("Data error: {0}")]
    DataError(String),
}

impl ForgeError {
    /// Whether this error must abort the whole run rather than a single task
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ForgeError::ConfigError(_) | ForgeError::CredentialError(_)
        )
    }
}

/// Result type alias for pixelforge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

impl From<toml::de::Error> for ForgeError {
    fn from(err: toml::de::Error) -> Self {
        ForgeError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        ForgeError::ConfigError(err.to_string())
    }
}
