use thiserror::Error;

/// Root error type for the pipeline. Individual crates define their own
/// narrower error enums and convert into this one at stage boundaries.
#[derive(Debug, Error)]
pub enum SpotcastError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Filesystem error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Cancelled")]
    Cancelled,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for SpotcastError {
    fn from(e: std::io::Error) -> Self {
        SpotcastError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for SpotcastError {
    fn from(e: serde_json::Error) -> Self {
        SpotcastError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SpotcastError>;
