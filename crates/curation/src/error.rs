use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurationError {
    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),

    #[error("malformed callback payload: {0}")]
    MalformedPayload(String),

    #[error("unknown callback action: {0}")]
    UnknownAction(String),

    #[error("spot {0} not found")]
    SpotNotFound(i64),
}

pub type Result<T> = std::result::Result<T, CurationError>;
