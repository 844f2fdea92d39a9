use thiserror::Error;

#[derive(Debug, Error)]
pub enum MaterializeError {
    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),
}

pub type Result<T> = std::result::Result<T, MaterializeError>;
