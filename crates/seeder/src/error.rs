use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("provider error: {0}")]
    Provider(String),

    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),
}

pub type Result<T> = std::result::Result<T, SeedError>;
