use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<StoreError> for spotcast_common::SpotcastError {
    fn from(e: StoreError) -> Self {
        spotcast_common::SpotcastError::Database(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
