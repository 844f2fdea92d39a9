use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extractor error: {0}")]
    Extract(#[from] spotcast_extractor::ExtractError),

    #[error("reviewer error: {0}")]
    Review(#[from] spotcast_reviewer::ReviewError),

    #[error("materializer error: {0}")]
    Materialize(#[from] spotcast_materializer::MaterializeError),

    #[error("fetcher error: {0}")]
    Fetch(#[from] spotcast_fetcher::FetchError),

    #[error("merger error: {0}")]
    Merge(#[from] spotcast_merger::MergeError),

    #[error("trimmer error: {0}")]
    Trim(#[from] spotcast_trimmer::TrimError),

    #[error("delta error: {0}")]
    Delta(#[from] spotcast_delta::DeltaError),

    #[error("seeder error: {0}")]
    Seed(#[from] spotcast_seeder::SeedError),

    #[error("an integrity violation was detected: {0}")]
    Integrity(String),

    #[error("backup failed: {0}")]
    Backup(String),
}

pub type Result<T> = std::result::Result<T, OrchestratorError>;
