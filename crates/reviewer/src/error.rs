use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("LLM error: {0}")]
    Llm(#[from] llm_client::LlmError),

    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ReviewError>;
