use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(#[from] llm_client::LlmError),

    #[error("store error: {0}")]
    Store(#[from] spotcast_store::StoreError),
}

pub type Result<T> = std::result::Result<T, ExtractError>;
