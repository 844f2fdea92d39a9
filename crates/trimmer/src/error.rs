use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrimError>;
