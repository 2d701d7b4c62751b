use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown field usage: {0}")]
    UnknownUsage(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
