use thiserror::Error;

#[derive(Debug, Error)]
pub enum MofgenError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No generation seeds: {0}")]
    EmptySeedSet(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MofgenError>;
