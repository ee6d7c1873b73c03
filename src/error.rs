//! Crate-wide error type

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] std::io::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Deletion error: {0}")]
    Deletion(String),
}

pub type Result<T> = std::result::Result<T, SweepError>;
