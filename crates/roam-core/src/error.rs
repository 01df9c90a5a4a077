use thiserror::Error;

/// Top-level error type for the shared roam types.
#[derive(Error, Debug)]
pub enum RoamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoamError>;
