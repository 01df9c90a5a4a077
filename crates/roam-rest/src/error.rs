//! Error types for the roam-rest crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RestError {
    #[error("Missing {name}: set it in the client options or in {env}")]
    MissingCredential {
        name: &'static str,
        env: &'static str,
    },

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Roam API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response carried no success payload: {0}")]
    MissingPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] roam_core::RoamError),
}

pub type Result<T> = std::result::Result<T, RestError>;
