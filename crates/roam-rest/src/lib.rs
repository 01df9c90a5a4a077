//! roam-rest: HTTP client for the Roam backend API.
//!
//! Mirrors the graph primitives (pull, q, block and page mutations) for use
//! outside the app. Requests are authenticated with an API key and token,
//! taken from [`ClientOptions`] or the `ROAM_CLIENT_API_KEY` /
//! `ROAM_CLIENT_API_TOKEN` environment variables.

pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use client::RestClient;
pub use config::{ClientOptions, Credentials, DEFAULT_ENDPOINT};
pub use error::RestError;
pub use transport::{HttpTransport, Transport};
