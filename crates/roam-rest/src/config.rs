//! Configuration for the REST client.

use serde::Deserialize;

use crate::error::{RestError, Result};

/// Prefix for environment overrides (`ROAM_CLIENT_GRAPH_NAME`, ...).
pub const ENV_PREFIX: &str = "ROAM_CLIENT";

/// Fallback variable for [`ClientOptions::api_key`].
pub const API_KEY_ENV: &str = "ROAM_CLIENT_API_KEY";

/// Fallback variable for [`ClientOptions::api_token`].
pub const API_TOKEN_ENV: &str = "ROAM_CLIENT_API_TOKEN";

/// The hosted backend API endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://4c67k7zc26.execute-api.us-west-2.amazonaws.com/v1/alphaAPI";

/// REST client options.
///
/// Loaded from `roam.toml` or `ROAM_CLIENT_*` environment variables, or
/// built in code with [`ClientOptions::new`].
#[derive(Debug, Clone, Deserialize)]
pub struct ClientOptions {
    /// Sent as `x-api-key`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sent as `x-api-token`.
    #[serde(default)]
    pub api_token: Option<String>,

    /// Graph every request targets.
    pub graph_name: String,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

/// Resolved key and token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub api_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("api_token", &"<redacted>")
            .finish()
    }
}

impl ClientOptions {
    pub fn new(graph_name: impl Into<String>) -> Self {
        Self {
            api_key: None,
            api_token: None,
            graph_name: graph_name.into(),
            content_type: default_content_type(),
            endpoint: default_endpoint(),
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self.api_token = Some(api_token.into());
        self
    }

    /// Load from `<file_prefix>.toml` plus `ROAM_CLIENT_*` variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        Ok(roam_core::config::load(file_prefix, ENV_PREFIX)?)
    }

    /// Fill an unset key or token from the process environment.
    pub fn with_env_fallback(self) -> Self {
        self.with_fallback(|name| std::env::var(name).ok())
    }

    /// Fill an unset key or token from `lookup`, keyed by variable name.
    /// Values already set are kept. Empty strings count as unset on both
    /// sides.
    pub fn with_fallback(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if non_empty(&self.api_key).is_none() {
            self.api_key = lookup(API_KEY_ENV).filter(|v| !v.is_empty());
        }
        if non_empty(&self.api_token).is_none() {
            self.api_token = lookup(API_TOKEN_ENV).filter(|v| !v.is_empty());
        }
        self
    }

    /// Both credentials, or the first one missing. An empty string is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let api_key = non_empty(&self.api_key).ok_or(RestError::MissingCredential {
            name: "API key",
            env: API_KEY_ENV,
        })?;
        let api_token = non_empty(&self.api_token).ok_or(RestError::MissingCredential {
            name: "API token",
            env: API_TOKEN_ENV,
        })?;
        Ok(Credentials {
            api_key: api_key.to_string(),
            api_token: api_token.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ClientOptions::new("MY_GRAPH");
        assert_eq!(options.content_type, "application/json");
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
        assert!(options.api_key.is_none());
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let options: ClientOptions =
            serde_json::from_value(serde_json::json!({"graph_name": "MY_GRAPH", "api_key": "K"}))
                .unwrap();
        assert_eq!(options.api_key.as_deref(), Some("K"));
        assert_eq!(options.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_fallback_only_fills_unset() {
        let options = ClientOptions::new("MY_GRAPH")
            .with_credentials("EXPLICIT", "EXPLICIT_TOKEN")
            .with_fallback(|_| Some("FROM_ENV".to_string()));
        assert_eq!(options.api_key.as_deref(), Some("EXPLICIT"));

        let options = ClientOptions::new("MY_GRAPH").with_fallback(|name| match name {
            API_KEY_ENV => Some("KEY".to_string()),
            _ => None,
        });
        assert_eq!(options.api_key.as_deref(), Some("KEY"));
        assert!(options.api_token.is_none());
    }

    #[test]
    fn test_missing_credentials() {
        let err = ClientOptions::new("g").credentials().unwrap_err();
        assert!(matches!(err, RestError::MissingCredential { env: API_KEY_ENV, .. }));

        let mut options = ClientOptions::new("g");
        options.api_key = Some("K".to_string());
        let err = options.credentials().unwrap_err();
        assert!(matches!(err, RestError::MissingCredential { env: API_TOKEN_ENV, .. }));
    }

    #[test]
    fn test_empty_credentials_are_missing() {
        let err = ClientOptions::new("g")
            .with_credentials("", "TOKEN")
            .credentials()
            .unwrap_err();
        assert!(matches!(err, RestError::MissingCredential { env: API_KEY_ENV, .. }));

        let options = ClientOptions::new("g")
            .with_credentials("", "")
            .with_fallback(|name| match name {
                API_KEY_ENV => Some("KEY".to_string()),
                _ => Some(String::new()),
            });
        assert_eq!(options.api_key.as_deref(), Some("KEY"));
        assert!(options.api_token.is_none());
        let err = options.credentials().unwrap_err();
        assert!(matches!(err, RestError::MissingCredential { env: API_TOKEN_ENV, .. }));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let credentials = ClientOptions::new("g")
            .with_credentials("SECRET", "SECRET")
            .credentials()
            .unwrap();
        assert!(!format!("{credentials:?}").contains("SECRET"));
    }
}
