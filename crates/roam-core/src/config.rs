//! Configuration loading for roam services.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (caller-chosen prefix, e.g. `ROAM_CLIENT_`)
//! 2. Config file (`<file_prefix>.toml`, optional)
//! 3. Serde defaults on the target type

use serde::de::DeserializeOwned;

use crate::error::Result;

/// Build a `T` from an optional config file plus prefixed environment variables.
///
/// `ROAM_CLIENT_API_KEY` with `env_prefix = "ROAM_CLIENT"` lands on the
/// `api_key` field.
pub fn load<T: DeserializeOwned>(file_prefix: &str, env_prefix: &str) -> Result<T> {
    let cfg = config::Config::builder()
        .add_source(config::File::with_name(file_prefix).required(false))
        .add_source(config::Environment::with_prefix(env_prefix))
        .build()?;

    let loaded = cfg.try_deserialize::<T>()?;
    tracing::debug!(file_prefix, env_prefix, "Loaded configuration");
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Sample {
        graph_name: String,
        #[serde(default)]
        api_key: Option<String>,
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roam");
        std::fs::write(
            dir.path().join("roam.toml"),
            "graph_name = \"MY_GRAPH\"\napi_key = \"KEY\"\n",
        )
        .unwrap();

        let sample: Sample = load(path.to_str().unwrap(), "ROAM_CORE_TEST_UNUSED").unwrap();
        assert_eq!(sample.graph_name, "MY_GRAPH");
        assert_eq!(sample.api_key.as_deref(), Some("KEY"));
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent");
        let result: Result<Sample> = load(path.to_str().unwrap(), "ROAM_CORE_TEST_UNUSED");
        assert!(result.is_err());
    }
}
