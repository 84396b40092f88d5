//! Configuration loader for Govorun.
//!
//! Reads `govorun.toml` and deserializes it into [`OrchestratorConfig`].
//! Falls back to defaults when the file is missing or malformed; a broken
//! config never takes the engine down.

use std::path::Path;

use secrecy::SecretString;

use govorun_types::config::OrchestratorConfig;
use govorun_types::provider::EndpointConfig;

/// Load configuration from the given path.
///
/// - If the file does not exist, returns [`OrchestratorConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the
///   default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(path: &Path) -> OrchestratorConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return OrchestratorConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return OrchestratorConfig::default();
        }
    };

    match toml::from_str::<OrchestratorConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            OrchestratorConfig::default()
        }
    }
}

/// Resolve a provider's API key from the environment variable named in its
/// endpoint config. Empty values count as absent.
pub fn resolve_api_key(endpoint: &EndpointConfig) -> Option<SecretString> {
    let name = endpoint.api_key_env.as_deref()?;
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}
