//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PortalConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PortalConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: PortalConfig = toml::from_str(&content)?;

    validate_config(&config)?;

    Ok(config)
}

/// Sanity-check values that serde cannot express.
pub fn validate_config(config: &PortalConfig) -> Result<(), ConfigError> {
    let endpoint = url::Url::parse(&config.compute.endpoint)
        .map_err(|e| ConfigError::Validation(format!("compute.endpoint: {e}")))?;
    if endpoint.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "compute.endpoint: unsupported scheme {:?}",
            endpoint.scheme()
        )));
    }
    if config.compute.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "compute.timeout_ms must be positive".to_string(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "listener.request_timeout_secs must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(validate_config(&PortalConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_compute_endpoint() {
        let mut config = PortalConfig::default();
        config.compute.endpoint = "not a url".to_string();
        assert!(validate_config(&config).is_err());

        config.compute.endpoint = "ftp://example.com/x".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_parses_partial_toml() {
        let config: PortalConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9999"

            [[store.rows]]
            id = 1
            name = "a"
            age = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9999");
        assert_eq!(config.store.rows.len(), 1);
        // untouched sections keep their defaults
        assert_eq!(config.pipeline.delay_ms, 2000);
    }
}
