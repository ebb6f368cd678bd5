//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
///
/// Environment overrides are applied after parsing and before validation, so
/// a config rejected on disk can still be rescued from the environment.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let mut config: GatewayConfig = toml::from_str(&content).map_err(ConfigError::Parse)?;

    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Build a configuration from defaults plus environment overrides.
///
/// Used when no config file is present.
pub fn config_from_env() -> Result<GatewayConfig, ConfigError> {
    let mut config = GatewayConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply environment variable overrides.
///
/// `HOST` and `PORT` override the listen address; `CLIENT_ID` and
/// `CLIENT_SECRET` override the auth credentials.
fn apply_env_overrides(config: &mut GatewayConfig) {
    let host = std::env::var("HOST").ok();
    let port = std::env::var("PORT").ok();
    if host.is_some() || port.is_some() {
        let (default_host, default_port) = match config.listener.bind_address.rsplit_once(':') {
            Some((h, p)) => (h.to_string(), p.to_string()),
            None => (config.listener.bind_address.clone(), "8080".to_string()),
        };
        config.listener.bind_address = format!(
            "{}:{}",
            host.unwrap_or(default_host),
            port.unwrap_or(default_port)
        );
    }

    if let Ok(client_id) = std::env::var("CLIENT_ID") {
        config.auth.client_id = client_id;
    }
    if let Ok(client_secret) = std::env::var("CLIENT_SECRET") {
        config.auth.client_secret = client_secret;
    }
}
