//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (addresses parse, paths well-formed)
//! - Check cross-field requirements (auth enabled needs credentials)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Config field the error refers to, e.g. "listener.bind_address".
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn error(field: &str, message: impl Into<String>) -> ValidationError {
    ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

/// Validate a configuration, collecting every error found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(error(
            "listener.bind_address",
            format!("not a socket address: {:?}", config.listener.bind_address),
        ));
    }

    if !config.api.base_path.starts_with('/') {
        errors.push(error("api.base_path", "must start with '/'"));
    }
    if config.api.base_path == "/" {
        errors.push(error("api.base_path", "must name at least one segment"));
    }
    if config.api.base_path.len() > 1 && config.api.base_path.ends_with('/') {
        errors.push(error("api.base_path", "must not end with '/'"));
    }
    if config.api.services_file.is_empty() {
        errors.push(error("api.services_file", "must not be empty"));
    }

    if config.auth.enabled && config.auth.client_secret.is_empty() {
        errors.push(error(
            "auth.client_secret",
            "required when auth is enabled",
        ));
    }

    if config.websocket.enabled {
        if !config.websocket.path.starts_with('/') {
            errors.push(error("websocket.path", "must start with '/'"));
        }
        if config.websocket.history_limit == 0 {
            errors.push(error("websocket.history_limit", "must be at least 1"));
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(error(
            "observability.metrics_address",
            format!(
                "not a socket address: {:?}",
                config.observability.metrics_address
            ),
        ));
    }
    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(error(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got {:?}", other),
        )),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "nonsense".into();
        config.api.base_path = "api".into();
        config.auth.enabled = true;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"listener.bind_address"));
        assert!(fields.contains(&"api.base_path"));
        assert!(fields.contains(&"auth.client_secret"));
    }

    #[test]
    fn trailing_slash_base_path_rejected() {
        let mut config = GatewayConfig::default();
        config.api.base_path = "/api/".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_history_limit_rejected_only_when_enabled() {
        let mut config = GatewayConfig::default();
        config.websocket.history_limit = 0;
        assert!(validate_config(&config).is_err());

        config.websocket.enabled = false;
        assert!(validate_config(&config).is_ok());
    }
}
