//! Service descriptor: the one routing entity the gateway knows about.

use serde::{Deserialize, Serialize};

/// Static record identifying a backend's network address and name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceDescriptor {
    /// Logical service name, used as the routing key.
    pub name: String,

    /// URL scheme used to reach the backend ("http" or "https").
    pub protocol: String,

    /// Backend host name or address.
    pub host: String,

    /// Backend TCP port.
    pub port: u16,
}

impl ServiceDescriptor {
    /// Base URL of the backend, without a trailing slash.
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    /// Per-descriptor sanity checks. Returns a description of the first
    /// problem found, if any.
    pub fn check(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("service name must not be empty".to_string());
        }
        if self.name.contains('/') || self.name.contains('?') {
            return Err(format!(
                "service name {:?} must not contain '/' or '?'",
                self.name
            ));
        }
        match self.protocol.as_str() {
            "http" | "https" => {}
            other => {
                return Err(format!(
                    "service {:?}: protocol must be \"http\" or \"https\", got {:?}",
                    self.name, other
                ))
            }
        }
        if self.host.is_empty() {
            return Err(format!("service {:?}: host must not be empty", self.name));
        }
        if self.port == 0 {
            return Err(format!("service {:?}: port must not be 0", self.name));
        }
        // The descriptor must assemble into a parseable URL, or every
        // forwarded request for it would fail at rewrite time.
        let assembled = format!("{}/", self.base_url());
        if url::Url::parse(&assembled).is_err() {
            return Err(format!(
                "service {:?}: {:?} is not a valid base URL",
                self.name, assembled
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor {
            name: "artifacts".into(),
            protocol: "http".into(),
            host: "127.0.0.1".into(),
            port: 8082,
        }
    }

    #[test]
    fn base_url_joins_fields() {
        assert_eq!(descriptor().base_url(), "http://127.0.0.1:8082");
    }

    #[test]
    fn valid_descriptor_passes() {
        assert!(descriptor().check().is_ok());
    }

    #[test]
    fn rejects_bad_protocol() {
        let mut d = descriptor();
        d.protocol = "ftp".into();
        assert!(d.check().is_err());
    }

    #[test]
    fn rejects_slash_in_name() {
        let mut d = descriptor();
        d.name = "a/b".into();
        assert!(d.check().is_err());
    }

    #[test]
    fn rejects_port_zero() {
        let mut d = descriptor();
        d.port = 0;
        assert!(d.check().is_err());
    }

    #[test]
    fn deserializes_from_services_json_shape() {
        let d: ServiceDescriptor = serde_json::from_str(
            r#"{"name": "storage", "protocol": "http", "host": "localhost", "port": 8083}"#,
        )
        .unwrap();
        assert_eq!(d.name, "storage");
        assert_eq!(d.port, 8083);
    }
}
