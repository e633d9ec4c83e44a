use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::{ConfigError, Result};

/// Connection parameters for one remote FHIR server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub id: String,
    pub display_name: String,
    /// Base URL that search paths are appended to, e.g. `https://host/fhir/r4`
    pub base_address: String,
    /// Static headers sent with every request (destination, purpose of use, ...)
    #[serde(default, alias = "header_set")]
    pub headers: HashMap<String, String>,
    /// Keep TLS but skip certificate-chain validation
    #[serde(default)]
    pub trust_self_signed: bool,
    /// Per-request deadline; falls back to `http.request_timeout_ms`
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl ServerConfig {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        base_address: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            base_address: base_address.into(),
            headers: HashMap::new(),
            trust_self_signed: false,
            request_timeout_ms: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_trust_self_signed(mut self, trust: bool) -> Self {
        self.trust_self_signed = trust;
        self
    }

    pub fn with_request_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.request_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn request_timeout(&self, default: Duration) -> Duration {
        self.request_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(default)
    }
}

/// Looks up server connection parameters by id or display name
pub trait ServerConfigResolver: Send + Sync {
    /// Resolve a server, failing with [`ConfigError::ServerNotFound`] when absent
    fn resolve(&self, id_or_name: &str) -> Result<ServerConfig>;
}

/// In-memory resolver over a fixed list of servers
#[derive(Debug, Clone, Default)]
pub struct ServerRegistry {
    servers: Vec<ServerConfig>,
}

impl ServerRegistry {
    pub fn new(servers: Vec<ServerConfig>) -> Self {
        Self { servers }
    }

    pub fn servers(&self) -> &[ServerConfig] {
        &self.servers
    }
}

impl ServerConfigResolver for ServerRegistry {
    fn resolve(&self, id_or_name: &str) -> Result<ServerConfig> {
        // Ids win over display names
        let found = self
            .servers
            .iter()
            .find(|s| s.id == id_or_name)
            .or_else(|| {
                self.servers
                    .iter()
                    .find(|s| s.display_name.eq_ignore_ascii_case(id_or_name))
            });
        match found {
            Some(server) => {
                debug!(server = %server.id, "resolved FHIR server");
                Ok(server.clone())
            }
            None => Err(ConfigError::server_not_found(id_or_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ServerRegistry {
        ServerRegistry::new(vec![
            ServerConfig::new("test", "Local e2e HAPI", "http://localhost:8080/fhir"),
            ServerConfig::new("ehx", "eHealthExchange", "https://gateway.example.org/fhir")
                .with_header("X-POU", "PUBHLTH")
                .with_trust_self_signed(true),
            // Display name shadowing another server's id
            ServerConfig::new("other", "test", "https://other.example.org"),
        ])
    }

    #[test]
    fn test_resolve_by_id_and_name() {
        let registry = registry();
        assert_eq!(registry.resolve("ehx").unwrap().display_name, "eHealthExchange");
        assert_eq!(registry.resolve("ehealthexchange").unwrap().id, "ehx");
        assert_eq!(registry.resolve("test").unwrap().id, "test");
    }

    #[test]
    fn test_resolve_missing_server() {
        let err = registry().resolve("nowhere").unwrap_err();
        assert!(matches!(err, ConfigError::ServerNotFound(ref key) if key == "nowhere"));
        assert_eq!(err.to_string(), "No FHIR server configured for 'nowhere'");
    }

    #[test]
    fn test_request_timeout_fallback() {
        let default = Duration::from_secs(30);
        let server = ServerConfig::new("a", "A", "http://a");
        assert_eq!(server.request_timeout(default), default);
        let server = server.with_request_timeout_ms(1500);
        assert_eq!(server.request_timeout(default), Duration::from_millis(1500));
    }
}
