//! Configuration for the query connector.
//!
//! Remote FHIR servers are described by [`ServerConfig`] entries and looked up
//! through a [`ServerConfigResolver`], which the query engine receives at
//! construction time. [`load_config`] reads the application settings from a
//! TOML file with `QCONNECT__` environment overrides.

pub mod loader;
pub mod server;

pub use loader::{AppConfig, HttpSettings, LoggingConfig, load_config};
pub use server::{ServerConfig, ServerConfigResolver, ServerRegistry};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("No FHIR server configured for '{0}'")]
    ServerNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn server_not_found(key: impl Into<String>) -> Self {
        Self::ServerNotFound(key.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
