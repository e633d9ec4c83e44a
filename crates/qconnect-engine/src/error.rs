use qconnect_client::ClientError;
use qconnect_config::ConfigError;
use thiserror::Error;

/// Hard failures of a query run. Everything else is logged and absorbed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client setup error: {0}")]
    Client(#[from] ClientError),
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
