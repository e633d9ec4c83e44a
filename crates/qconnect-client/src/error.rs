use thiserror::Error;

/// Errors raised while building or using a remote server client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base address '{address}': {reason}")]
    InvalidBaseAddress { address: String, reason: String },

    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("Request to {path} timed out")]
    Timeout { path: String },

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ClientError {
    pub fn invalid_base_address(address: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseAddress {
            address: address.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_header(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidHeader {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Classify a send/read failure for one search path
    pub fn from_request(path: impl Into<String>, source: reqwest::Error) -> Self {
        let path = path.into();
        if source.is_timeout() {
            Self::Timeout { path }
        } else {
            Self::Transport { path, source }
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::invalid_header("x bad", "invalid HTTP header name");
        assert_eq!(err.to_string(), "Invalid header 'x bad': invalid HTTP header name");

        let err = ClientError::Timeout {
            path: "/Patient?family=Doe".into(),
        };
        assert_eq!(err.to_string(), "Request to /Patient?family=Doe timed out");
    }
}
