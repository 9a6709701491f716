//! Connector error types.

use thiserror::Error;

/// Error that can occur while configuring or driving the connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Required configuration is missing or invalid. Raised at initialization
    /// and fatal to startup.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// The mapping list violates a mapping-list invariant.
    #[error("invalid mapping: {message}")]
    InvalidMapping { message: String },

    /// An identity resolution miss. Recoverable by the caller, never retried.
    #[error("not found: {identifier}")]
    NotFound { identifier: String },

    /// A remote call to the external system or the platform failed. Surfaced
    /// verbatim, never retried by the engine.
    #[error("remote call failed: {message}")]
    Remote {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl ConnectorError {
    /// Create an invalid-configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        ConnectorError::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an invalid-mapping error.
    pub fn invalid_mapping(message: impl Into<String>) -> Self {
        ConnectorError::InvalidMapping {
            message: message.into(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(identifier: impl Into<String>) -> Self {
        ConnectorError::NotFound {
            identifier: identifier.into(),
        }
    }

    /// Create a remote-call error.
    pub fn remote(message: impl Into<String>) -> Self {
        ConnectorError::Remote {
            message: message.into(),
            source: None,
        }
    }

    /// Create a remote-call error with source.
    pub fn remote_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConnectorError::Remote {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ConnectorError::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came back from a remote system rather than from
    /// local configuration or resolution.
    pub fn is_remote(&self) -> bool {
        matches!(self, ConnectorError::Remote { .. })
    }
}

/// Result type for connector operations.
pub type ConnectorResult<T> = Result<T, ConnectorError>;
