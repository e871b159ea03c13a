//! Error types for the Cameo application.

use thiserror::Error;

/// A shared error type for the entire Cameo application.
///
/// This provides typed, structured error variants so that callers can decide
/// whether a failure should degrade (missing enrichment, skipped
/// replenishment) or be shown to the user (chat call failed).
#[derive(Error, Debug, Clone)]
pub enum CameoError {
    /// Network-level failure: connect, timeout, or reading the body.
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success status.
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// The backend answered 2xx but the payload did not deserialize.
    #[error("Malformed response from {endpoint}: {message}")]
    Malformed { endpoint: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CameoError {
    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a Backend error
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }

    /// Creates a Malformed error
    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Malformed {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a Transport error
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Check if this is a Backend error
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this error came from talking to the backend at all.
    ///
    /// Returns true for `Transport`, `Backend` and `Malformed` — the errors
    /// the discovery deck absorbs into degraded state instead of surfacing.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Backend { .. } | Self::Malformed { .. }
        )
    }
}

/// A type alias for `Result<T, CameoError>`.
pub type Result<T> = std::result::Result<T, CameoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        let err = CameoError::backend(503, "unavailable");
        assert!(err.is_backend());
        assert_eq!(err.to_string(), "Backend error (503): unavailable");

        let err = CameoError::transport("connection refused");
        assert!(err.is_transport());
        assert!(!err.is_backend());
    }

    #[test]
    fn test_fetch_failures_are_degradable() {
        assert!(CameoError::transport("timeout").is_fetch_failure());
        assert!(CameoError::backend(500, "boom").is_fetch_failure());
        assert!(CameoError::malformed("/persona", "missing field").is_fetch_failure());
        assert!(!CameoError::config("no base url").is_fetch_failure());
    }
}
