//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Broad classification of a [`ParaError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Client is not configured well enough to send anything
    Configuration,
    /// Session refresh rejected or request could not be signed
    Authentication,
    /// Server answered with a non-success status
    Remote,
    /// Network-level failure reported by the transport
    Transport,
    /// Response body could not be turned into the requested shape
    Decode,
    /// Caller supplied something that cannot be sent
    Input,
}

/// Main error type for Para client operations
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ParaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Remote error (HTTP {status}): {message}")]
    Remote {
        /// HTTP status code returned by the server
        status: u16,
        /// Error code from the `{code, message}` envelope, when one was sent
        code: Option<i64>,
        /// Envelope message, or the status reason phrase
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ParaError {
    /// Get the category for this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Auth(_) => ErrorCategory::Authentication,
            Self::Remote { .. } => ErrorCategory::Remote,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Decode(_) => ErrorCategory::Decode,
            Self::InvalidInput(_) => ErrorCategory::Input,
        }
    }

    /// HTTP status of a remote error
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` when the server reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if repeating the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Remote { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias for Para client operations
pub type Result<T> = std::result::Result<T, ParaError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16) -> ParaError {
        ParaError::Remote { status, code: None, message: "boom".to_string() }
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(ParaError::Config("x".into()).category(), ErrorCategory::Configuration);
        assert_eq!(ParaError::Auth("x".into()).category(), ErrorCategory::Authentication);
        assert_eq!(remote(400).category(), ErrorCategory::Remote);
        assert_eq!(ParaError::Transport("x".into()).category(), ErrorCategory::Transport);
        assert_eq!(ParaError::Decode("x".into()).category(), ErrorCategory::Decode);
        assert_eq!(ParaError::InvalidInput("x".into()).category(), ErrorCategory::Input);
    }

    #[test]
    fn test_not_found_and_retry() {
        assert!(remote(404).is_not_found());
        assert!(!remote(400).is_not_found());
        assert!(remote(503).is_retryable());
        assert!(!remote(404).is_retryable());
        assert!(ParaError::Transport("reset".into()).is_retryable());
        assert!(!ParaError::Config("no key".into()).is_retryable());
    }

    #[test]
    fn test_remote_display_and_serde() {
        let err = ParaError::Remote { status: 400, code: Some(400), message: "bad".into() };
        assert_eq!(err.to_string(), "Remote error (HTTP 400): bad");

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Remote");
        assert_eq!(json["details"]["code"], 400);

        let back: ParaError = serde_json::from_value(json).unwrap();
        assert_eq!(back, err);
    }
}
