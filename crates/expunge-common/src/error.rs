//! Error types for expunge

use serde::Serialize;
use thiserror::Error;

/// Result type alias for expunge operations
pub type Result<T> = std::result::Result<T, ExpungeError>;

/// Unified error type for all expunge operations
///
/// Every variant is terminal: nothing in the workspace retries or recovers
/// locally, the binary maps any of them to a non-zero exit status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpungeError {
    /// Missing or invalid connection configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport, server selection, or authentication failure
    #[error("Connection error: {0}")]
    Connection(String),

    /// Malformed document identifier (rejected before any network call)
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Store-side failure while running the delete
    #[error("Operation error: {0}")]
    Operation(String),
}

/// Coarse classification of an [`ExpungeError`], used in machine-readable reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Connection,
    InvalidIdentifier,
    Operation,
}

impl ExpungeError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExpungeError::Config(_) => ErrorKind::Config,
            ExpungeError::Connection(_) => ErrorKind::Connection,
            ExpungeError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            ExpungeError::Operation(_) => ErrorKind::Operation,
        }
    }

    /// Returns the message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            ExpungeError::Config(msg)
            | ExpungeError::Connection(msg)
            | ExpungeError::InvalidIdentifier(msg)
            | ExpungeError::Operation(msg) => msg,
        }
    }

    /// Returns true if the error was caused by caller input rather than the store
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ExpungeError::Config(_) | ExpungeError::InvalidIdentifier(_)
        )
    }
}

// MongoDB-specific error conversions (when mongodb-errors feature is enabled)
#[cfg(feature = "mongodb-errors")]
impl From<mongodb::error::Error> for ExpungeError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind as DriverKind;
        match err.kind.as_ref() {
            DriverKind::ServerSelection { .. }
            | DriverKind::Io(_)
            | DriverKind::Authentication { .. }
            | DriverKind::DnsResolve { .. }
            | DriverKind::ConnectionPoolCleared { .. } => {
                ExpungeError::Connection(err.to_string())
            }
            DriverKind::InvalidArgument { .. } => ExpungeError::Config(err.to_string()),
            _ => ExpungeError::Operation(err.to_string()),
        }
    }
}

#[cfg(feature = "mongodb-errors")]
impl From<bson::oid::Error> for ExpungeError {
    fn from(err: bson::oid::Error) -> Self {
        ExpungeError::InvalidIdentifier(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let err = ExpungeError::Config("MONGO_HOST is empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: MONGO_HOST is empty");
    }

    #[test]
    fn test_error_display_connection() {
        let err = ExpungeError::Connection("timeout".to_string());
        assert_eq!(err.to_string(), "Connection error: timeout");
    }

    #[test]
    fn test_error_display_invalid_identifier() {
        let err = ExpungeError::InvalidIdentifier("'zz' is not 24 hex characters".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid identifier: 'zz' is not 24 hex characters"
        );
    }

    #[test]
    fn test_error_display_operation() {
        let err = ExpungeError::Operation("not primary".to_string());
        assert_eq!(err.to_string(), "Operation error: not primary");
    }

    #[test]
    fn test_kind_and_message() {
        let err = ExpungeError::Connection("refused".to_string());
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert_eq!(err.message(), "refused");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorKind::InvalidIdentifier).unwrap();
        assert_eq!(json, "\"invalid_identifier\"");
    }

    #[test]
    fn test_is_input_error() {
        assert!(ExpungeError::Config("x".to_string()).is_input_error());
        assert!(ExpungeError::InvalidIdentifier("x".to_string()).is_input_error());
        assert!(!ExpungeError::Connection("x".to_string()).is_input_error());
        assert!(!ExpungeError::Operation("x".to_string()).is_input_error());
    }

    #[cfg(feature = "mongodb-errors")]
    #[test]
    fn test_from_oid_error() {
        let oid_err = bson::oid::ObjectId::parse_str("zz").unwrap_err();
        let err: ExpungeError = oid_err.into();
        assert!(matches!(err, ExpungeError::InvalidIdentifier(_)));
    }
}
