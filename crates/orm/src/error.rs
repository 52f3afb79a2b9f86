//! Error types for the ORM system
//!
//! Builder-time failures (duplicate tables, rename collisions, bad
//! configuration) and per-lookup failures share one error enum so callers can
//! propagate both with `?`.

use std::fmt;

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, OrmError>;

/// ORM result type alias
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for ORM operations
#[derive(Debug, Clone, Error)]
pub enum OrmError {
    /// Schema or environment configuration is inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A caller-supplied argument cannot be used
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No row matched the lookup key
    #[error("Record not found in table '{table}' for key {key}")]
    NotFound { table: String, key: String },

    /// Row shape or column decoding did not match the selection
    #[error("Scan error: {0}")]
    Scan(String),

    /// Connection could not be opened or pinged
    #[error("Connection error: {0}")]
    Connection(String),

    /// Driver-level query failure
    #[error("Database error: {0}")]
    Database(String),

    /// A lifecycle hook rejected the operation
    #[error("Hook '{event}' failed: {message}")]
    Hook { event: String, message: String },
}

impl OrmError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        OrmError::Configuration(message.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        OrmError::InvalidArgument(message.into())
    }

    /// Create a not found error
    pub fn not_found(table: impl Into<String>, key: impl fmt::Display) -> Self {
        OrmError::NotFound {
            table: table.into(),
            key: key.to_string(),
        }
    }

    /// Create a scan error
    pub fn scan(message: impl Into<String>) -> Self {
        OrmError::Scan(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, OrmError::NotFound { .. })
    }
}

impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                OrmError::Scan(format!("failed to decode column {}: {}", index, source))
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                OrmError::Connection(err.to_string())
            }
            other => OrmError::Database(other.to_string()),
        }
    }
}

impl From<tessera_core::ConfigError> for OrmError {
    fn from(err: tessera_core::ConfigError) -> Self {
        OrmError::Configuration(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for OrmError {
    fn from(err: mongodb::error::Error) -> Self {
        OrmError::Database(err.to_string())
    }
}

/// A non-fatal problem met while copying a column into a struct field
///
/// The field keeps its default value; the lookup itself still succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionWarning {
    pub column: String,
    pub message: String,
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column '{}': {}", self.column, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = OrmError::not_found("users", 42);
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "Record not found in table 'users' for key 42"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let err: OrmError = tessera_core::ConfigError::missing_required("db_name", "set DB_NAME").into();
        assert!(matches!(err, OrmError::Configuration(ref msg) if msg.contains("DB_NAME")));
    }

    #[test]
    fn test_sqlx_decode_error_maps_to_scan() {
        let err: OrmError = sqlx::Error::ColumnDecode {
            index: "0".to_string(),
            source: "bad bytes".into(),
        }
        .into();
        assert!(matches!(err, OrmError::Scan(_)));
    }
}
