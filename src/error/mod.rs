use thiserror::Error;

use crate::query_builder::DatabaseBackend;
use crate::types::DataType;

pub mod context;

pub type Result<T> = std::result::Result<T, Error>;

pub use context::ErrorContext;

/// Main error type for SQL rendering
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed `Column` or `Expression` construction
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Type {data_type:?} is not supported by {backend:?}")]
    UnsupportedType {
        backend: DatabaseBackend,
        data_type: DataType,
    },

    #[error("Feature not supported in {backend:?}: {feature}")]
    UnsupportedFeature {
        backend: DatabaseBackend,
        feature: String,
    },

    /// Rows passed to a multi-row insert do not share one key set
    #[error("Schema mismatch in row {row}: expected fields [{expected}], found [{found}]")]
    SchemaMismatch {
        row: usize,
        expected: String,
        found: String,
    },

    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    #[error("Statement for {backend:?} is {length} bytes, exceeding the maximum of {max}")]
    MaxLengthExceeded {
        backend: DatabaseBackend,
        length: usize,
        max: usize,
    },

    #[error("Missing required clause: {clause}. Add .{clause}() to your query.")]
    MissingClause { clause: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure reported by an execution layer, carrying the statement text
    #[error("Execution error: {message} (sql: {sql})")]
    Execution { sql: String, message: String },

    #[error("{message}")]
    WithContext {
        message: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_expression(msg: impl Into<String>) -> Self {
        Self::InvalidExpression(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn unsupported_feature(backend: DatabaseBackend, feature: impl Into<String>) -> Self {
        Self::UnsupportedFeature {
            backend,
            feature: feature.into(),
        }
    }

    pub fn missing_clause(clause: impl Into<String>) -> Self {
        Self::MissingClause {
            clause: clause.into(),
        }
    }

    pub fn execution(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            sql: sql.into(),
            message: message.into(),
        }
    }

    // Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            message: context.into(),
            source: Box::new(self),
        }
    }

    /// The SQL text attached to an execution failure, looking through context wrappers
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Execution { sql, .. } => Some(sql),
            Error::WithContext { source, .. } => source.sql(),
            _ => None,
        }
    }

    /// Only execution failures are retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Execution { .. } => true,
            Error::WithContext { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Stable error code for diagnostics
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Validation(_) => "E_VALIDATION",
            Error::UnsupportedType { .. } => "E_UNSUPPORTED_TYPE",
            Error::UnsupportedFeature { .. } => "E_UNSUPPORTED_FEATURE",
            Error::SchemaMismatch { .. } => "E_SCHEMA_MISMATCH",
            Error::InvalidExpression(_) => "E_INVALID_EXPRESSION",
            Error::MaxLengthExceeded { .. } => "E_MAX_LENGTH",
            Error::MissingClause { .. } => "E_MISSING_CLAUSE",
            Error::Config(_) => "E_CONFIG",
            Error::Io(_) => "E_IO",
            Error::Json(_) => "E_JSON",
            Error::Execution { .. } => "E_EXECUTION",
            Error::WithContext { source, .. } => source.error_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_survives_context_wrapping() {
        let error = Error::execution("SELECT 1", "connection reset")
            .with_context("Loading dashboard counters");

        assert_eq!(error.sql(), Some("SELECT 1"));
        assert_eq!(error.error_code(), "E_EXECUTION");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_compiler_errors_are_not_retryable() {
        let error = Error::UnsupportedType {
            backend: DatabaseBackend::MySQL,
            data_type: DataType::DateTimeOffset,
        };

        assert!(!error.is_retryable());
        assert_eq!(error.sql(), None);
        assert!(error.to_string().contains("DateTimeOffset"));
    }
}
