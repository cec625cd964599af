//! Error types for identifier floor reconciliation.

use thiserror::Error;

use crate::registry::Dialect;

/// Opaque error raised by a database driver or an injected primitive.
///
/// Drivers convert their native error types into this box; the reconciler
/// wraps it with the dialect and the operation that was attempted.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for floor reconciliation.
#[derive(Error, Debug)]
pub enum FloorError {
    /// Configuration error (invalid YAML, unknown dialect, bad identifier, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading state failed: the max-id primitive or catalog introspection.
    #[error("{dialect} query failed while {operation}: {source}")]
    Query {
        dialect: Dialect,
        operation: String,
        #[source]
        source: DriverError,
    },

    /// The statement that sets the counter failed.
    #[error("{dialect} write failed while {operation}: {source}")]
    Write {
        dialect: Dialect,
        operation: String,
        #[source]
        source: DriverError,
    },

    /// The highest stored id is already `i64::MAX`; there is no next id.
    #[error("{dialect} user id space exhausted: max id {max_id} leaves no next id")]
    IdSpaceExhausted { dialect: Dialect, max_id: i64 },

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl FloorError {
    /// Create a Query error for the given dialect and operation.
    pub fn query(dialect: Dialect, operation: impl Into<String>, source: DriverError) -> Self {
        FloorError::Query {
            dialect,
            operation: operation.into(),
            source,
        }
    }

    /// Create a Write error for the given dialect and operation.
    pub fn write(dialect: Dialect, operation: impl Into<String>, source: DriverError) -> Self {
        FloorError::Write {
            dialect,
            operation: operation.into(),
            source,
        }
    }

    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl std::fmt::Display, context: impl Into<String>) -> Self {
        FloorError::Pool {
            message: message.to_string(),
            context: context.into(),
        }
    }

    /// Dialect the failure belongs to, if it came from the database.
    pub fn dialect(&self) -> Option<Dialect> {
        match self {
            FloorError::Query { dialect, .. }
            | FloorError::Write { dialect, .. }
            | FloorError::IdSpaceExhausted { dialect, .. } => Some(*dialect),
            _ => None,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for floor operations.
pub type Result<T> = std::result::Result<T, FloorError>;
