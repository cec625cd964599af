//! Identifier validation and quoting.
//!
//! Table and column names cannot be bound as statement parameters, so the
//! floor appliers splice them into SQL text. Every name goes through
//! [`validate_identifier`] and a dialect-specific quoting function first.

use crate::error::{FloorError, Result};
use crate::registry::Dialect;

/// Maximum identifier length (conservative limit across databases).
/// - PostgreSQL: 63 bytes
/// - MySQL: 64 characters
/// - SQLite: unlimited
const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Reject empty identifiers, identifiers with NUL bytes, and identifiers
/// longer than 128 bytes.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FloorError::Config("Identifier cannot be empty".to_string()));
    }

    if name.contains('\0') {
        return Err(FloorError::Config(format!(
            "Identifier contains null byte: {:?}",
            name
        )));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(FloorError::Config(format!(
            "Identifier exceeds maximum length of {} bytes (got {} bytes): {:?}",
            MAX_IDENTIFIER_LENGTH,
            name.len(),
            name
        )));
    }

    Ok(())
}

/// Quote a MySQL identifier using backticks.
///
/// ```ignore
/// assert_eq!(quote_mysql("users")?, "`users`");
/// assert_eq!(quote_mysql("table`name")?, "`table``name`");
/// ```
pub fn quote_mysql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("`{}`", name.replace('`', "``")))
}

/// Quote a PostgreSQL or SQLite identifier using double quotes.
pub fn quote_ansi(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

/// Quote an identifier for the given dialect.
pub fn quote_for(dialect: Dialect, name: &str) -> Result<String> {
    match dialect {
        Dialect::MySql | Dialect::ClickHouse => quote_mysql(name),
        Dialect::Postgres | Dialect::Sqlite => quote_ansi(name),
    }
}
