//! Traits at the seam between floor logic and the database.
//!
//! - [`SqlExecutor`]: parameterised statement execution and scalar scanning
//! - [`MaxIdSource`]: the "current highest user id" primitive
//!
//! Both return opaque [`DriverError`]s. Callers attach the dialect and the
//! operation being attempted when converting them into [`FloorError`]s.
//!
//! [`FloorError`]: crate::error::FloorError

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::IdentityConfig;
use crate::error::{DriverError, Result};
use crate::registry::Dialect;

use super::identifier::quote_for;

/// Result of a raw driver call.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Int(i64),
    Text(String),
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::Int(v)
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(v.to_string())
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(v)
    }
}

/// Generic SQL execution over one database connection pool.
///
/// Placeholders use the native syntax of [`SqlExecutor::dialect`]: `?` for
/// MySQL and SQLite, `$n` for PostgreSQL.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Dialect this executor talks to.
    fn dialect(&self) -> Dialect;

    /// Execute a statement and return the number of rows affected.
    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DriverResult<u64>;

    /// Run a query returning a single integer in the first column of the
    /// first row.
    async fn query_i64(&self, sql: &str, params: &[SqlParam]) -> DriverResult<i64>;

    /// Run a query returning a single, possibly NULL, string.
    /// A query that yields no rows also returns `None`.
    async fn query_opt_string(&self, sql: &str, params: &[SqlParam])
        -> DriverResult<Option<String>>;
}

/// Source of the highest identifier currently stored in the user table.
///
/// Implementations return 0 for an empty table.
#[async_trait]
pub trait MaxIdSource: Send + Sync {
    async fn max_id(&self) -> DriverResult<i64>;
}

/// [`MaxIdSource`] that asks the database with `MAX()` on every call.
pub struct SqlMaxId {
    executor: Arc<dyn SqlExecutor>,
    sql: String,
}

impl SqlMaxId {
    pub fn new(executor: Arc<dyn SqlExecutor>, identity: &IdentityConfig) -> Result<Self> {
        let sql = max_id_query(executor.dialect(), identity)?;
        Ok(Self { executor, sql })
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

#[async_trait]
impl MaxIdSource for SqlMaxId {
    async fn max_id(&self) -> DriverResult<i64> {
        self.executor.query_i64(&self.sql, &[]).await
    }
}

/// Build `SELECT MAX(column)` for the user table, cast to a 64-bit integer
/// so every driver decodes it the same way.
pub fn max_id_query(dialect: Dialect, identity: &IdentityConfig) -> Result<String> {
    let table = quote_for(dialect, &identity.table)?;
    let column = quote_for(dialect, &identity.column)?;
    let int_type = match dialect {
        Dialect::MySql => "SIGNED",
        _ => "BIGINT",
    };
    Ok(format!(
        "SELECT CAST(COALESCE(MAX({}), 0) AS {}) FROM {}",
        column, int_type, table
    ))
}
