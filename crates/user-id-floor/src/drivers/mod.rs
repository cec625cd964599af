//! Database driver implementations of [`SqlExecutor`].
//!
//! - [`mysql`]: MySQL/MariaDB over SQLx (feature `mysql`)
//! - [`postgres`]: PostgreSQL over deadpool-postgres (feature `postgres`)
//! - [`sqlite`]: SQLite over SQLx (feature `sqlite`)
//! - [`common`]: shared helpers (pool timeouts, TLS)
//!
//! [`connect`] opens the driver for the registry's active dialect and wraps
//! it in [`ExecutorImpl`], which dispatches statically.

pub mod common;
#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(not(any(feature = "mysql", feature = "postgres", feature = "sqlite")))]
compile_error!("enable at least one of the `mysql`, `postgres` or `sqlite` features");

#[cfg(feature = "mysql")]
pub use mysql::MysqlExecutor;
#[cfg(feature = "postgres")]
pub use postgres::PostgresExecutor;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteExecutor;

use async_trait::async_trait;

use crate::core::{DriverResult, SqlExecutor, SqlParam};
use crate::error::{FloorError, Result};
use crate::registry::{Dialect, DialectRegistry};

/// Enum-based static dispatch over the compiled-in drivers.
pub enum ExecutorImpl {
    #[cfg(feature = "mysql")]
    MySql(MysqlExecutor),
    #[cfg(feature = "postgres")]
    Postgres(PostgresExecutor),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteExecutor),
}

/// Open a connection pool for the active dialect.
///
/// # Errors
///
/// Returns a configuration error for dialects without a driver (ClickHouse,
/// or a dialect whose feature is disabled) and a pool error when the
/// database cannot be reached.
pub async fn connect(registry: &DialectRegistry) -> Result<ExecutorImpl> {
    let params = registry.connection();
    match registry.active_dialect() {
        #[cfg(feature = "mysql")]
        Dialect::MySql => Ok(ExecutorImpl::MySql(MysqlExecutor::connect(params).await?)),
        #[cfg(feature = "postgres")]
        Dialect::Postgres => Ok(ExecutorImpl::Postgres(
            PostgresExecutor::connect(params).await?,
        )),
        #[cfg(feature = "sqlite")]
        Dialect::Sqlite => Ok(ExecutorImpl::Sqlite(SqliteExecutor::connect(params).await?)),
        other => Err(FloorError::Config(format!(
            "No driver available for {}",
            other
        ))),
    }
}

#[async_trait]
impl SqlExecutor for ExecutorImpl {
    fn dialect(&self) -> Dialect {
        match self {
            #[cfg(feature = "mysql")]
            ExecutorImpl::MySql(e) => e.dialect(),
            #[cfg(feature = "postgres")]
            ExecutorImpl::Postgres(e) => e.dialect(),
            #[cfg(feature = "sqlite")]
            ExecutorImpl::Sqlite(e) => e.dialect(),
        }
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DriverResult<u64> {
        match self {
            #[cfg(feature = "mysql")]
            ExecutorImpl::MySql(e) => e.execute(sql, params).await,
            #[cfg(feature = "postgres")]
            ExecutorImpl::Postgres(e) => e.execute(sql, params).await,
            #[cfg(feature = "sqlite")]
            ExecutorImpl::Sqlite(e) => e.execute(sql, params).await,
        }
    }

    async fn query_i64(&self, sql: &str, params: &[SqlParam]) -> DriverResult<i64> {
        match self {
            #[cfg(feature = "mysql")]
            ExecutorImpl::MySql(e) => e.query_i64(sql, params).await,
            #[cfg(feature = "postgres")]
            ExecutorImpl::Postgres(e) => e.query_i64(sql, params).await,
            #[cfg(feature = "sqlite")]
            ExecutorImpl::Sqlite(e) => e.query_i64(sql, params).await,
        }
    }

    async fn query_opt_string(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<Option<String>> {
        match self {
            #[cfg(feature = "mysql")]
            ExecutorImpl::MySql(e) => e.query_opt_string(sql, params).await,
            #[cfg(feature = "postgres")]
            ExecutorImpl::Postgres(e) => e.query_opt_string(sql, params).await,
            #[cfg(feature = "sqlite")]
            ExecutorImpl::Sqlite(e) => e.query_opt_string(sql, params).await,
        }
    }
}
