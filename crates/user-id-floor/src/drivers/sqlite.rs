//! SQLite executor over an SQLx pool.
//!
//! The database file is created if missing. `busy_timeout` comes from
//! `database.sqlite_busy_timeout_ms`.

use async_trait::async_trait;
use sqlx::query::Query;
use sqlx::sqlite::{
    Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions,
};
use sqlx::Row;
use tracing::info;

use super::common::POOL_ACQUIRE_TIMEOUT;
use crate::core::{DriverResult, SqlExecutor, SqlParam};
use crate::error::{FloorError, Result};
use crate::registry::{ConnectionParams, Dialect};

pub struct SqliteExecutor {
    pool: SqlitePool,
}

impl SqliteExecutor {
    pub async fn connect(params: &ConnectionParams) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&params.target)
            .create_if_missing(true)
            .busy_timeout(params.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(params.max_connections)
            .acquire_timeout(POOL_ACQUIRE_TIMEOUT)
            .connect_with(options)
            .await
            .map_err(|e| FloorError::pool(e, "opening SQLite database"))?;

        info!("Opened SQLite database: {}", params.target);

        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Int(v) => query.bind(*v),
            SqlParam::Text(s) => query.bind(s.as_str()),
        };
    }
    query
}

#[async_trait]
impl SqlExecutor for SqliteExecutor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DriverResult<u64> {
        let result = bind_all(sqlx::query(sql), params)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn query_i64(&self, sql: &str, params: &[SqlParam]) -> DriverResult<i64> {
        let row = bind_all(sqlx::query(sql), params)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn query_opt_string(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<Option<String>> {
        let row = bind_all(sqlx::query(sql), params)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(row.try_get::<Option<String>, _>(0)?),
            None => Ok(None),
        }
    }
}
