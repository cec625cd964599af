//! MySQL/MariaDB: set the table's `AUTO_INCREMENT` counter.
//!
//! InnoDB never moves the counter below `MAX(id) + 1`, so asking for a lower
//! value is a harmless no-op and the statement is idempotent.

use async_trait::async_trait;
use tracing::debug;

use super::{FloorApplier, FloorOutcome};
use crate::core::{quote_mysql, SqlExecutor};
use crate::error::{FloorError, Result};
use crate::registry::Dialect;

#[derive(Debug, Clone)]
pub struct MysqlFloor {
    table: String,
}

impl MysqlFloor {
    pub fn new(table: &str) -> Result<Self> {
        Ok(Self {
            table: quote_mysql(table)?,
        })
    }

    /// `ALTER TABLE` does not take placeholders for table options, so the
    /// value is rendered as a literal.
    fn alter_sql(&self, next_id: i64) -> String {
        format!("ALTER TABLE {} AUTO_INCREMENT = {}", self.table, next_id)
    }
}

#[async_trait]
impl FloorApplier for MysqlFloor {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn apply(&self, executor: &dyn SqlExecutor, next_id: i64) -> Result<FloorOutcome> {
        let sql = self.alter_sql(next_id);
        debug!("MySQL identifier floor: {}", sql);

        executor.execute(&sql, &[]).await.map_err(|e| {
            FloorError::write(
                Dialect::MySql,
                format!("setting AUTO_INCREMENT on {}", self.table),
                e,
            )
        })?;

        Ok(FloorOutcome::Applied {
            dialect: Dialect::MySql,
            next_id,
        })
    }
}
