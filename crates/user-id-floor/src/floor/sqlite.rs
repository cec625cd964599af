//! SQLite: write the table's row in `sqlite_sequence`.
//!
//! `sqlite_sequence` only exists once some table declared with AUTOINCREMENT
//! has been created, and a table only gets a row there after its first
//! insert. A missing bookkeeping table means the floor cannot be enforced
//! yet; that is reported as a skip, not an error.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{FloorApplier, FloorOutcome, SkipReason};
use crate::core::{validate_identifier, SqlExecutor, SqlParam};
use crate::error::{FloorError, Result};
use crate::registry::Dialect;

const BOOKKEEPING_EXISTS_SQL: &str =
    "SELECT count(1) FROM sqlite_master WHERE type='table' AND name='sqlite_sequence'";
const UPDATE_SQL: &str = "UPDATE sqlite_sequence SET seq = ? WHERE name = ?";
const INSERT_SQL: &str = "INSERT INTO sqlite_sequence(name, seq) VALUES(?, ?)";

#[derive(Debug, Clone)]
pub struct SqliteFloor {
    /// Stored unquoted: it is a value in `sqlite_sequence.name`.
    table: String,
}

impl SqliteFloor {
    pub fn new(table: &str) -> Result<Self> {
        validate_identifier(table)?;
        Ok(Self {
            table: table.to_string(),
        })
    }

    async fn bookkeeping_exists(&self, executor: &dyn SqlExecutor) -> Result<bool> {
        let count = executor
            .query_i64(BOOKKEEPING_EXISTS_SQL, &[])
            .await
            .map_err(|e| FloorError::query(Dialect::Sqlite, "checking for sqlite_sequence", e))?;
        Ok(count > 0)
    }
}

#[async_trait]
impl FloorApplier for SqliteFloor {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn apply(&self, executor: &dyn SqlExecutor, next_id: i64) -> Result<FloorOutcome> {
        if !self.bookkeeping_exists(executor).await? {
            warn!(
                "sqlite_sequence does not exist yet; identifier floor for '{}' will not apply \
                 until an AUTOINCREMENT table has been created",
                self.table
            );
            return Ok(FloorOutcome::Skipped(SkipReason::NoBookkeepingTable));
        }

        let seq = next_id - 1;
        let updated = executor
            .execute(
                UPDATE_SQL,
                &[SqlParam::Int(seq), SqlParam::Text(self.table.clone())],
            )
            .await
            .map_err(|e| {
                FloorError::write(Dialect::Sqlite, "updating sqlite_sequence row", e)
            })?;

        if updated == 0 {
            debug!(
                "No sqlite_sequence row for '{}'; inserting seq = {}",
                self.table, seq
            );
            executor
                .execute(
                    INSERT_SQL,
                    &[SqlParam::Text(self.table.clone()), SqlParam::Int(seq)],
                )
                .await
                .map_err(|e| {
                    FloorError::write(Dialect::Sqlite, "inserting sqlite_sequence row", e)
                })?;
        }

        Ok(FloorOutcome::Applied {
            dialect: Dialect::Sqlite,
            next_id,
        })
    }
}
