//! PostgreSQL: move the sequence that backs the id column.

use async_trait::async_trait;
use tracing::debug;

use super::{FloorApplier, FloorOutcome, SkipReason};
use crate::core::{quote_ansi, validate_identifier, SqlExecutor, SqlParam};
use crate::error::{FloorError, Result};
use crate::registry::Dialect;

const SERIAL_SEQUENCE_SQL: &str = "SELECT pg_get_serial_sequence($1, $2)";

// is_called = true: the next nextval() returns value + 1.
const SETVAL_SQL: &str = "SELECT setval($1::text::regclass, $2, true)";

#[derive(Debug, Clone)]
pub struct PostgresFloor {
    /// Quoted, because pg_get_serial_sequence parses its first argument as
    /// an SQL name.
    table: String,
    /// Unquoted, because the second argument is taken literally.
    column: String,
}

impl PostgresFloor {
    pub fn new(table: &str, column: &str) -> Result<Self> {
        validate_identifier(column)?;
        Ok(Self {
            table: quote_ansi(table)?,
            column: column.to_string(),
        })
    }

    async fn resolve_sequence(&self, executor: &dyn SqlExecutor) -> Result<Option<String>> {
        let params = [
            SqlParam::Text(self.table.clone()),
            SqlParam::Text(self.column.clone()),
        ];
        let seq = executor
            .query_opt_string(SERIAL_SEQUENCE_SQL, &params)
            .await
            .map_err(|e| {
                FloorError::query(
                    Dialect::Postgres,
                    format!("resolving the sequence for {}.{}", self.table, self.column),
                    e,
                )
            })?;
        Ok(seq.filter(|s| !s.trim().is_empty()))
    }
}

#[async_trait]
impl FloorApplier for PostgresFloor {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn apply(&self, executor: &dyn SqlExecutor, next_id: i64) -> Result<FloorOutcome> {
        let Some(sequence) = self.resolve_sequence(executor).await? else {
            debug!(
                "{}.{} is not backed by a sequence; nothing to reconcile",
                self.table, self.column
            );
            return Ok(FloorOutcome::Skipped(SkipReason::NoSequence));
        };

        let value = next_id - 1;
        debug!("PostgreSQL identifier floor: setval({}, {}, true)", sequence, value);

        let params = [SqlParam::Text(sequence.clone()), SqlParam::Int(value)];
        executor.execute(SETVAL_SQL, &params).await.map_err(|e| {
            FloorError::write(Dialect::Postgres, format!("setting sequence {}", sequence), e)
        })?;

        Ok(FloorOutcome::Applied {
            dialect: Dialect::Postgres,
            next_id,
        })
    }
}
