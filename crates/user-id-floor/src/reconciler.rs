//! Startup reconciliation of the user-id counter.
//!
//! Run once, after schema migration and before the user table takes live
//! writes. Two concurrent runs can race between reading `MAX(id)` and
//! writing the counter; callers starting several replicas against one
//! database must serialise this step themselves.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::{Config, IdentityConfig};
use crate::core::{MaxIdSource, SqlExecutor, SqlMaxId};
use crate::drivers;
use crate::error::{FloorError, Result};
use crate::floor::{FloorApplier, FloorApplierImpl, FloorOutcome, IdentifierFloor, SkipReason};
use crate::registry::{Dialect, DialectRegistry};

/// Forces newly generated user ids to start at or above a configured floor.
pub struct SequenceReconciler {
    floor: IdentifierFloor,
    applier: FloorApplierImpl,
    executor: Arc<dyn SqlExecutor>,
    max_id: Arc<dyn MaxIdSource>,
}

impl SequenceReconciler {
    /// Build a reconciler for the registry's active dialect.
    ///
    /// The executor must talk to that same dialect.
    pub fn new(
        registry: &DialectRegistry,
        identity: &IdentityConfig,
        executor: Arc<dyn SqlExecutor>,
        max_id: Arc<dyn MaxIdSource>,
    ) -> Result<Self> {
        let dialect = registry.active_dialect();
        if executor.dialect() != dialect {
            return Err(FloorError::Config(format!(
                "Executor is connected to {} but the active dialect is {}",
                executor.dialect(),
                dialect
            )));
        }

        Ok(Self {
            floor: IdentifierFloor::from(identity),
            applier: FloorApplierImpl::for_dialect(dialect, identity)?,
            executor,
            max_id,
        })
    }

    /// Like [`SequenceReconciler::new`], reading the max id with `MAX()`
    /// through the same executor.
    pub fn with_sql_max_id(
        registry: &DialectRegistry,
        identity: &IdentityConfig,
        executor: Arc<dyn SqlExecutor>,
    ) -> Result<Self> {
        let max_id = Arc::new(SqlMaxId::new(executor.clone(), identity)?);
        Self::new(registry, identity, executor, max_id)
    }

    pub fn floor(&self) -> IdentifierFloor {
        self.floor
    }

    pub fn dialect(&self) -> Dialect {
        self.applier.dialect()
    }

    /// Make the next generated user id at least `max(floor, MAX(id) + 1)`.
    ///
    /// Issues at most one counter write (two for SQLite when the bookkeeping
    /// row has to be created). Calling it again with unchanged data re-applies
    /// the same value. A table already holding id `i64::MAX` is reported as
    /// [`FloorError::IdSpaceExhausted`] and nothing is written.
    pub async fn ensure_identifier_floor(&self) -> Result<FloorOutcome> {
        if !self.floor.is_enabled() {
            debug!(
                "Identifier floor {} disables reconciliation",
                self.floor.value()
            );
            return Ok(FloorOutcome::Skipped(SkipReason::Disabled));
        }

        let dialect = self.dialect();
        let max_observed = self
            .max_id
            .max_id()
            .await
            .map_err(|e| FloorError::query(dialect, "reading the current max user id", e))?;

        let next_id = self.floor.target_next_id(max_observed).ok_or(
            FloorError::IdSpaceExhausted {
                dialect,
                max_id: max_observed,
            },
        )?;
        debug!(
            "Identifier floor {}: max observed id {}, next id {}",
            self.floor.value(),
            max_observed,
            next_id
        );

        let outcome = self.applier.apply(self.executor.as_ref(), next_id).await?;
        match outcome {
            FloorOutcome::Applied { next_id, .. } => {
                info!("{}: next user id set to {}", dialect, next_id);
            }
            FloorOutcome::Skipped(reason) => {
                debug!("{}: identifier floor skipped ({:?})", dialect, reason);
            }
        }
        Ok(outcome)
    }
}

/// Connect with the configured database and reconcile the user-id floor.
///
/// Convenience entry point for service startup. A disabled floor returns
/// before any connection is opened.
pub async fn ensure_identifier_floor(config: &Config) -> Result<FloorOutcome> {
    if !IdentifierFloor::from(&config.identity).is_enabled() {
        return Ok(FloorOutcome::Skipped(SkipReason::Disabled));
    }

    let registry = DialectRegistry::from_config(&config.database)?;
    let executor: Arc<dyn SqlExecutor> = Arc::new(drivers::connect(&registry).await?);
    let reconciler = SequenceReconciler::with_sql_max_id(&registry, &config.identity, executor)?;
    reconciler.ensure_identifier_floor().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SslMode;
    use crate::core::mock::{CallKind, FixedMaxId, RecordingExecutor};
    use crate::core::SqlParam;
    use crate::registry::ConnectionParams;
    use std::time::Duration;

    fn registry(dialect: Dialect) -> DialectRegistry {
        DialectRegistry::new(
            dialect,
            ConnectionParams {
                target: "test".to_string(),
                max_connections: 1,
                ssl_mode: SslMode::Disable,
                busy_timeout: Duration::from_secs(1),
            },
        )
    }

    fn identity(start: i64) -> IdentityConfig {
        IdentityConfig {
            start,
            ..IdentityConfig::default()
        }
    }

    fn build(
        dialect: Dialect,
        start: i64,
        max_id: Option<i64>,
    ) -> (SequenceReconciler, Arc<RecordingExecutor>) {
        let executor = Arc::new(RecordingExecutor::new(dialect));
        let reconciler = SequenceReconciler::new(
            &registry(dialect),
            &identity(start),
            executor.clone(),
            Arc::new(FixedMaxId(max_id)),
        )
        .unwrap();
        (reconciler, executor)
    }

    #[tokio::test]
    async fn test_disabled_floor_never_touches_database() {
        for dialect in [
            Dialect::MySql,
            Dialect::Postgres,
            Dialect::Sqlite,
            Dialect::ClickHouse,
        ] {
            for start in [-1, 0, 1] {
                // A failing max-id source proves it is never consulted.
                let (reconciler, executor) = build(dialect, start, None);
                let outcome = reconciler.ensure_identifier_floor().await.unwrap();
                assert_eq!(outcome, FloorOutcome::Skipped(SkipReason::Disabled));
                assert!(executor.calls().is_empty());
            }
        }
    }

    #[tokio::test]
    async fn test_mysql_uses_floor_above_data() {
        let (reconciler, executor) = build(Dialect::MySql, 100, Some(5));

        let outcome = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(
            outcome,
            FloorOutcome::Applied {
                dialect: Dialect::MySql,
                next_id: 100
            }
        );
        let writes = executor.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].sql, "ALTER TABLE `users` AUTO_INCREMENT = 100");
    }

    #[tokio::test]
    async fn test_postgres_uses_data_above_floor() {
        let (reconciler, executor) = build(Dialect::Postgres, 50, Some(60));
        executor.push_string(Ok(Some("users_id_seq".to_string())));

        let outcome = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(
            outcome,
            FloorOutcome::Applied {
                dialect: Dialect::Postgres,
                next_id: 61
            }
        );
        let writes = executor.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(
            writes[0].params,
            vec![SqlParam::Text("users_id_seq".into()), SqlParam::Int(60)]
        );
    }

    #[tokio::test]
    async fn test_postgres_without_sequence() {
        let (reconciler, executor) = build(Dialect::Postgres, 50, Some(0));
        executor.push_string(Ok(None));

        let outcome = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(outcome, FloorOutcome::Skipped(SkipReason::NoSequence));
        assert!(executor.writes().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_without_bookkeeping_table() {
        let (reconciler, executor) = build(Dialect::Sqlite, 10, Some(0));
        executor.push_i64(Ok(0));

        let outcome = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(
            outcome,
            FloorOutcome::Skipped(SkipReason::NoBookkeepingTable)
        );
        assert!(executor.writes().is_empty());
    }

    #[tokio::test]
    async fn test_sqlite_inserts_missing_row() {
        let (reconciler, executor) = build(Dialect::Sqlite, 10, Some(0));
        executor.push_i64(Ok(1));
        executor.push_execute(Ok(0));

        reconciler.ensure_identifier_floor().await.unwrap();

        let writes = executor.writes();
        assert_eq!(writes.len(), 2);
        assert!(writes[1].sql.starts_with("INSERT INTO sqlite_sequence"));
        assert_eq!(
            writes[1].params,
            vec![SqlParam::Text("users".into()), SqlParam::Int(9)]
        );
    }

    #[tokio::test]
    async fn test_sqlite_updates_existing_row() {
        let (reconciler, executor) = build(Dialect::Sqlite, 10, Some(20));
        executor.push_i64(Ok(1));
        executor.push_execute(Ok(1));

        reconciler.ensure_identifier_floor().await.unwrap();

        let writes = executor.writes();
        assert_eq!(writes.len(), 1);
        assert!(writes[0].sql.starts_with("UPDATE sqlite_sequence"));
        assert_eq!(
            writes[0].params,
            vec![SqlParam::Int(20), SqlParam::Text("users".into())]
        );
    }

    #[tokio::test]
    async fn test_clickhouse_is_unsupported() {
        let (reconciler, executor) = build(Dialect::ClickHouse, 10, Some(3));

        let outcome = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(
            outcome,
            FloorOutcome::Skipped(SkipReason::UnsupportedDialect(Dialect::ClickHouse))
        );
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_max_id_failure_aborts_before_any_write() {
        let (reconciler, executor) = build(Dialect::MySql, 100, None);

        let err = reconciler.ensure_identifier_floor().await.unwrap_err();

        assert!(matches!(
            err,
            FloorError::Query {
                dialect: Dialect::MySql,
                ..
            }
        ));
        assert!(err.to_string().contains("max user id"));
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_max_id_at_i64_max_is_an_error() {
        for dialect in [Dialect::MySql, Dialect::Postgres, Dialect::Sqlite] {
            let (reconciler, executor) = build(dialect, 10, Some(i64::MAX));

            let err = reconciler.ensure_identifier_floor().await.unwrap_err();

            assert!(matches!(
                err,
                FloorError::IdSpaceExhausted { max_id: i64::MAX, .. }
            ));
            assert_eq!(err.dialect(), Some(dialect));
            assert!(executor.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn test_idempotent_across_calls() {
        let (reconciler, executor) = build(Dialect::MySql, 100, Some(250));

        let first = reconciler.ensure_identifier_floor().await.unwrap();
        let second = reconciler.ensure_identifier_floor().await.unwrap();

        assert_eq!(first, second);
        let writes = executor.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].sql, writes[1].sql);
        assert_eq!(writes[0].sql, "ALTER TABLE `users` AUTO_INCREMENT = 251");
    }

    #[tokio::test]
    async fn test_with_sql_max_id_queries_before_writing() {
        let executor = Arc::new(RecordingExecutor::new(Dialect::MySql));
        executor.push_i64(Ok(7));
        let reconciler = SequenceReconciler::with_sql_max_id(
            &registry(Dialect::MySql),
            &identity(2002),
            executor.clone(),
        )
        .unwrap();

        reconciler.ensure_identifier_floor().await.unwrap();

        let calls = executor.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].kind, CallKind::Query);
        assert!(calls[0].sql.contains("MAX(`id`)"));
        assert_eq!(calls[1].sql, "ALTER TABLE `users` AUTO_INCREMENT = 2002");
    }

    #[test]
    fn test_rejects_executor_for_other_dialect() {
        let result = SequenceReconciler::new(
            &registry(Dialect::Postgres),
            &identity(100),
            Arc::new(RecordingExecutor::new(Dialect::MySql)),
            Arc::new(FixedMaxId(Some(0))),
        );
        assert!(matches!(result, Err(FloorError::Config(_))));
    }

    #[tokio::test]
    async fn test_entry_point_skips_connecting_when_disabled() {
        let mut config = Config::default();
        config.identity.start = 1;
        // Unreachable server: connecting would fail.
        config.database.dsn = "postgres://nobody@127.0.0.1:1/none".to_string();

        let outcome = ensure_identifier_floor(&config).await.unwrap();
        assert_eq!(outcome, FloorOutcome::Skipped(SkipReason::Disabled));
    }
}
