//! Dialect-specific application of the identifier floor.
//!
//! Each backend keeps "the next generated id" somewhere different:
//!
//! - [`MysqlFloor`]: the table's `AUTO_INCREMENT` counter
//! - [`PostgresFloor`]: the sequence behind the id column
//! - [`SqliteFloor`]: the table's row in `sqlite_sequence`
//! - [`NoopFloor`]: dialects without a counter to reconcile
//!
//! [`FloorApplierImpl::for_dialect`] picks the implementation once, from the
//! active dialect, and dispatches statically.

mod mysql;
mod noop;
mod postgres;
mod sqlite;

pub use mysql::MysqlFloor;
pub use noop::NoopFloor;
pub use postgres::PostgresFloor;
pub use sqlite::SqliteFloor;

use async_trait::async_trait;

use crate::config::IdentityConfig;
use crate::core::SqlExecutor;
use crate::error::Result;
use crate::registry::Dialect;

/// Minimum value the next generated user id must take.
///
/// A floor of 0 or 1 means "no forced minimum" and disables reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierFloor(i64);

impl IdentifierFloor {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn is_enabled(&self) -> bool {
        self.0 > 1
    }

    /// `max(floor, max_observed + 1)`: honours the floor without ever moving
    /// the counter below rows that already exist.
    ///
    /// `None` when `max_observed` is `i64::MAX` and no id is left to hand out.
    pub fn target_next_id(&self, max_observed: i64) -> Option<i64> {
        max_observed.checked_add(1).map(|next| self.0.max(next))
    }
}

impl From<&IdentityConfig> for IdentifierFloor {
    fn from(identity: &IdentityConfig) -> Self {
        Self(identity.start)
    }
}

/// Why nothing was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Floor is 0 or 1.
    Disabled,
    /// PostgreSQL: the id column is not backed by a sequence.
    NoSequence,
    /// SQLite: `sqlite_sequence` has not been created yet.
    NoBookkeepingTable,
    /// The dialect has no counter this crate knows how to set.
    UnsupportedDialect(Dialect),
}

/// What a reconciliation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorOutcome {
    /// The counter was set so the next generated id is `next_id`.
    Applied { dialect: Dialect, next_id: i64 },
    Skipped(SkipReason),
}

impl FloorOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, FloorOutcome::Applied { .. })
    }
}

/// Sets a dialect's counter so that the next generated id is `next_id`.
#[async_trait]
pub trait FloorApplier: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Apply the counter update. Absent counter state that is expected
    /// before any data exists is reported as [`FloorOutcome::Skipped`].
    async fn apply(&self, executor: &dyn SqlExecutor, next_id: i64) -> Result<FloorOutcome>;
}

/// Static dispatch over the per-dialect appliers.
#[derive(Debug)]
pub enum FloorApplierImpl {
    MySql(MysqlFloor),
    Postgres(PostgresFloor),
    Sqlite(SqliteFloor),
    Noop(NoopFloor),
}

impl FloorApplierImpl {
    /// Select the applier for `dialect`, bound to the user table in `identity`.
    pub fn for_dialect(dialect: Dialect, identity: &IdentityConfig) -> Result<Self> {
        Ok(match dialect {
            Dialect::MySql => FloorApplierImpl::MySql(MysqlFloor::new(&identity.table)?),
            Dialect::Postgres => {
                FloorApplierImpl::Postgres(PostgresFloor::new(&identity.table, &identity.column)?)
            }
            Dialect::Sqlite => FloorApplierImpl::Sqlite(SqliteFloor::new(&identity.table)?),
            Dialect::ClickHouse => FloorApplierImpl::Noop(NoopFloor::new(dialect)),
        })
    }
}

#[async_trait]
impl FloorApplier for FloorApplierImpl {
    fn dialect(&self) -> Dialect {
        match self {
            FloorApplierImpl::MySql(a) => a.dialect(),
            FloorApplierImpl::Postgres(a) => a.dialect(),
            FloorApplierImpl::Sqlite(a) => a.dialect(),
            FloorApplierImpl::Noop(a) => a.dialect(),
        }
    }

    async fn apply(&self, executor: &dyn SqlExecutor, next_id: i64) -> Result<FloorOutcome> {
        match self {
            FloorApplierImpl::MySql(a) => a.apply(executor, next_id).await,
            FloorApplierImpl::Postgres(a) => a.apply(executor, next_id).await,
            FloorApplierImpl::Sqlite(a) => a.apply(executor, next_id).await,
            FloorApplierImpl::Noop(a) => a.apply(executor, next_id).await,
        }
    }
}
