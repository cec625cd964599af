//! No-op applier for dialects without a user-id counter.
//!
//! ClickHouse is only ever used as a log store; there is no auto-generated
//! user id to reconcile there.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::warn;

use super::{FloorApplier, FloorOutcome, SkipReason};
use crate::core::SqlExecutor;
use crate::error::Result;
use crate::registry::Dialect;

/// Reports every call as skipped. Logs a warning on first use.
#[derive(Debug)]
pub struct NoopFloor {
    dialect: Dialect,
    warned: AtomicBool,
}

impl NoopFloor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            warned: AtomicBool::new(false),
        }
    }

    fn warn_once(&self) {
        if !self.warned.swap(true, Ordering::SeqCst) {
            warn!(
                "Identifier floor is not supported for {}; leaving id generation untouched",
                self.dialect
            );
        }
    }
}

#[async_trait]
impl FloorApplier for NoopFloor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn apply(&self, _executor: &dyn SqlExecutor, _next_id: i64) -> Result<FloorOutcome> {
        self.warn_once();
        Ok(FloorOutcome::Skipped(SkipReason::UnsupportedDialect(
            self.dialect,
        )))
    }
}
