//! In-memory executor that records every call, for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::traits::{DriverResult, MaxIdSource, SqlExecutor, SqlParam};
use crate::registry::Dialect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Execute,
    Query,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub sql: String,
    pub params: Vec<SqlParam>,
}

/// Replies to queries from scripted queues. `execute` reports one affected
/// row unless a reply was pushed; queries with no scripted reply fail.
pub struct RecordingExecutor {
    dialect: Dialect,
    calls: Mutex<Vec<Call>>,
    executes: Mutex<VecDeque<DriverResult<u64>>>,
    ints: Mutex<VecDeque<DriverResult<i64>>>,
    strings: Mutex<VecDeque<DriverResult<Option<String>>>>,
}

impl RecordingExecutor {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            calls: Mutex::new(Vec::new()),
            executes: Mutex::new(VecDeque::new()),
            ints: Mutex::new(VecDeque::new()),
            strings: Mutex::new(VecDeque::new()),
        }
    }

    pub fn push_execute(&self, reply: DriverResult<u64>) {
        self.executes.lock().unwrap().push_back(reply);
    }

    pub fn push_i64(&self, reply: DriverResult<i64>) {
        self.ints.lock().unwrap().push_back(reply);
    }

    pub fn push_string(&self, reply: DriverResult<Option<String>>) {
        self.strings.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == CallKind::Execute)
            .collect()
    }

    fn record(&self, kind: CallKind, sql: &str, params: &[SqlParam]) {
        self.calls.lock().unwrap().push(Call {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }
}

#[async_trait]
impl SqlExecutor for RecordingExecutor {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> DriverResult<u64> {
        self.record(CallKind::Execute, sql, params);
        self.executes.lock().unwrap().pop_front().unwrap_or(Ok(1))
    }

    async fn query_i64(&self, sql: &str, params: &[SqlParam]) -> DriverResult<i64> {
        self.record(CallKind::Query, sql, params);
        self.ints
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(format!("unscripted query: {}", sql).into()))
    }

    async fn query_opt_string(
        &self,
        sql: &str,
        params: &[SqlParam],
    ) -> DriverResult<Option<String>> {
        self.record(CallKind::Query, sql, params);
        self.strings
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(format!("unscripted query: {}", sql).into()))
    }
}

/// Max-id source returning a fixed value, or failing when `None`.
pub struct FixedMaxId(pub Option<i64>);

#[async_trait]
impl MaxIdSource for FixedMaxId {
    async fn max_id(&self) -> DriverResult<i64> {
        self.0.ok_or_else(|| "max id unavailable".into())
    }
}
