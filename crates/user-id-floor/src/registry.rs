//! Dialect registry.
//!
//! The [`DialectRegistry`] names the single database dialect active for this
//! process together with the parameters needed to connect to it. It is built
//! once from configuration at startup and passed by reference to whatever
//! needs it; nothing mutates it afterwards.
//!
//! ```rust,ignore
//! let config = Config::load("config.yaml")?;
//! let registry = DialectRegistry::from_config(&config.database)?;
//! assert_eq!(registry.active_dialect(), Dialect::Postgres);
//! ```

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::config::{redact_dsn, DatabaseConfig, SslMode};
use crate::error::{FloorError, Result};

/// The closed set of relational backends the process can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[serde(alias = "mariadb")]
    MySql,
    #[serde(alias = "postgresql", alias = "pg")]
    Postgres,
    #[serde(alias = "sqlite3")]
    Sqlite,
    /// Only ever used for the log database; identifier floors do not apply.
    ClickHouse,
}

impl Dialect {
    /// Canonical lowercase name, as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::ClickHouse => "clickhouse",
        }
    }

    /// Infer the dialect from a DSN.
    ///
    /// An empty DSN or the literal `local` selects SQLite, matching the
    /// convention of running against a local database file when no server
    /// is configured. Returns `None` for unrecognised schemes.
    pub fn from_dsn(dsn: &str) -> Option<Self> {
        let dsn = dsn.trim();
        let lower = dsn.to_lowercase();
        if dsn.is_empty() || lower == "local" {
            return Some(Dialect::Sqlite);
        }
        if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Dialect::Postgres)
        } else if lower.starts_with("mysql://") || lower.starts_with("mariadb://") {
            Some(Dialect::MySql)
        } else if lower.starts_with("sqlite:") {
            Some(Dialect::Sqlite)
        } else if lower.starts_with("clickhouse://") {
            Some(Dialect::ClickHouse)
        } else {
            None
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = FloorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" | "local" => Ok(Dialect::Sqlite),
            "clickhouse" => Ok(Dialect::ClickHouse),
            other => Err(FloorError::Config(format!(
                "Unknown database type: '{}'. Supported types: mysql, postgres, sqlite, clickhouse",
                other
            ))),
        }
    }
}

/// Connection parameters for the active dialect.
///
/// `target` is a server URL for MySQL, PostgreSQL and ClickHouse, and a file
/// path for SQLite.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    pub target: String,
    pub max_connections: u32,
    pub ssl_mode: SslMode,
    pub busy_timeout: Duration,
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("target", &redact_dsn(&self.target))
            .field("max_connections", &self.max_connections)
            .field("ssl_mode", &self.ssl_mode)
            .field("busy_timeout", &self.busy_timeout)
            .finish()
    }
}

/// Read-only record of which dialect this process talks to.
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    dialect: Dialect,
    connection: ConnectionParams,
    log_dialect: Dialect,
}

impl DialectRegistry {
    /// Create a registry for an explicit dialect. The log database shares it.
    pub fn new(dialect: Dialect, connection: ConnectionParams) -> Self {
        Self {
            dialect,
            connection,
            log_dialect: dialect,
        }
    }

    /// Resolve the active dialect and its connection parameters.
    ///
    /// An explicit `type` wins, but it must agree with the DSN scheme when the
    /// DSN has one.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self> {
        let dsn = config.dsn.trim();
        let inferred = Dialect::from_dsn(dsn);

        let dialect = match (config.r#type, inferred) {
            (Some(explicit), Some(inferred)) if !dsn.is_empty() && explicit != inferred => {
                return Err(FloorError::Config(format!(
                    "database.type is '{}' but database.dsn points at {}",
                    explicit, inferred
                )));
            }
            (Some(explicit), _) => explicit,
            (None, Some(inferred)) => inferred,
            (None, None) => {
                return Err(FloorError::Config(format!(
                    "Cannot infer database type from dsn '{}'. Set database.type explicitly",
                    redact_dsn(dsn)
                )));
            }
        };

        let target = match dialect {
            Dialect::Sqlite => sqlite_path(dsn).unwrap_or_else(|| config.sqlite_path.clone()),
            _ if dsn.is_empty() => {
                return Err(FloorError::Config(format!(
                    "database.dsn is required for {}",
                    dialect
                )));
            }
            _ => dsn.to_string(),
        };

        let log_dsn = config.log_dsn.trim();
        let log_dialect = if log_dsn.is_empty() {
            dialect
        } else {
            Dialect::from_dsn(log_dsn).ok_or_else(|| {
                FloorError::Config(format!(
                    "Cannot infer log database type from log_dsn '{}'",
                    redact_dsn(log_dsn)
                ))
            })?
        };

        let connection = ConnectionParams {
            target,
            max_connections: config.max_connections,
            ssl_mode: config.ssl_mode,
            busy_timeout: Duration::from_millis(config.sqlite_busy_timeout_ms),
        };

        Ok(Self {
            dialect,
            connection,
            log_dialect,
        })
    }

    /// The dialect every user-table operation runs against.
    pub fn active_dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn connection(&self) -> &ConnectionParams {
        &self.connection
    }

    /// Dialect of the log database. Equals the active dialect unless a
    /// separate log DSN was configured.
    pub fn log_dialect(&self) -> Dialect {
        self.log_dialect
    }
}

/// File path named by a SQLite DSN: `sqlite:` URLs have the scheme stripped,
/// anything else without a scheme is taken as a path. `local`, empty DSNs and
/// a bare `sqlite:` name none.
fn sqlite_path(dsn: &str) -> Option<String> {
    if dsn.is_empty() || dsn.eq_ignore_ascii_case("local") {
        return None;
    }
    let path = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}
