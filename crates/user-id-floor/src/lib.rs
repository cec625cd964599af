//! # user-id-floor
//!
//! Forces newly generated user ids to start at or above a configured floor,
//! on MySQL, PostgreSQL and SQLite, without ever colliding with rows that
//! already exist.
//!
//! "Next generated id" lives somewhere different on every backend:
//!
//! - **MySQL**: the table's `AUTO_INCREMENT` counter
//! - **PostgreSQL**: the sequence behind the id column, found via
//!   `pg_get_serial_sequence`
//! - **SQLite**: the table's row in `sqlite_sequence`, which may not exist yet
//!
//! The floor is applied once at startup, after schema migration and before
//! live traffic. A floor of 0 or 1 disables it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use user_id_floor::{ensure_identifier_floor, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.yaml")?;
//!     let outcome = ensure_identifier_floor(&config).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod drivers;
pub mod error;
pub mod floor;
pub mod reconciler;
pub mod registry;

// Re-exports for convenient access
pub use config::{Config, DatabaseConfig, IdentityConfig, SslMode};
pub use crate::core::{MaxIdSource, SqlExecutor, SqlMaxId, SqlParam};
pub use error::{FloorError, Result};
pub use floor::{FloorApplier, FloorApplierImpl, FloorOutcome, IdentifierFloor, SkipReason};
pub use reconciler::{ensure_identifier_floor, SequenceReconciler};
pub use registry::{ConnectionParams, Dialect, DialectRegistry};
