//! Core abstractions shared by drivers and floor appliers.
//!
//! - [`identifier`]: validation and per-dialect quoting of table/column names
//! - [`traits`]: the SQL execution seam and the max-id primitive
//!
//! Floor logic only ever talks to the database through [`SqlExecutor`], so it
//! can be tested against a recording executor and run against any driver in
//! `drivers/`.

pub mod identifier;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use identifier::{quote_ansi, quote_for, quote_mysql, validate_identifier};
pub use traits::{max_id_query, DriverResult, MaxIdSource, SqlExecutor, SqlMaxId, SqlParam};
