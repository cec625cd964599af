//! Helpers shared by the drivers.
//!
//! - [`tls`]: rustls connector for PostgreSQL

#[cfg(feature = "postgres")]
pub mod tls;

use std::time::Duration;

/// How long a driver waits for a pooled connection.
pub const POOL_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);
