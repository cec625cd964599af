//! Configuration validation.

use super::Config;
use crate::core::identifier::validate_identifier;
use crate::error::{FloorError, Result};
use crate::registry::DialectRegistry;

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_identifier(&config.identity.table)
        .map_err(|e| FloorError::Config(format!("identity.table: {}", e)))?;
    validate_identifier(&config.identity.column)
        .map_err(|e| FloorError::Config(format!("identity.column: {}", e)))?;

    if config.database.max_connections == 0 {
        return Err(FloorError::Config(
            "database.max_connections must be at least 1".into(),
        ));
    }

    // The dialect must be resolvable before anything connects.
    DialectRegistry::from_config(&config.database)?;

    Ok(())
}
