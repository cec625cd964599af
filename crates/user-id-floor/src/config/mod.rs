//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::{FloorError, Result};
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from defaults and the process environment only.
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }

    /// Override fields from `SQL_DSN`, `LOG_SQL_DSN`, `SQLITE_PATH`,
    /// `SSL_MODE` and `USER_ID_START`.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::apply_env_overrides`] with an explicit lookup.
    /// Unset and empty variables leave the field alone.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dsn) = get("SQL_DSN") {
            self.database.dsn = dsn;
        }
        if let Some(dsn) = get("LOG_SQL_DSN") {
            self.database.log_dsn = dsn;
        }
        if let Some(path) = get("SQLITE_PATH") {
            self.database.sqlite_path = path;
        }
        if let Some(mode) = get("SSL_MODE") {
            self.database.ssl_mode = SslMode::parse(&mode)?;
        }
        if let Some(start) = get("USER_ID_START") {
            self.identity.start = start.trim().parse().map_err(|_| {
                FloorError::Config(format!("USER_ID_START must be an integer, got '{}'", start))
            })?;
        }
        Ok(())
    }
}
