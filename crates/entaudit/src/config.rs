//! Configuration for audit table naming, entity selection and database access.
//!
//! Both configuration structs deserialize from environment variables through
//! `envy`, after an optional `.env` file has been loaded with `dotenvy`.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ENTAUDIT_TABLE_PREFIX` | [`AuditConfig::table_prefix`] |
//! | `ENTAUDIT_TABLE_SUFFIX` | [`AuditConfig::table_suffix`] |
//! | `ENTAUDIT_AUDITED_ENTITIES` | [`AuditConfig::audited_entities`] (comma separated) |
//! | `ENTAUDIT_UNAUDITED_ENTITIES` | [`AuditConfig::unaudited_entities`] (comma separated) |
//! | `ENTAUDIT_DATABASE_URL` | [`DatabaseConfig::url`] |
//! | `ENTAUDIT_DATABASE_MAX_CONNECTIONS` | [`DatabaseConfig::max_connections`] |
//! | `ENTAUDIT_DATABASE_ACQUIRE_TIMEOUT_SECS` | [`DatabaseConfig::acquire_timeout_secs`] |
//!
//! # Example
//!
//! ```ignore
//! use entaudit::config::{load_dotenv, AuditConfig, DatabaseConfig};
//!
//! load_dotenv();
//! let audit = AuditConfig::from_env()?;
//! let database = DatabaseConfig::from_env()?;
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Environment prefix for [`AuditConfig`].
pub const AUDIT_ENV_PREFIX: &str = "ENTAUDIT_";

/// Environment prefix for [`DatabaseConfig`].
pub const DATABASE_ENV_PREFIX: &str = "ENTAUDIT_DATABASE_";

/// Error type for configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable deserialization failed.
    #[error("Configuration error: {0}")]
    Env(#[from] envy::Error),

    /// A value was present but unusable.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// An entity mapping document could not be read or parsed.
    #[error("Invalid entity mapping: {0}")]
    Mapping(String),
}

/// Decides which entity types are audited and how their audit tables are named.
pub trait AuditConfiguration: Send + Sync {
    /// Whether changes to `entity_type` are recorded.
    fn is_auditable(&self, entity_type: &str) -> bool;

    /// Prefix prepended to the entity table name.
    fn table_prefix(&self) -> &str;

    /// Suffix appended to the entity table name.
    fn table_suffix(&self) -> &str;
}

/// Default [`AuditConfiguration`] backed by plain values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Prefix prepended to the entity table name.
    pub table_prefix: String,
    /// Suffix appended to the entity table name.
    pub table_suffix: String,
    /// Entity types that are audited. Empty means every mapped type.
    pub audited_entities: Vec<String>,
    /// Entity types that are never audited, even if listed above.
    pub unaudited_entities: Vec<String>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            table_prefix: String::new(),
            table_suffix: "_audit".to_string(),
            audited_entities: Vec::new(),
            unaudited_entities: Vec::new(),
        }
    }
}

impl AuditConfig {
    /// Create the default configuration (`""` prefix, `"_audit"` suffix, all types audited).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `ENTAUDIT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        envy::prefixed(AUDIT_ENV_PREFIX)
            .from_env::<Self>()
            .map_err(ConfigError::from)
    }

    /// Set the table prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Set the table suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.table_suffix = suffix.into();
        self
    }

    /// Restrict auditing to the given entity types.
    pub fn audited<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.audited_entities = types.into_iter().map(Into::into).collect();
        self
    }

    /// Exclude the given entity types from auditing.
    pub fn unaudited<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unaudited_entities = types.into_iter().map(Into::into).collect();
        self
    }
}

fn listed(list: &[String], entity_type: &str) -> bool {
    list.iter().any(|t| t.trim() == entity_type)
}

impl AuditConfiguration for AuditConfig {
    fn is_auditable(&self, entity_type: &str) -> bool {
        if listed(&self.unaudited_entities, entity_type) {
            return false;
        }
        // envy turns an empty variable into a single empty item
        let restricted = self.audited_entities.iter().any(|t| !t.trim().is_empty());
        !restricted || listed(&self.audited_entities, entity_type)
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn table_suffix(&self) -> &str {
        &self.table_suffix
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

/// Connection pool settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[serde(default)]
    pub url: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds to wait for a free connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Create a configuration for `url` with default pool settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    /// Load from `ENTAUDIT_DATABASE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_url(None)
    }

    /// Load pool settings from the environment, with `url` replacing
    /// `ENTAUDIT_DATABASE_URL` when given.
    pub fn from_env_with_url(url: Option<String>) -> Result<Self, ConfigError> {
        let mut config = envy::prefixed(DATABASE_ENV_PREFIX).from_env::<Self>()?;
        if let Some(url) = url {
            config.url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum number of pooled connections.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.max_connections = n;
        self
    }

    /// Set the acquire timeout.
    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout_secs = timeout.as_secs();
        self
    }

    /// Acquire timeout as a [`Duration`].
    pub fn acquire_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Whether the URL points at PostgreSQL.
    pub fn is_postgres(&self) -> bool {
        self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "Database URL cannot be empty".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load environment variables from a `.env` file, if one exists.
///
/// Existing environment variables take precedence.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
