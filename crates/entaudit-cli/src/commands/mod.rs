//! CLI commands

mod context;
mod count;
mod entities;
mod list;
mod show;

pub use context::{context, ContextArgs};
pub use count::{count, CountArgs};
pub use entities::entities;
pub use list::{list, ListArgs};
pub use show::{show, ShowArgs};

use crate::cli::GlobalArgs;
use anyhow::{bail, Context, Result};
use entaudit::{AuditConfig, AuditConnection, AuditReader, DatabaseConfig, EntityRegistry};
use std::sync::Arc;
use tracing::debug;

/// Build a reader from the global options and `ENTAUDIT_*` environment.
pub async fn open_reader(global: &GlobalArgs) -> Result<AuditReader> {
    let Some(url) = global.database_url.clone() else {
        bail!("no database URL given (use --database-url or ENTAUDIT_DATABASE_URL)");
    };

    let config = AuditConfig::from_env().context("invalid ENTAUDIT_* configuration")?;
    let registry = EntityRegistry::from_toml_file(&global.mapping)
        .with_context(|| format!("failed to load entity mapping {}", global.mapping.display()))?;
    debug!(entities = registry.len(), mapping = %global.mapping.display(), "loaded entity mapping");

    let database = DatabaseConfig::from_env_with_url(Some(url))
        .context("invalid ENTAUDIT_DATABASE_* configuration")?;
    let connection = if database.is_postgres() {
        open_postgres(&database).await?
    } else {
        open_sqlite(&database).await?
    };

    Ok(AuditReader::new(Arc::new(config), Arc::new(registry), connection))
}

#[cfg(feature = "sqlite")]
async fn open_sqlite(database: &DatabaseConfig) -> Result<Arc<dyn AuditConnection>> {
    let pool = entaudit::backend::sqlite::connect(database)
        .await
        .context("failed to open SQLite database")?;
    Ok(Arc::new(pool))
}

#[cfg(not(feature = "sqlite"))]
async fn open_sqlite(_database: &DatabaseConfig) -> Result<Arc<dyn AuditConnection>> {
    bail!("SQLite support is not enabled (rebuild with --features sqlite)")
}

#[cfg(feature = "postgres")]
async fn open_postgres(database: &DatabaseConfig) -> Result<Arc<dyn AuditConnection>> {
    let pool = entaudit::backend::postgres::connect(database)
        .await
        .context("failed to connect to PostgreSQL")?;
    Ok(Arc::new(pool))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_database: &DatabaseConfig) -> Result<Arc<dyn AuditConnection>> {
    bail!("PostgreSQL support is not enabled (rebuild with --features postgres)")
}
