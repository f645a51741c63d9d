//! # entaudit
//!
//! Read-side API over per-entity audit tables.
//!
//! Every audited entity type has its own audit table named
//! `schema.` + prefix + entity table + suffix. Each row records one change
//! (insert, update, associate, dissociate, remove) of one entity instance,
//! optionally tagged with a correlation context. [`AuditReader`] answers
//! history questions against those tables: newest first, paginated, filtered
//! by operation type, instance or context.
//!
//! ## Features
//!
//! - `sqlite` (default) - [`AuditConnection`] for `sqlx::SqlitePool`
//! - `postgres` - [`AuditConnection`] for `sqlx::PgPool`
//!
//! ## Example
//!
//! ```rust,ignore
//! use entaudit::{AuditConfig, AuditReader, DatabaseConfig, EntityRegistry};
//! use std::sync::Arc;
//!
//! let pool = entaudit::backend::sqlite::connect(&DatabaseConfig::new("sqlite://app.db")).await?;
//! let registry = EntityRegistry::new().register("Order", "orders");
//! let reader = AuditReader::new(Arc::new(AuditConfig::default()), Arc::new(registry), Arc::new(pool));
//!
//! let pager = reader.audits_pager("Order", None, Some(1), Some(20)).await?;
//! for entry in pager.current_page_results().await? {
//!     println!("{} {} {}", entry.id, entry.kind, entry.object_id);
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backend;
pub mod config;
pub mod entry;
pub mod error;
pub mod metadata;
pub mod pager;
pub mod query;
pub mod reader;
pub mod table;

pub use backend::AuditConnection;
pub use config::{AuditConfig, AuditConfiguration, ConfigError, DatabaseConfig};
pub use entry::{AuditEntry, AuditType, EntityRef, ObjectId};
pub use error::{AuditError, Result};
pub use metadata::{AuditedEntity, EntityMetadata, EntityRegistry, MetadataProvider};
pub use pager::{AuditPager, PageInfo};
pub use query::{AuditQuery, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use reader::AuditReader;
pub use table::AuditTableName;
