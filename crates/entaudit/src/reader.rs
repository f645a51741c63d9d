//! Read-side facade over per-entity audit tables

use crate::backend::AuditConnection;
use crate::config::AuditConfiguration;
use crate::entry::{AuditEntry, AuditType, EntityRef, ObjectId};
use crate::error::Result;
use crate::metadata::MetadataProvider;
use crate::pager::AuditPager;
use crate::query::AuditQuery;
use crate::table::{resolve_audit_table, AuditTableName};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Reads audit history for tracked entities.
///
/// Cloning is cheap. The operation-type filter is part of the value:
/// [`filter_by`](Self::filter_by) returns a new reader and never mutates
/// the receiver, so one reader can be shared across tasks.
///
/// # Example
///
/// ```rust,ignore
/// use entaudit::{AuditConfig, AuditReader, EntityRegistry};
/// use std::sync::Arc;
///
/// let registry = EntityRegistry::new().register("Order", "orders");
/// let reader = AuditReader::new(Arc::new(AuditConfig::default()), Arc::new(registry), Arc::new(pool));
///
/// let updates = reader.filter_by("update").audits("Order", None, Some(1), Some(20)).await?;
/// ```
#[derive(Clone)]
pub struct AuditReader {
    config: Arc<dyn AuditConfiguration>,
    metadata: Arc<dyn MetadataProvider>,
    connection: Arc<dyn AuditConnection>,
    filter: Option<AuditType>,
}

impl fmt::Debug for AuditReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditReader")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

impl AuditReader {
    /// Create an unfiltered reader.
    pub fn new(
        config: Arc<dyn AuditConfiguration>,
        metadata: Arc<dyn MetadataProvider>,
        connection: Arc<dyn AuditConnection>,
    ) -> Self {
        Self {
            config,
            metadata,
            connection,
            filter: None,
        }
    }

    /// Reader restricted to one operation type, parsed case-insensitively.
    ///
    /// An unrecognised value yields an unfiltered reader rather than an error.
    pub fn filter_by(&self, operation: &str) -> Self {
        let filter = match operation.parse::<AuditType>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                warn!(value = operation, "ignoring unknown audit type filter");
                None
            }
        };
        self.with_filter(filter)
    }

    /// Reader with the given filter, or none.
    pub fn with_filter(&self, filter: Option<AuditType>) -> Self {
        Self {
            filter,
            ..self.clone()
        }
    }

    /// Current operation-type filter.
    pub fn filter(&self) -> Option<AuditType> {
        self.filter
    }

    /// Audit table of `entity` under the current configuration.
    pub fn audit_table_name(&self, entity: impl Into<EntityRef>) -> Result<AuditTableName> {
        resolve_audit_table(
            self.config.as_ref(),
            self.metadata.as_ref(),
            &entity.into(),
        )
    }

    /// Auditable entity types and their base tables, sorted by type.
    ///
    /// Use [`audit_table_name`](Self::audit_table_name) for the table the
    /// entries live in.
    pub fn entities(&self) -> Result<BTreeMap<String, String>> {
        let mut entities = BTreeMap::new();
        for entity_type in self.auditable_types() {
            let table = self.metadata.table_name(&entity_type)?;
            entities.insert(entity_type, table);
        }
        Ok(entities)
    }

    fn auditable_types(&self) -> Vec<String> {
        self.metadata
            .all_types()
            .into_iter()
            .filter(|t| self.config.is_auditable(t))
            .collect()
    }

    /// Filtered query over `entity`'s audit table.
    pub fn query(&self, entity: impl Into<EntityRef>) -> Result<AuditQuery> {
        Ok(AuditQuery::new(self.audit_table_name(entity)?).operation(self.filter))
    }

    /// Newest-first audit entries of `entity`, optionally for one instance
    /// and one page.
    ///
    /// `page` and `page_size` must be at least 1 when given; `page` only
    /// applies together with `page_size`.
    #[instrument(skip_all, fields(filter = ?self.filter, page = ?page, page_size = ?page_size))]
    pub async fn audits(
        &self,
        entity: impl Into<EntityRef>,
        object_id: Option<ObjectId>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<Vec<AuditEntry>> {
        let query = self
            .query(entity)?
            .object_id(object_id)
            .page(page)
            .page_size(page_size);
        self.fetch(&query).await
    }

    /// Pager over the same query as [`audits`](Self::audits).
    ///
    /// Defaults to page [`DEFAULT_PAGE`](crate::query::DEFAULT_PAGE) of
    /// [`DEFAULT_PAGE_SIZE`](crate::query::DEFAULT_PAGE_SIZE) rows.
    #[instrument(skip(self, entity, object_id))]
    pub async fn audits_pager(
        &self,
        entity: impl Into<EntityRef>,
        object_id: Option<ObjectId>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<AuditPager> {
        let query = self.query(entity)?.object_id(object_id);
        AuditPager::new(
            Arc::clone(&self.connection),
            query,
            page.unwrap_or(crate::query::DEFAULT_PAGE),
            page_size.unwrap_or(crate::query::DEFAULT_PAGE_SIZE),
        )
        .await
    }

    /// Number of entries [`audits`](Self::audits) returns without paging.
    #[instrument(skip(self, entity, object_id))]
    pub async fn audits_count(
        &self,
        entity: impl Into<EntityRef>,
        object_id: Option<ObjectId>,
    ) -> Result<u64> {
        let query = self.query(entity)?.object_id(object_id);
        count(self.connection.as_ref(), &query).await
    }

    /// Entry with primary key `id` (not `object_id`): zero or one element.
    #[instrument(skip(self, entity))]
    pub async fn audit(&self, entity: impl Into<EntityRef>, id: i64) -> Result<Vec<AuditEntry>> {
        let query = self.query(entity)?.entry_id(id);
        self.fetch(&query).await
    }

    /// Every entry of `entity` tagged with `context`, unpaginated.
    #[instrument(skip(self, entity))]
    pub async fn context_audit(
        &self,
        entity: impl Into<EntityRef>,
        context: &str,
    ) -> Result<Vec<AuditEntry>> {
        let query = self.query(entity)?.context(context);
        self.fetch(&query).await
    }

    /// Entries tagged with `context`, grouped by auditable entity type.
    ///
    /// Types without a matching entry are left out.
    #[instrument(skip(self))]
    pub async fn context_audits(&self, context: &str) -> Result<BTreeMap<String, Vec<AuditEntry>>> {
        let mut grouped = BTreeMap::new();
        for entity_type in self.auditable_types() {
            let entries = self.context_audit(entity_type.as_str(), context).await?;
            if !entries.is_empty() {
                grouped.insert(entity_type, entries);
            }
        }
        Ok(grouped)
    }

    async fn fetch(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
        fetch(self.connection.as_ref(), query).await
    }
}

pub(crate) async fn fetch(
    connection: &dyn AuditConnection,
    query: &AuditQuery,
) -> Result<Vec<AuditEntry>> {
    query.validate()?;
    let entries = connection.fetch_entries(query).await?;
    debug!(rows = entries.len(), table = %query.table(), "fetched audit entries");
    Ok(entries)
}

pub(crate) async fn count(connection: &dyn AuditConnection, query: &AuditQuery) -> Result<u64> {
    query.validate()?;
    let total = connection.fetch_count(query).await?;
    debug!(total = ?total, table = %query.table(), "counted audit entries");
    Ok(total.map(|n| n.max(0) as u64).unwrap_or(0))
}
