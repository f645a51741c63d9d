//! SQL construction for audit table reads
//!
//! Every statement has the same fixed shape:
//!
//! ```sql
//! SELECT at.* FROM "<audit table>" AS at WHERE 1 = 1
//!   [AND at.id = ?] [AND CAST(at.object_id AS TEXT) = ?]
//!   [AND at.type = ?] [AND at.context = ?]
//!   ORDER BY at.created_at DESC, at.id DESC
//!   [LIMIT ? OFFSET ?]
//! ```
//!
//! The count variant swaps the select list for `COUNT(at.id)` and drops
//! ordering and paging. Statements are assembled with [`sqlx::QueryBuilder`],
//! so placeholders follow the target database (`?` or `$n`) and every value
//! is bound.

use crate::entry::{AuditType, ObjectId};
use crate::error::{AuditError, Result};
use crate::table::AuditTableName;
use sqlx::{Database, Encode, QueryBuilder, Type};

/// Page used when a pager is requested without one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when a pager is requested without one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Read parameters for one audit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    table: AuditTableName,
    entry_id: Option<i64>,
    object_id: Option<ObjectId>,
    operation: Option<AuditType>,
    context: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

impl AuditQuery {
    /// Unfiltered, unpaginated query over `table`.
    pub fn new(table: AuditTableName) -> Self {
        Self {
            table,
            entry_id: None,
            object_id: None,
            operation: None,
            context: None,
            page: None,
            page_size: None,
        }
    }

    /// Restrict to one row by primary key.
    pub fn entry_id(mut self, id: i64) -> Self {
        self.entry_id = Some(id);
        self
    }

    /// Restrict to one entity instance.
    pub fn object_id(mut self, object_id: Option<ObjectId>) -> Self {
        self.object_id = object_id;
        self
    }

    /// Restrict to one operation type.
    pub fn operation(mut self, operation: Option<AuditType>) -> Self {
        self.operation = operation;
        self
    }

    /// Restrict to one context tag.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// 1-based page. Only applied together with a page size.
    pub fn page(mut self, page: Option<u32>) -> Self {
        self.page = page;
        self
    }

    /// Rows per page. `None` returns every matching row.
    pub fn page_size(mut self, page_size: Option<u32>) -> Self {
        self.page_size = page_size;
        self
    }

    /// Audit table being read.
    pub fn table(&self) -> &AuditTableName {
        &self.table
    }

    /// Reject zero pages and page sizes.
    pub fn validate(&self) -> Result<()> {
        if self.page == Some(0) {
            return Err(AuditError::InvalidArgument(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        if self.page_size == Some(0) {
            return Err(AuditError::InvalidArgument(
                "page size must be greater than or equal to 1".to_string(),
            ));
        }
        Ok(())
    }

    /// `LIMIT`/`OFFSET` values, if paginated.
    pub fn limit_offset(&self) -> Option<(i64, i64)> {
        self.page_size.map(|size| {
            let page = self.page.unwrap_or(DEFAULT_PAGE).max(1);
            let size = i64::from(size);
            (size, i64::from(page - 1) * size)
        })
    }

    fn filtered<'args, DB>(&self, select: &str) -> Result<QueryBuilder<'args, DB>>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
    {
        self.validate()?;
        let mut qb = QueryBuilder::new(format!(
            "{} FROM {} AS at WHERE 1 = 1",
            select,
            self.table.quoted()?
        ));

        if let Some(id) = self.entry_id {
            qb.push(" AND at.id = ");
            qb.push_bind(id);
        }
        // Compared as text so integer and varchar object_id columns both match
        if let Some(object_id) = &self.object_id {
            qb.push(" AND CAST(at.object_id AS TEXT) = ");
            qb.push_bind(object_id.to_string());
        }
        if let Some(operation) = self.operation {
            qb.push(" AND at.type = ");
            qb.push_bind(operation.as_str().to_string());
        }
        if let Some(context) = &self.context {
            qb.push(" AND at.context = ");
            qb.push_bind(context.clone());
        }
        Ok(qb)
    }

    /// Ordered, optionally paginated row select.
    pub fn select_builder<'args, DB>(&self) -> Result<QueryBuilder<'args, DB>>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
    {
        let mut qb = self.filtered("SELECT at.*")?;
        qb.push(" ORDER BY at.created_at DESC, at.id DESC");
        if let Some((limit, offset)) = self.limit_offset() {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
            qb.push(" OFFSET ");
            qb.push_bind(offset);
        }
        Ok(qb)
    }

    /// Row count with the same predicates, unordered and unpaginated.
    pub fn count_builder<'args, DB>(&self) -> Result<QueryBuilder<'args, DB>>
    where
        DB: Database,
        <DB as Database>::Arguments<'args>: Default,
        i64: Encode<'args, DB> + Type<DB>,
        String: Encode<'args, DB> + Type<DB>,
    {
        self.filtered("SELECT COUNT(at.id)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn orders() -> AuditQuery {
        AuditQuery::new(AuditTableName::new(None, "orders_audit"))
    }

    #[cfg(feature = "sqlite")]
    fn sqlite_select(query: &AuditQuery) -> Result<String> {
        query
            .select_builder::<sqlx::Sqlite>()
            .map(|qb| qb.sql().to_string())
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_plain_select() {
        assert_eq!(
            sqlite_select(&orders()).unwrap(),
            "SELECT at.* FROM \"orders_audit\" AS at WHERE 1 = 1 \
             ORDER BY at.created_at DESC, at.id DESC"
        );
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_all_predicates() {
        let query = AuditQuery::new(AuditTableName::new(Some("shop".into()), "orders_audit"))
            .object_id(Some(ObjectId::Int(7)))
            .operation(Some(AuditType::Update))
            .context("req-1")
            .page(Some(3))
            .page_size(Some(10));

        assert_eq!(
            sqlite_select(&query).unwrap(),
            "SELECT at.* FROM \"shop\".\"orders_audit\" AS at WHERE 1 = 1 \
             AND CAST(at.object_id AS TEXT) = ? AND at.type = ? AND at.context = ? \
             ORDER BY at.created_at DESC, at.id DESC LIMIT ? OFFSET ?"
        );
        assert_eq!(query.limit_offset(), Some((10, 20)));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_postgres_numbers_placeholders_and_compares_object_id_as_text() {
        let query = orders()
            .object_id(Some(ObjectId::parse("42")))
            .operation(Some(AuditType::Insert))
            .page_size(Some(5));
        let qb = query.select_builder::<sqlx::Postgres>().unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT at.* FROM \"orders_audit\" AS at WHERE 1 = 1 \
             AND CAST(at.object_id AS TEXT) = $1 AND at.type = $2 \
             ORDER BY at.created_at DESC, at.id DESC LIMIT $3 OFFSET $4"
        );

        let text = orders()
            .object_id(Some(ObjectId::Text("42".into())))
            .operation(Some(AuditType::Insert))
            .page_size(Some(5));
        assert_eq!(
            text.select_builder::<sqlx::Postgres>().unwrap().sql(),
            qb.sql()
        );
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_entry_id_lookup() {
        let sql = sqlite_select(&orders().entry_id(4)).unwrap();
        assert!(sql.contains(" AND at.id = ?"));
        assert!(!sql.contains("object_id"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_page_without_size_is_ignored() {
        let query = orders().page(Some(4));
        assert!(!sqlite_select(&query).unwrap().contains("LIMIT"));
        assert_eq!(query.limit_offset(), None);
    }

    #[test]
    fn test_size_without_page_starts_at_first_page() {
        let query = orders().page_size(Some(25));
        assert_eq!(query.limit_offset(), Some((25, 0)));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_count_has_no_order_or_paging() {
        let qb = orders()
            .object_id(Some(ObjectId::Text("abc".into())))
            .page(Some(2))
            .page_size(Some(5))
            .count_builder::<sqlx::Sqlite>()
            .unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(at.id) FROM \"orders_audit\" AS at WHERE 1 = 1 \
             AND CAST(at.object_id AS TEXT) = ?"
        );
    }

    #[test]
    fn test_zero_page_rejected() {
        let err = orders().page(Some(0)).page_size(Some(5)).validate();
        assert!(matches!(err, Err(AuditError::InvalidArgument(_))));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let err = orders().page_size(Some(0)).validate();
        assert!(matches!(err, Err(AuditError::InvalidArgument(_))));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_invalid_table_rejected_before_sql() {
        let query = AuditQuery::new(AuditTableName::new(None, "bad\"name"));
        assert!(matches!(
            sqlite_select(&query),
            Err(AuditError::InvalidArgument(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_offset_is_page_minus_one_times_size(page in 1u32..10_000, size in 1u32..10_000) {
            let query = orders().page(Some(page)).page_size(Some(size));
            prop_assert_eq!(
                query.limit_offset(),
                Some((i64::from(size), i64::from(page - 1) * i64::from(size)))
            );
        }

        #[test]
        fn prop_zero_always_rejected(page in 0u32..3, size in 0u32..3) {
            let result = orders().page(Some(page)).page_size(Some(size)).validate();
            prop_assert_eq!(result.is_err(), page == 0 || size == 0);
        }
    }

    #[cfg(feature = "sqlite")]
    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_one_placeholder_per_bound_value(
            object_id in proptest::option::of(any::<i64>()),
            context in proptest::option::of("[a-z0-9-]{1,12}"),
            paged in any::<bool>(),
        ) {
            let mut expected = 0;
            let mut query = orders().object_id(object_id.map(ObjectId::Int));
            if object_id.is_some() {
                expected += 1;
            }
            if let Some(context) = context {
                query = query.context(context);
                expected += 1;
            }
            if paged {
                query = query.page(Some(2)).page_size(Some(3));
                expected += 2;
            }
            let sql = sqlite_select(&query).unwrap();
            prop_assert_eq!(sql.matches('?').count(), expected);
        }
    }
}
