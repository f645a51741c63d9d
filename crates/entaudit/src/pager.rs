//! Page navigation over an audit query

use crate::backend::AuditConnection;
use crate::entry::AuditEntry;
use crate::error::{AuditError, Result};
use crate::query::AuditQuery;
use crate::reader::{count, fetch};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Page metadata, serializable for API and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    /// Current page (1-based)
    pub page: u32,
    /// Rows per page
    pub page_size: u32,
    /// Matching rows across all pages
    pub total_count: u64,
    /// Number of pages, at least 1
    pub total_pages: u32,
    /// Whether a next page exists
    pub has_next_page: bool,
    /// Whether a previous page exists
    pub has_previous_page: bool,
}

/// Number of pages needed for `total` rows, never less than one.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 1;
    }
    let pages = total.div_ceil(u64::from(page_size)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Paginated view over one audit query.
///
/// The total is counted once when the pager is created; each call to
/// [`current_page_results`](Self::current_page_results) fetches one slice.
pub struct AuditPager {
    connection: Arc<dyn AuditConnection>,
    query: AuditQuery,
    page: u32,
    page_size: u32,
    total_count: u64,
}

impl fmt::Debug for AuditPager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditPager")
            .field("table", &self.query.table().to_string())
            .field("page", &self.page)
            .field("page_size", &self.page_size)
            .field("total_count", &self.total_count)
            .finish()
    }
}

impl AuditPager {
    pub(crate) async fn new(
        connection: Arc<dyn AuditConnection>,
        query: AuditQuery,
        page: u32,
        page_size: u32,
    ) -> Result<Self> {
        query.clone().page(Some(page)).page_size(Some(page_size)).validate()?;
        let query = query.page(None).page_size(None);
        let total_count = count(connection.as_ref(), &query).await?;
        let mut pager = Self {
            connection,
            query,
            page: 1,
            page_size,
            total_count,
        };
        pager.set_current_page(page)?;
        Ok(pager)
    }

    /// Matching rows across all pages.
    pub fn nb_results(&self) -> u64 {
        self.total_count
    }

    /// Number of pages, at least 1.
    pub fn nb_pages(&self) -> u32 {
        page_count(self.total_count, self.page_size)
    }

    /// Current page (1-based).
    pub fn current_page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    pub fn max_per_page(&self) -> u32 {
        self.page_size
    }

    /// Whether a page precedes the current one.
    pub fn has_previous_page(&self) -> bool {
        self.page > 1
    }

    /// Whether a page follows the current one.
    pub fn has_next_page(&self) -> bool {
        self.page < self.nb_pages()
    }

    /// Previous page number, if any.
    pub fn previous_page(&self) -> Option<u32> {
        self.has_previous_page().then(|| self.page - 1)
    }

    /// Next page number, if any.
    pub fn next_page(&self) -> Option<u32> {
        self.has_next_page().then(|| self.page + 1)
    }

    /// Move to `page`. Fails outside `1..=nb_pages()`.
    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        if page == 0 {
            return Err(AuditError::InvalidArgument(
                "page must be greater than or equal to 1".to_string(),
            ));
        }
        let pages = self.nb_pages();
        if page > pages {
            return Err(AuditError::PageOutOfRange { page, pages });
        }
        self.page = page;
        Ok(())
    }

    /// Snapshot of the page metadata.
    pub fn info(&self) -> PageInfo {
        PageInfo {
            page: self.page,
            page_size: self.page_size,
            total_count: self.total_count,
            total_pages: self.nb_pages(),
            has_next_page: self.has_next_page(),
            has_previous_page: self.has_previous_page(),
        }
    }

    /// Entries on the current page.
    pub async fn current_page_results(&self) -> Result<Vec<AuditEntry>> {
        if self.total_count == 0 {
            return Ok(Vec::new());
        }
        let query = self
            .query
            .clone()
            .page(Some(self.page))
            .page_size(Some(self.page_size));
        fetch(self.connection.as_ref(), &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 50), 1);
        assert_eq!(page_count(5, 2), 3);
        assert_eq!(page_count(4, 2), 2);
        assert_eq!(page_count(1, 1), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_pages_cover_all_rows(total in 0u64..100_000, size in 1u32..500) {
            let pages = u64::from(page_count(total, size));
            prop_assert!(pages >= 1);
            prop_assert!(pages * u64::from(size) >= total);
            if total > 0 {
                prop_assert!((pages - 1) * u64::from(size) < total);
            }
        }
    }
}
