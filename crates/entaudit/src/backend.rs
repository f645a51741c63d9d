//! Statement execution against concrete databases

use crate::entry::{AuditEntry, AuditType};
use crate::error::{AuditError, Result};
use crate::query::AuditQuery;
use async_trait::async_trait;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub mod postgres;

/// Columns mapped onto named [`AuditEntry`] fields. Everything else lands in the payload.
pub const CORE_COLUMNS: [&str; 5] = ["id", "type", "object_id", "context", "created_at"];

/// Executes audit queries and maps rows onto [`AuditEntry`] values.
#[async_trait]
pub trait AuditConnection: Send + Sync {
    /// Run the query's select and map every row, preserving row order.
    async fn fetch_entries(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>>;

    /// Run the query's count. `None` when it produced no row or a NULL.
    async fn fetch_count(&self, query: &AuditQuery) -> Result<Option<i64>>;
}

pub(crate) fn is_core_column(name: &str) -> bool {
    CORE_COLUMNS.iter().any(|c| c.eq_ignore_ascii_case(name))
}

pub(crate) fn decode_error(column: &str, err: impl std::fmt::Display) -> AuditError {
    AuditError::Decode {
        column: column.to_string(),
        message: err.to_string(),
    }
}

pub(crate) fn parse_kind(value: &str) -> Result<AuditType> {
    value.parse().map_err(|e| decode_error("type", e))
}

pub(crate) fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_columns_case_insensitive() {
        assert!(is_core_column("id"));
        assert!(is_core_column("CREATED_AT"));
        assert!(!is_core_column("diff"));
    }

    #[test]
    fn test_parse_kind_reports_column() {
        assert_eq!(parse_kind("INSERT").unwrap(), AuditType::Insert);
        let err = parse_kind("merge").unwrap_err();
        assert!(matches!(err, AuditError::Decode { ref column, .. } if column == "type"));
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x10]), "00ab10");
        assert_eq!(hex(&[]), "");
    }
}
