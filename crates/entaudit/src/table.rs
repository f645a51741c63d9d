//! Audit table naming

use crate::config::AuditConfiguration;
use crate::entry::EntityRef;
use crate::error::{AuditError, Result};
use crate::metadata::MetadataProvider;
use std::fmt;

/// Physical audit table of an entity type: `schema.` + prefix + table + suffix.
///
/// Always derived from the current configuration and metadata, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTableName {
    schema: Option<String>,
    table: String,
}

impl AuditTableName {
    /// Build from an optional schema and the already prefixed/suffixed table.
    pub fn new(schema: Option<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.filter(|s| !s.is_empty()),
            table: table.into(),
        }
    }

    /// Schema segment, if any.
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Table segment.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Identifier quoted for use in SQL, e.g. `"shop"."orders_audit"`.
    pub fn quoted(&self) -> Result<String> {
        let table = quote_identifier(&self.table)?;
        match &self.schema {
            Some(schema) => Ok(format!("{}.{}", quote_identifier(schema)?, table)),
            None => Ok(table),
        }
    }
}

impl fmt::Display for AuditTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.table),
            None => f.write_str(&self.table),
        }
    }
}

fn quote_identifier(ident: &str) -> Result<String> {
    if ident.is_empty() || ident.contains('"') || ident.contains('\0') {
        return Err(AuditError::InvalidArgument(format!(
            "invalid SQL identifier: {:?}",
            ident
        )));
    }
    Ok(format!("\"{}\"", ident))
}

/// Compute the audit table of `entity`.
pub fn resolve_audit_table(
    config: &dyn AuditConfiguration,
    metadata: &dyn MetadataProvider,
    entity: &EntityRef,
) -> Result<AuditTableName> {
    let (table, schema) = metadata.resolve(entity)?;
    Ok(AuditTableName::new(
        schema,
        format!("{}{}{}", config.table_prefix(), table, config.table_suffix()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuditConfig;
    use crate::metadata::EntityRegistry;

    fn registry() -> EntityRegistry {
        EntityRegistry::new()
            .register("Order", "orders")
            .register_in_schema("Invoice", "billing", "invoices")
    }

    #[test]
    fn test_default_suffix() {
        let name =
            resolve_audit_table(&AuditConfig::default(), &registry(), &"Order".into()).unwrap();
        assert_eq!(name.to_string(), "orders_audit");
        assert_eq!(name.quoted().unwrap(), "\"orders_audit\"");
    }

    #[test]
    fn test_schema_prefix_and_suffix() {
        let config = AuditConfig::new().with_prefix("log_").with_suffix("_v1");
        let name = resolve_audit_table(&config, &registry(), &"Invoice".into()).unwrap();
        assert_eq!(name.to_string(), "billing.log_invoices_v1");
        assert_eq!(name.schema(), Some("billing"));
        assert_eq!(name.table(), "log_invoices_v1");
        assert_eq!(name.quoted().unwrap(), "\"billing\".\"log_invoices_v1\"");
    }

    #[test]
    fn test_deterministic() {
        let config = AuditConfig::default();
        let a = resolve_audit_table(&config, &registry(), &"Invoice".into()).unwrap();
        let b = resolve_audit_table(&config, &registry(), &"Invoice".into()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_entity_propagates() {
        let err =
            resolve_audit_table(&AuditConfig::default(), &registry(), &"Ghost".into()).unwrap_err();
        assert!(matches!(err, AuditError::UnknownEntity(_)));
    }

    #[test]
    fn test_quoting_rejects_embedded_quotes() {
        let name = AuditTableName::new(None, "orders\"; DROP TABLE x; --");
        assert!(matches!(name.quoted(), Err(AuditError::InvalidArgument(_))));
        assert!(AuditTableName::new(None, "").quoted().is_err());
    }

    #[test]
    fn test_empty_schema_is_dropped() {
        let name = AuditTableName::new(Some(String::new()), "orders_audit");
        assert_eq!(name.schema(), None);
        assert_eq!(name.to_string(), "orders_audit");
    }
}
