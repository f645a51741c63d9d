//! Entity metadata lookup
//!
//! The reader only needs three facts about a mapped entity type: its table,
//! its schema and the set of all mapped types. [`MetadataProvider`] exposes
//! exactly those; [`EntityRegistry`] is the in-process implementation, filled
//! from [`AuditedEntity`] types or a TOML mapping document:
//!
//! ```toml
//! [entities.Order]
//! table = "orders"
//! schema = "shop"
//!
//! [entities.Customer]
//! table = "customers"
//! ```

use crate::config::ConfigError;
use crate::entry::EntityRef;
use crate::error::{AuditError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A Rust type whose changes are audited.
pub trait AuditedEntity {
    /// Name the entity type is registered under.
    const ENTITY_TYPE: &'static str;
    /// Base table the entity is stored in.
    const TABLE_NAME: &'static str;
    /// Schema of the base table, if not the default one.
    const SCHEMA_NAME: Option<&'static str> = None;
}

/// Mapping information for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Base table name.
    pub table: String,
    /// Schema name, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// Source of entity mapping metadata.
pub trait MetadataProvider: Send + Sync {
    /// Base table of `entity_type`.
    fn table_name(&self, entity_type: &str) -> Result<String>;

    /// Schema of `entity_type`'s table, `None` for the default schema.
    fn schema_name(&self, entity_type: &str) -> Result<Option<String>>;

    /// Every mapped entity type.
    fn all_types(&self) -> Vec<String>;

    /// Resolve a reference to `(table, schema)`.
    fn resolve(&self, entity: &EntityRef) -> Result<(String, Option<String>)> {
        let type_name = entity.type_name();
        Ok((self.table_name(type_name)?, self.schema_name(type_name)?))
    }
}

#[derive(Debug, Default, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    entities: BTreeMap<String, EntityMetadata>,
}

/// In-memory [`MetadataProvider`].
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<String, EntityMetadata>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `entity_type` stored in `table` of the default schema.
    pub fn register(mut self, entity_type: impl Into<String>, table: impl Into<String>) -> Self {
        self.insert(entity_type, table, None::<String>);
        self
    }

    /// Register `entity_type` stored in `schema.table`.
    pub fn register_in_schema(
        mut self,
        entity_type: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        self.insert(entity_type, table, Some(schema));
        self
    }

    /// Register a Rust entity type.
    pub fn register_entity<T: AuditedEntity>(mut self) -> Self {
        self.insert(T::ENTITY_TYPE, T::TABLE_NAME, T::SCHEMA_NAME);
        self
    }

    /// Add or replace a mapping in place.
    pub fn insert<S: Into<String>>(
        &mut self,
        entity_type: impl Into<String>,
        table: impl Into<String>,
        schema: Option<S>,
    ) {
        self.entities.insert(
            entity_type.into(),
            EntityMetadata {
                table: table.into(),
                schema: schema.map(Into::into),
            },
        );
    }

    /// Parse a TOML mapping document.
    pub fn from_toml_str(document: &str) -> std::result::Result<Self, ConfigError> {
        let parsed: MappingDocument =
            toml::from_str(document).map_err(|e| ConfigError::Mapping(e.to_string()))?;
        Ok(Self {
            entities: parsed.entities,
        })
    }

    /// Read and parse a TOML mapping file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> std::result::Result<Self, ConfigError> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Mapping(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&document)
    }

    /// Number of mapped types.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no type is mapped.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn lookup(&self, entity_type: &str) -> Result<&EntityMetadata> {
        self.entities
            .get(entity_type)
            .ok_or_else(|| AuditError::UnknownEntity(entity_type.to_string()))
    }
}

impl MetadataProvider for EntityRegistry {
    fn table_name(&self, entity_type: &str) -> Result<String> {
        self.lookup(entity_type).map(|m| m.table.clone())
    }

    fn schema_name(&self, entity_type: &str) -> Result<Option<String>> {
        self.lookup(entity_type).map(|m| m.schema.clone())
    }

    fn all_types(&self) -> Vec<String> {
        self.entities.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct Invoice;

    impl AuditedEntity for Invoice {
        const ENTITY_TYPE: &'static str = "Invoice";
        const TABLE_NAME: &'static str = "invoices";
        const SCHEMA_NAME: Option<&'static str> = Some("billing");
    }

    #[test]
    fn test_register_and_resolve() {
        let registry = EntityRegistry::new()
            .register("Order", "orders")
            .register_entity::<Invoice>();

        assert_eq!(
            registry.resolve(&EntityRef::from("Order")).unwrap(),
            ("orders".to_string(), None)
        );
        assert_eq!(
            registry.resolve(&EntityRef::of::<Invoice>()).unwrap(),
            ("invoices".to_string(), Some("billing".to_string()))
        );
        assert_eq!(registry.all_types(), vec!["Invoice", "Order"]);
    }

    #[test]
    fn test_unknown_entity() {
        let registry = EntityRegistry::new();
        let err = registry.table_name("Ghost").unwrap_err();
        assert!(matches!(err, AuditError::UnknownEntity(ref t) if t == "Ghost"));
    }

    #[test]
    fn test_from_toml_str() {
        let registry = EntityRegistry::from_toml_str(
            r#"
            [entities.Order]
            table = "orders"
            schema = "shop"

            [entities.Customer]
            table = "customers"
            "#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.schema_name("Order").unwrap().as_deref(), Some("shop"));
        assert_eq!(registry.schema_name("Customer").unwrap(), None);
    }

    #[test]
    fn test_from_toml_rejects_missing_table() {
        let err = EntityRegistry::from_toml_str("[entities.Order]\nschema = \"shop\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Mapping(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[entities.Order]\ntable = \"orders\"").unwrap();

        let registry = EntityRegistry::from_toml_file(file.path()).unwrap();
        assert_eq!(registry.table_name("Order").unwrap(), "orders");

        assert!(EntityRegistry::from_toml_file("/nonexistent/mapping.toml").is_err());
    }
}
