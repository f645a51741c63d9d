//! Audit entry types

use crate::metadata::AuditedEntity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of change recorded by an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditType {
    /// Entity row was inserted
    Insert,
    /// Entity columns were updated
    Update,
    /// An association was added to a collection
    Associate,
    /// An association was removed from a collection
    Dissociate,
    /// Entity row was removed
    Remove,
}

impl AuditType {
    /// Every operation type, in declaration order.
    pub const ALL: [AuditType; 5] = [
        AuditType::Insert,
        AuditType::Update,
        AuditType::Associate,
        AuditType::Dissociate,
        AuditType::Remove,
    ];

    /// Value stored in the `type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditType::Insert => "insert",
            AuditType::Update => "update",
            AuditType::Associate => "associate",
            AuditType::Dissociate => "dissociate",
            AuditType::Remove => "remove",
        }
    }
}

impl fmt::Display for AuditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an operation type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown audit type: {0}")]
pub struct ParseAuditTypeError(
    /// Rejected input
    pub String,
);

impl FromStr for AuditType {
    type Err = ParseAuditTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        AuditType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseAuditTypeError(s.to_string()))
    }
}

/// Identifier of an audited entity instance.
///
/// Kept as integer or text so it binds with the column's native type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ObjectId {
    /// Integer identifier
    Int(i64),
    /// Text identifier (UUIDs, natural keys, composite keys)
    Text(String),
}

impl ObjectId {
    /// Parse a command-line style value: integers stay integers.
    pub fn parse(value: &str) -> Self {
        value
            .parse::<i64>()
            .map(ObjectId::Int)
            .unwrap_or_else(|_| ObjectId::Text(value.to_string()))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectId::Int(id) => write!(f, "{}", id),
            ObjectId::Text(id) => f.write_str(id),
        }
    }
}

impl From<i64> for ObjectId {
    fn from(id: i64) -> Self {
        ObjectId::Int(id)
    }
}

impl From<i32> for ObjectId {
    fn from(id: i32) -> Self {
        ObjectId::Int(id.into())
    }
}

impl From<&str> for ObjectId {
    fn from(id: &str) -> Self {
        ObjectId::Text(id.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(id: String) -> Self {
        ObjectId::Text(id)
    }
}

/// One row of an audit table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Primary key, monotonically increasing.
    pub id: i64,
    /// Kind of change.
    #[serde(rename = "type")]
    pub kind: AuditType,
    /// Audited entity instance.
    pub object_id: ObjectId,
    /// Correlation tag grouping related entries.
    pub context: Option<String>,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
    /// Every other column, uninterpreted.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// A tracked entity type, resolved once at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityRef(String);

impl EntityRef {
    /// Reference an entity type by name.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self(type_name.into())
    }

    /// Reference the entity type `T`.
    pub fn of<T: AuditedEntity>() -> Self {
        Self(T::ENTITY_TYPE.to_string())
    }

    /// Reference the type of a live entity value.
    pub fn of_instance<T: AuditedEntity>(_entity: &T) -> Self {
        Self::of::<T>()
    }

    /// Entity type name.
    pub fn type_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityRef {
    fn from(type_name: &str) -> Self {
        Self::new(type_name)
    }
}

impl From<String> for EntityRef {
    fn from(type_name: String) -> Self {
        Self(type_name)
    }
}

impl From<&String> for EntityRef {
    fn from(type_name: &String) -> Self {
        Self(type_name.clone())
    }
}

impl From<&EntityRef> for EntityRef {
    fn from(entity: &EntityRef) -> Self {
        entity.clone()
    }
}
