//! SQLite-backed audit reads

use super::{decode_error, hex, is_core_column, parse_kind, AuditConnection};
use crate::config::DatabaseConfig;
use crate::entry::{AuditEntry, ObjectId};
use crate::error::Result;
use crate::query::AuditQuery;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use sqlx::sqlite::{Sqlite, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use tracing::debug;

/// Open a pool from `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool> {
    config.validate()?;
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout_duration())
        .connect(&config.url)
        .await?;
    Ok(pool)
}

#[async_trait]
impl AuditConnection for SqlitePool {
    async fn fetch_entries(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
        let mut builder = query.select_builder::<Sqlite>()?;
        debug!(sql = builder.sql(), "fetching audit entries");
        let rows = builder.build().fetch_all(self).await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn fetch_count(&self, query: &AuditQuery) -> Result<Option<i64>> {
        let mut builder = query.count_builder::<Sqlite>()?;
        debug!(sql = builder.sql(), "counting audit entries");
        let row = builder.build().fetch_optional(self).await?;
        match row {
            Some(row) => row
                .try_get::<Option<i64>, _>(0)
                .map_err(|e| decode_error("count", e)),
            None => Ok(None),
        }
    }
}

fn row_to_entry(row: &SqliteRow) -> Result<AuditEntry> {
    let kind: String = row.try_get("type").map_err(|e| decode_error("type", e))?;

    let mut payload = serde_json::Map::new();
    for column in row.columns() {
        if !is_core_column(column.name()) {
            payload.insert(column.name().to_string(), extra_value(row, column.ordinal()));
        }
    }

    Ok(AuditEntry {
        id: row.try_get("id").map_err(|e| decode_error("id", e))?,
        kind: parse_kind(&kind)?,
        object_id: object_id(row)?,
        context: row
            .try_get("context")
            .map_err(|e| decode_error("context", e))?,
        created_at: created_at(row)?,
        payload,
    })
}

fn object_id(row: &SqliteRow) -> Result<ObjectId> {
    if let Ok(id) = row.try_get::<String, _>("object_id") {
        return Ok(ObjectId::Text(id));
    }
    row.try_get::<i64, _>("object_id")
        .map(ObjectId::Int)
        .map_err(|e| decode_error("object_id", e))
}

fn created_at(row: &SqliteRow) -> Result<DateTime<Utc>> {
    if let Ok(ts) = row.try_get::<DateTime<Utc>, _>("created_at") {
        return Ok(ts);
    }
    row.try_get::<NaiveDateTime, _>("created_at")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| decode_error("created_at", e))
}

fn extra_value(row: &SqliteRow, index: usize) -> Value {
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return value.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return value.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(value) = row.try_get::<Option<Vec<u8>>, _>(index) {
        return value
            .map(|bytes| Value::String(hex(&bytes)))
            .unwrap_or(Value::Null);
    }
    debug!(index, "unsupported payload column type, mapped to null");
    Value::Null
}
