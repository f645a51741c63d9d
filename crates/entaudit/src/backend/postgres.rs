//! PostgreSQL-backed audit reads

use super::{decode_error, hex, is_core_column, parse_kind, AuditConnection};
use crate::config::DatabaseConfig;
use crate::entry::{AuditEntry, ObjectId};
use crate::error::Result;
use crate::query::AuditQuery;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::{Column, Row};
use tracing::debug;

/// Open a pool from `config`.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    config.validate()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout_duration())
        .connect(&config.url)
        .await?;
    Ok(pool)
}

#[async_trait]
impl AuditConnection for PgPool {
    async fn fetch_entries(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
        let mut builder = query.select_builder::<Postgres>()?;
        debug!(sql = builder.sql(), "fetching audit entries");
        let rows = builder.build().fetch_all(self).await?;
        rows.iter().map(row_to_entry).collect()
    }

    async fn fetch_count(&self, query: &AuditQuery) -> Result<Option<i64>> {
        let mut builder = query.count_builder::<Postgres>()?;
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

fn row_to_entry(row: &PgRow) -> Result<AuditEntry> {
    let kind: String = row.try_get("type").map_err(|e| decode_error("type", e))?;

    let mut payload = serde_json::Map::new();
    for column in row.columns() {
        if !is_core_column(column.name()) {
            payload.insert(column.name().to_string(), extra_value(row, column.ordinal()));
        }
    }

    Ok(AuditEntry {
        id: id(row)?,
        kind: parse_kind(&kind)?,
        object_id: object_id(row)?,
        context: row
            .try_get("context")
            .map_err(|e| decode_error("context", e))?,
        created_at: created_at(row)?,
        payload,
    })
}

fn id(row: &PgRow) -> Result<i64> {
    if let Ok(id) = row.try_get::<i64, _>("id") {
        return Ok(id);
    }
    row.try_get::<i32, _>("id")
        .map(i64::from)
        .map_err(|e| decode_error("id", e))
}

fn object_id(row: &PgRow) -> Result<ObjectId> {
    if let Ok(id) = row.try_get::<String, _>("object_id") {
        return Ok(ObjectId::Text(id));
    }
    if let Ok(id) = row.try_get::<i32, _>("object_id") {
        return Ok(ObjectId::Int(id.into()));
    }
    row.try_get::<i64, _>("object_id")
        .map(ObjectId::Int)
        .map_err(|e| decode_error("object_id", e))
}

fn created_at(row: &PgRow) -> Result<DateTime<Utc>> {
    if let Ok(ts) = row.try_get::<DateTime<Utc>, _>("created_at") {
        return Ok(ts);
    }
    row.try_get::<NaiveDateTime, _>("created_at")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| decode_error("created_at", e))
}

fn extra_value(row: &PgRow, index: usize) -> Value {
    macro_rules! try_as {
        ($ty:ty, $map:expr) => {
            if let Ok(value) = row.try_get::<Option<$ty>, _>(index) {
                return value.map($map).unwrap_or(Value::Null);
            }
        };
    }

    try_as!(i64, Value::from);
    try_as!(i32, Value::from);
    try_as!(i16, Value::from);
    try_as!(f64, Value::from);
    try_as!(f32, |v: f32| Value::from(f64::from(v)));
    try_as!(bool, Value::Bool);
    try_as!(String, Value::String);
    try_as!(Value, |v| v);
    try_as!(DateTime<Utc>, |v: DateTime<Utc>| Value::String(v.to_rfc3339()));
    try_as!(NaiveDateTime, |v: NaiveDateTime| Value::String(
        Utc.from_utc_datetime(&v).to_rfc3339()
    ));
    try_as!(NaiveDate, |v: NaiveDate| Value::String(v.to_string()));
    try_as!(uuid::Uuid, |v: uuid::Uuid| Value::String(v.to_string()));
    try_as!(Vec<u8>, |v: Vec<u8>| Value::String(hex(&v)));

    debug!(index, "unsupported payload column type, mapped to null");
    Value::Null
}
