//! PostgreSQL Backend Implementation
//!
//! Key lookups over a sqlx `PgPool`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{Column, Pool, Postgres, Row, TypeInfo, ValueRef};

use super::core::*;
use crate::config::PoolConfig;
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};

/// PostgreSQL connection pool implementation
pub struct PostgresPool {
    pool: Arc<Pool<Postgres>>,
}

impl PostgresPool {
    pub fn new(pool: Arc<Pool<Postgres>>) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, config: &PoolConfig) -> OrmResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(database_url)
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to create PostgreSQL pool: {}", e)))?;
        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl DatabasePool for PostgresPool {
    fn dialect(&self) -> Dialect {
        Dialect::PostgreSql
    }

    async fn find_by_key(&self, lookup: &KeyLookup) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        let sql = lookup.to_sql(Dialect::PostgreSql)?;
        tracing::debug!(sql = %sql, key = %lookup.key, "postgres key lookup");

        let query = bind_database_value(sqlx::query(&sql), &lookup.key);
        let row = query.fetch_optional(&*self.pool).await?;

        Ok(row.map(|r| Box::new(PostgresRow::new(r)) as Box<dyn DatabaseRow>))
    }

    async fn health_check(&self) -> OrmResult<Duration> {
        let start = Instant::now();

        sqlx::query("SELECT 1")
            .execute(&*self.pool)
            .await
            .map_err(|e| OrmError::Connection(format!("Health check failed: {}", e)))?;

        Ok(start.elapsed())
    }

    async fn close(&self) -> OrmResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// PostgreSQL row implementation
pub struct PostgresRow {
    row: PgRow,
}

impl PostgresRow {
    pub fn new(row: PgRow) -> Self {
        Self { row }
    }
}

impl DatabaseRow for PostgresRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        if index >= self.row.len() {
            return Err(OrmError::scan(format!("column index {} out of range", index)));
        }
        postgres_value_to_database_value(&self.row, index)
    }

    fn column_count(&self) -> usize {
        self.row.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.row.columns().iter().map(|col| col.name().to_string()).collect()
    }
}

/// Bind a DatabaseValue to a sqlx query
fn bind_database_value<'a>(
    query: Query<'a, Postgres, PgArguments>,
    value: &DatabaseValue,
) -> Query<'a, Postgres, PgArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int32(i) => query.bind(*i),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float32(f) => query.bind(*f),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        DatabaseValue::Uuid(u) => query.bind(*u),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

/// How a PostgreSQL column is read, chosen from its type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgDecode {
    Bool,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Numeric,
    Text,
    Bytes,
    Uuid,
    TimestampTz,
    Timestamp,
    Date,
    Time,
    Json,
    /// Read as text when the driver allows it, NULL otherwise
    Other,
}

fn pg_decode_for(type_name: &str) -> PgDecode {
    match type_name {
        "BOOL" => PgDecode::Bool,
        "INT2" => PgDecode::Int16,
        "INT4" => PgDecode::Int32,
        "INT8" => PgDecode::Int64,
        "FLOAT4" => PgDecode::Float32,
        "FLOAT8" => PgDecode::Float64,
        "NUMERIC" => PgDecode::Numeric,
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" => PgDecode::Text,
        "BYTEA" => PgDecode::Bytes,
        "UUID" => PgDecode::Uuid,
        "TIMESTAMPTZ" => PgDecode::TimestampTz,
        "TIMESTAMP" => PgDecode::Timestamp,
        "DATE" => PgDecode::Date,
        "TIME" => PgDecode::Time,
        "JSON" | "JSONB" => PgDecode::Json,
        _ => PgDecode::Other,
    }
}

/// Convert a PostgreSQL column value to DatabaseValue
///
/// NUMERIC values become text with their scale intact (`19.90`). A column
/// whose type has no text decoding yields NULL and a warning instead of
/// failing the row.
fn postgres_value_to_database_value(row: &PgRow, index: usize) -> OrmResult<DatabaseValue> {
    let column = &row.columns()[index];
    let type_name = column.type_info().name();

    if row.try_get_raw(index)?.is_null() {
        return Ok(DatabaseValue::Null);
    }

    let scan_err = |e: sqlx::Error| {
        OrmError::scan(format!(
            "failed to decode column '{}' of type {}: {}",
            column.name(),
            type_name,
            e
        ))
    };

    let value = match pg_decode_for(type_name) {
        PgDecode::Bool => DatabaseValue::Bool(row.try_get(index).map_err(scan_err)?),
        PgDecode::Int16 => DatabaseValue::Int32(row.try_get::<i16, _>(index).map_err(scan_err)? as i32),
        PgDecode::Int32 => DatabaseValue::Int32(row.try_get(index).map_err(scan_err)?),
        PgDecode::Int64 => DatabaseValue::Int64(row.try_get(index).map_err(scan_err)?),
        PgDecode::Float32 => DatabaseValue::Float32(row.try_get(index).map_err(scan_err)?),
        PgDecode::Float64 => DatabaseValue::Float64(row.try_get(index).map_err(scan_err)?),
        PgDecode::Numeric => DatabaseValue::from(row.try_get::<Decimal, _>(index).map_err(scan_err)?),
        PgDecode::Text => DatabaseValue::String(row.try_get(index).map_err(scan_err)?),
        PgDecode::Bytes => DatabaseValue::Bytes(row.try_get(index).map_err(scan_err)?),
        PgDecode::Uuid => DatabaseValue::Uuid(row.try_get(index).map_err(scan_err)?),
        PgDecode::TimestampTz => DatabaseValue::DateTime(row.try_get(index).map_err(scan_err)?),
        PgDecode::Timestamp => {
            let naive: chrono::NaiveDateTime = row.try_get(index).map_err(scan_err)?;
            DatabaseValue::DateTime(naive.and_utc())
        }
        PgDecode::Date => DatabaseValue::Date(row.try_get(index).map_err(scan_err)?),
        PgDecode::Time => DatabaseValue::Time(row.try_get(index).map_err(scan_err)?),
        PgDecode::Json => DatabaseValue::Json(row.try_get::<JsonValue, _>(index).map_err(scan_err)?),
        PgDecode::Other => match row.try_get::<String, _>(index) {
            Ok(text) => DatabaseValue::String(text),
            Err(err) => {
                tracing::warn!(
                    column = %column.name(),
                    type_name,
                    error = %err,
                    "unsupported column type, reading NULL"
                );
                DatabaseValue::Null
            }
        },
    };

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_columns_decode_as_decimals() {
        assert_eq!(pg_decode_for("NUMERIC"), PgDecode::Numeric);
        assert_eq!(pg_decode_for("INT2"), PgDecode::Int16);
        assert_eq!(pg_decode_for("JSONB"), PgDecode::Json);
        assert_eq!(pg_decode_for("CITEXT"), PgDecode::Text);
    }

    #[test]
    fn test_unlisted_types_fall_back() {
        for name in ["INTERVAL", "INET", "MONEY", "TSVECTOR"] {
            assert_eq!(pg_decode_for(name), PgDecode::Other, "{name}");
        }
    }
}
