//! MySQL Backend Implementation

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::{Column, MySql, Pool, Row, TypeInfo, ValueRef};

use super::core::*;
use crate::config::PoolConfig;
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};

/// MySQL connection pool implementation
pub struct MySqlPool {
    pool: Arc<Pool<MySql>>,
}

impl MySqlPool {
    pub fn new(pool: Arc<Pool<MySql>>) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, config: &PoolConfig) -> OrmResult<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(database_url)
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to create MySQL pool: {}", e)))?;
        Ok(Self::new(Arc::new(pool)))
    }
}

#[async_trait]
impl DatabasePool for MySqlPool {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn find_by_key(&self, lookup: &KeyLookup) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        let sql = lookup.to_sql(Dialect::MySql)?;
        tracing::debug!(sql = %sql, key = %lookup.key, "mysql key lookup");

        let query = bind_database_value(sqlx::query(&sql), &lookup.key);
        let row = query.fetch_optional(&*self.pool).await?;

        Ok(row.map(|r| Box::new(MySqlDatabaseRow::new(r)) as Box<dyn DatabaseRow>))
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

/// MySQL row implementation
pub struct MySqlDatabaseRow {
    row: MySqlRow,
}

impl MySqlDatabaseRow {
    pub fn new(row: MySqlRow) -> Self {
        Self { row }
    }
}

impl DatabaseRow for MySqlDatabaseRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        if index >= self.row.len() {
            return Err(OrmError::scan(format!("column index {} out of range", index)));
        }
        mysql_value_to_database_value(&self.row, index)
    }

    fn column_count(&self) -> usize {
        self.row.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.row.columns().iter().map(|col| col.name().to_string()).collect()
    }
}

fn bind_database_value<'a>(
    query: Query<'a, MySql, MySqlArguments>,
    value: &DatabaseValue,
) -> Query<'a, MySql, MySqlArguments> {
    match value {
        DatabaseValue::Null => query.bind(Option::<String>::None),
        DatabaseValue::Bool(b) => query.bind(*b),
        DatabaseValue::Int32(i) => query.bind(*i),
        DatabaseValue::Int64(i) => query.bind(*i),
        DatabaseValue::Float32(f) => query.bind(*f),
        DatabaseValue::Float64(f) => query.bind(*f),
        DatabaseValue::String(s) => query.bind(s.clone()),
        DatabaseValue::Bytes(b) => query.bind(b.clone()),
        // CHAR(36) is the usual MySQL storage for uuids
        DatabaseValue::Uuid(u) => query.bind(u.to_string()),
        DatabaseValue::DateTime(dt) => query.bind(*dt),
        DatabaseValue::Date(d) => query.bind(*d),
        DatabaseValue::Time(t) => query.bind(*t),
        DatabaseValue::Json(j) => query.bind(j.clone()),
    }
}

/// How a MySQL column is read, chosen from its type name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MySqlDecode {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
    Decimal,
    Text,
    Bytes,
    Timestamp,
    DateTime,
    Date,
    Time,
    Json,
    /// Read as text when the driver allows it, NULL otherwise
    Other,
}

fn mysql_decode_for(type_name: &str) -> MySqlDecode {
    match type_name {
        "BOOLEAN" => MySqlDecode::Bool,
        "TINYINT" => MySqlDecode::Int8,
        "SMALLINT" => MySqlDecode::Int16,
        "MEDIUMINT" | "INT" => MySqlDecode::Int32,
        "BIGINT" => MySqlDecode::Int64,
        "TINYINT UNSIGNED" => MySqlDecode::UInt8,
        "SMALLINT UNSIGNED" | "YEAR" => MySqlDecode::UInt16,
        "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => MySqlDecode::UInt32,
        "BIGINT UNSIGNED" => MySqlDecode::UInt64,
        "FLOAT" => MySqlDecode::Float32,
        "DOUBLE" => MySqlDecode::Float64,
        "DECIMAL" | "NEWDECIMAL" => MySqlDecode::Decimal,
        "VARCHAR" | "CHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            MySqlDecode::Text
        }
        "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" => MySqlDecode::Bytes,
        "TIMESTAMP" => MySqlDecode::Timestamp,
        "DATETIME" => MySqlDecode::DateTime,
        "DATE" => MySqlDecode::Date,
        "TIME" => MySqlDecode::Time,
        "JSON" => MySqlDecode::Json,
        _ => MySqlDecode::Other,
    }
}

/// Convert a MySQL column value to DatabaseValue
///
/// DECIMAL values become text with their scale intact. BIGINT UNSIGNED values
/// beyond `i64::MAX` also become text. A column whose type has no text
/// decoding yields NULL and a warning instead of failing the row.
fn mysql_value_to_database_value(row: &MySqlRow, index: usize) -> OrmResult<DatabaseValue> {
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

    let value = match mysql_decode_for(type_name) {
        MySqlDecode::Bool => DatabaseValue::Bool(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Int8 => DatabaseValue::from(row.try_get::<i8, _>(index).map_err(scan_err)?),
        MySqlDecode::Int16 => DatabaseValue::from(row.try_get::<i16, _>(index).map_err(scan_err)?),
        MySqlDecode::Int32 => DatabaseValue::Int32(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Int64 => DatabaseValue::Int64(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::UInt8 => DatabaseValue::from(row.try_get::<u8, _>(index).map_err(scan_err)?),
        MySqlDecode::UInt16 => DatabaseValue::from(row.try_get::<u16, _>(index).map_err(scan_err)?),
        MySqlDecode::UInt32 => DatabaseValue::from(row.try_get::<u32, _>(index).map_err(scan_err)?),
        MySqlDecode::UInt64 => {
            let raw: u64 = row.try_get(index).map_err(scan_err)?;
            match i64::try_from(raw) {
                Ok(v) => DatabaseValue::Int64(v),
                Err(_) => DatabaseValue::String(raw.to_string()),
            }
        }
        MySqlDecode::Float32 => DatabaseValue::Float32(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Float64 => DatabaseValue::Float64(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Decimal => DatabaseValue::from(row.try_get::<Decimal, _>(index).map_err(scan_err)?),
        MySqlDecode::Text => DatabaseValue::String(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Bytes => DatabaseValue::Bytes(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Timestamp => DatabaseValue::DateTime(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::DateTime => {
            let naive: chrono::NaiveDateTime = row.try_get(index).map_err(scan_err)?;
            DatabaseValue::DateTime(naive.and_utc())
        }
        MySqlDecode::Date => DatabaseValue::Date(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Time => DatabaseValue::Time(row.try_get(index).map_err(scan_err)?),
        MySqlDecode::Json => DatabaseValue::Json(row.try_get::<JsonValue, _>(index).map_err(scan_err)?),
        MySqlDecode::Other => match row.try_get::<String, _>(index) {
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
