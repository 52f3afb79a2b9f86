//! In-memory backend
//!
//! Rows are kept per table as ordered column/value lists. Lookups honour the
//! selected columns and count how often the pool was queried, which makes it
//! the pool of choice for exercising models without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::core::*;
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};

type StoredRow = Vec<(String, DatabaseValue)>;

pub struct MemoryPool {
    dialect: Dialect,
    tables: RwLock<HashMap<String, Vec<StoredRow>>>,
    lookups: AtomicUsize,
}

impl MemoryPool {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            tables: RwLock::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
        }
    }

    /// Store a row; column order is preserved
    pub fn insert<I, K, V>(&self, table: &str, row: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DatabaseValue>,
    {
        let row: StoredRow = row.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        let mut tables = match self.tables.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        tables.entry(table.to_string()).or_default().push(row);
    }

    /// Number of `find_by_key` calls served so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new(Dialect::MySql)
    }
}

#[async_trait]
impl DatabasePool for MemoryPool {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn find_by_key(&self, lookup: &KeyLookup) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.dialect.is_sql() {
            // Same shape checks a SQL driver would hit
            lookup.to_sql(self.dialect)?;
        }

        let tables = match self.tables.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let Some(rows) = tables.get(&lookup.table) else {
            return Err(OrmError::Database(format!("table '{}' doesn't exist", lookup.table)));
        };

        let found = rows.iter().find(|row| {
            row.iter()
                .any(|(name, value)| name == &lookup.key_column && keys_match(value, &lookup.key))
        });

        let Some(row) = found else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(lookup.columns.len());
        for column in &lookup.columns {
            match row.iter().find(|(name, _)| name == column) {
                Some((_, value)) => values.push(value.clone()),
                // Document stores return missing fields as absent, SQL rejects the column
                None if !self.dialect.is_sql() => values.push(DatabaseValue::Null),
                None => {
                    return Err(OrmError::Database(format!(
                        "unknown column '{}' in '{}'",
                        column, lookup.table
                    )))
                }
            }
        }

        Ok(Some(Box::new(MemoryRow::new(lookup.columns.clone(), values))))
    }

    async fn health_check(&self) -> OrmResult<Duration> {
        let start = Instant::now();
        Ok(start.elapsed())
    }

    async fn close(&self) -> OrmResult<()> {
        Ok(())
    }
}

/// Integer keys compare by value regardless of width
fn keys_match(stored: &DatabaseValue, key: &DatabaseValue) -> bool {
    fn as_i64(value: &DatabaseValue) -> Option<i64> {
        match value {
            DatabaseValue::Int32(i) => Some(*i as i64),
            DatabaseValue::Int64(i) => Some(*i),
            _ => None,
        }
    }

    match (as_i64(stored), as_i64(key)) {
        (Some(a), Some(b)) => a == b,
        _ => stored == key,
    }
}

/// A row held in memory
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRow {
    columns: Vec<String>,
    values: Vec<DatabaseValue>,
}

impl MemoryRow {
    pub fn new(columns: Vec<String>, values: Vec<DatabaseValue>) -> Self {
        Self { columns, values }
    }
}

impl DatabaseRow for MemoryRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| OrmError::scan(format!("column index {} out of range", index)))
    }

    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }
}
