//! MongoDB Backend Implementation
//!
//! Key lookups become `find_one` calls filtered on `_id` with a projection
//! of the selected fields. A lookup keyed on `id` reads the document's `_id`.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::FindOneOptions;
use mongodb::{Client, Database};

use super::core::*;
use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};

const ID_FIELD: &str = "_id";

/// MongoDB pool over a single database
#[derive(Debug, Clone)]
pub struct MongoPool {
    client: Client,
    database: Database,
}

impl MongoPool {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    pub async fn connect(uri: &str, database_name: &str) -> OrmResult<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| OrmError::Connection(format!("Failed to create MongoDB client: {}", e)))?;
        let database = client.database(database_name);
        Ok(Self::new(client, database))
    }
}

/// Document field backing a column name
fn field_name(column: &str) -> &str {
    if column == "id" {
        ID_FIELD
    } else {
        column
    }
}

/// `_id` filter value for a key, preferring ObjectId when the string parses
fn key_to_bson(key: &DatabaseValue) -> OrmResult<Bson> {
    match key {
        DatabaseValue::String(s) => Ok(match ObjectId::parse_str(s) {
            Ok(oid) => Bson::ObjectId(oid),
            Err(_) => Bson::String(s.clone()),
        }),
        DatabaseValue::Int32(i) => Ok(Bson::Int32(*i)),
        DatabaseValue::Int64(i) => Ok(Bson::Int64(*i)),
        other => Err(OrmError::invalid_argument(format!(
            "unsupported MongoDB key type: {}",
            other.kind()
        ))),
    }
}

#[async_trait]
impl DatabasePool for MongoPool {
    fn dialect(&self) -> Dialect {
        Dialect::MongoDb
    }

    async fn find_by_key(&self, lookup: &KeyLookup) -> OrmResult<Option<Box<dyn DatabaseRow>>> {
        if lookup.columns.is_empty() {
            return Err(OrmError::invalid_argument(format!(
                "no columns selected from '{}'",
                lookup.table
            )));
        }

        let collection = self.database.collection::<Document>(&lookup.table);

        let mut filter = Document::new();
        filter.insert(field_name(&lookup.key_column), key_to_bson(&lookup.key)?);

        let mut projection = Document::new();
        for column in &lookup.columns {
            projection.insert(field_name(column), 1);
        }

        tracing::debug!(collection = %lookup.table, filter = %filter, "mongodb key lookup");

        let options = FindOneOptions::builder().projection(projection).build();
        let found = collection.find_one(filter).with_options(options).await?;

        Ok(found.map(|document| {
            Box::new(MongoRow::new(document, lookup.columns.clone())) as Box<dyn DatabaseRow>
        }))
    }

    async fn health_check(&self) -> OrmResult<Duration> {
        let start = Instant::now();

        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| OrmError::Connection(format!("Health check failed: {}", e)))?;

        Ok(start.elapsed())
    }

    async fn close(&self) -> OrmResult<()> {
        self.client.clone().shutdown().await;
        Ok(())
    }
}

/// A fetched document read back in selection order
pub struct MongoRow {
    document: Document,
    columns: Vec<String>,
}

impl MongoRow {
    pub fn new(document: Document, columns: Vec<String>) -> Self {
        Self { document, columns }
    }

    /// Value of a selected column; fields absent from the document read as NULL
    pub fn field(&self, name: &str) -> OrmResult<DatabaseValue> {
        if !self.columns.iter().any(|c| c == name) {
            return Err(OrmError::scan(format!("Column '{}' not found", name)));
        }
        Ok(self
            .document
            .get(field_name(name))
            .map(bson_to_database_value)
            .unwrap_or(DatabaseValue::Null))
    }
}

impl DatabaseRow for MongoRow {
    fn get_by_index(&self, index: usize) -> OrmResult<DatabaseValue> {
        let column = self
            .columns
            .get(index)
            .ok_or_else(|| OrmError::scan(format!("column index {} out of range", index)))?;
        self.field(column)
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.clone()
    }
}

fn bson_to_database_value(value: &Bson) -> DatabaseValue {
    match value {
        Bson::Null | Bson::Undefined => DatabaseValue::Null,
        Bson::Boolean(b) => DatabaseValue::Bool(*b),
        Bson::Int32(i) => DatabaseValue::Int32(*i),
        Bson::Int64(i) => DatabaseValue::Int64(*i),
        Bson::Double(f) => DatabaseValue::Float64(*f),
        Bson::String(s) => DatabaseValue::String(s.clone()),
        Bson::ObjectId(oid) => DatabaseValue::String(oid.to_hex()),
        Bson::Decimal128(d) => DatabaseValue::String(d.to_string()),
        Bson::DateTime(dt) => DatabaseValue::DateTime(dt.to_chrono()),
        Bson::Binary(bin) => DatabaseValue::Bytes(bin.bytes.clone()),
        other => DatabaseValue::Json(other.clone().into_relaxed_extjson()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_column_maps_to_object_id_field() {
        assert_eq!(field_name("id"), "_id");
        assert_eq!(field_name("email"), "email");
    }

    #[test]
    fn test_string_keys_parse_as_object_ids_when_valid() {
        let hex = "65a1f0c2e4b0a1b2c3d4e5f6";
        assert!(matches!(
            key_to_bson(&DatabaseValue::from(hex)).unwrap(),
            Bson::ObjectId(_)
        ));
        assert_eq!(
            key_to_bson(&DatabaseValue::from("slug")).unwrap(),
            Bson::String("slug".to_string())
        );
        assert_eq!(key_to_bson(&DatabaseValue::Int64(9)).unwrap(), Bson::Int64(9));
        assert!(key_to_bson(&DatabaseValue::Bool(true)).is_err());
    }

    #[test]
    fn test_row_reads_selected_fields() {
        let oid = ObjectId::new();
        let document = doc! { "_id": oid, "name": "ada", "age": 36 };
        let row = MongoRow::new(document, vec!["id".into(), "name".into(), "nickname".into()]);

        assert_eq!(row.column_count(), 3);
        assert_eq!(row.get_by_index(0).unwrap(), DatabaseValue::String(oid.to_hex()));
        assert_eq!(row.field("name").unwrap(), DatabaseValue::from("ada"));
        assert!(row.field("nickname").unwrap().is_null());
        assert!(row.field("age").is_err());
    }
}
