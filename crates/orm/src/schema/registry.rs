//! Schema registry
//!
//! Holds the tables built at startup. The registry is mutable only while it
//! is owned; once wrapped in an `Arc` and handed to models it is read-only,
//! so concurrent readers need no locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OrmResult;
use crate::naming::to_table_name;
use crate::schema::definition::Schema;
use crate::schema::table::Table;

/// A function producing one table definition
pub type TableBuilder = fn() -> Table;

/// Lookup from table name to its descriptor
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    tables: HashMap<String, Arc<Table>>,
    schema: Option<Schema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every builder, validate the result and register it
    ///
    /// Builders run in order and their tables are added to `schema`, which
    /// then gets its defaults applied and is validated. Any error aborts.
    pub fn bootstrap<I>(mut schema: Schema, builders: I) -> OrmResult<Self>
    where
        I: IntoIterator<Item = TableBuilder>,
    {
        for build in builders {
            schema.add_table(build())?;
        }
        schema.apply_defaults();
        schema.validate()?;

        let mut registry = Self::new();
        registry.set_schema(schema);

        tracing::info!(
            tables = registry.tables.len(),
            names = ?registry.table_names(),
            "schema registry bootstrapped"
        );
        Ok(registry)
    }

    /// Register a single table, replacing one with the same name
    pub fn register(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), Arc::new(table));
    }

    /// Install `schema` and register exactly its tables
    ///
    /// Tables registered before, individually or through an earlier schema,
    /// are dropped.
    pub fn set_schema(&mut self, schema: Schema) {
        self.tables.clear();
        for table in &schema.tables {
            self.register(table.clone());
        }
        self.schema = Some(schema);
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Resolve `name` as stored, or as the table name derived from it
    pub fn get_table(&self, name: &str) -> Option<Arc<Table>> {
        self.tables
            .get(name)
            .or_else(|| self.tables.get(&to_table_name(name)))
            .cloned()
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.get_table(name).is_some()
    }

    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;
    use crate::schema::column::{big_increments, string};

    fn users() -> Table {
        Table::new("user", [big_increments(()), string("email", ["unique"])])
    }

    fn posts() -> Table {
        Table::new("post", [big_increments(()), string("title", ())])
    }

    #[test]
    fn test_set_schema_replaces_registered_tables() {
        let mut registry =
            SchemaRegistry::bootstrap(Schema::new("app"), [users as TableBuilder, posts]).unwrap();
        registry.register(Table::new("tag", [big_increments(())]));

        let mut next = Schema::new("next");
        next.add_table(users()).unwrap();
        registry.set_schema(next);

        assert_eq!(registry.table_names(), vec!["users"]);
        assert!(registry.get_table("post").is_none());
        assert!(registry.get_table("tags").is_none());
        assert_eq!(registry.schema().unwrap().name, "next");
    }

    #[test]
    fn test_empty_registry() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.schema().is_none());
        assert!(registry.get_table("users").is_none());
    }

    #[test]
    fn test_bootstrap_registers_every_table() {
        let registry =
            SchemaRegistry::bootstrap(Schema::new("app").with_charset("utf8mb4"), [users as TableBuilder, posts])
                .unwrap();

        assert_eq!(registry.table_names(), vec!["posts", "users"]);
        assert_eq!(registry.schema().unwrap().tables.len(), 2);

        let table = registry.get_table("users").unwrap();
        assert_eq!(table.charset.as_deref(), Some("utf8mb4"));
    }

    #[test]
    fn test_get_table_resolves_singular_names() {
        let mut registry = SchemaRegistry::new();
        registry.register(users());
        assert!(registry.get_table("user").is_some());
        assert!(registry.get_table("User").is_some());
        assert!(registry.has_table("users"));
    }

    #[test]
    fn test_bootstrap_fails_on_duplicates() {
        let err = SchemaRegistry::bootstrap(Schema::new("app"), [users as TableBuilder, users]).unwrap_err();
        assert!(matches!(err, OrmError::Configuration(_)));
    }

    #[test]
    fn test_shared_registry_is_read_only() {
        let registry = Arc::new(SchemaRegistry::bootstrap(Schema::new("app"), [users as TableBuilder]).unwrap());
        let reader = Arc::clone(&registry);
        let handle = std::thread::spawn(move || reader.get_table("users").map(|t| t.columns.len()));
        assert_eq!(handle.join().unwrap(), Some(2));
    }
}
