//! Model System - key lookups against registered tables
//!
//! A [`Model`] is bound to one table at a time. When the table is known to
//! the [`SchemaRegistry`] the model "has a migration" and validates the
//! requested columns against it; otherwise it trusts the caller.
//!
//! - `record`: untyped column/value results
//! - `hydrate`: explicit column to field bindings for typed results
//! - `lifecycle`: observer hooks fired by write paths

pub mod hydrate;
pub mod lifecycle;
pub mod record;

use std::sync::Arc;

pub use hydrate::{FieldMap, FromDatabaseValue, Hydrate, Hydrated};
pub use lifecycle::{HookContext, LifecycleEvent, ModelObserver, Observers};
pub use record::Record;

use crate::backends::{DatabasePool, DatabaseValue, KeyLookup};
use crate::error::{OrmError, OrmResult};
use crate::naming::to_snake_case;
use crate::schema::{SchemaRegistry, Table};

/// Progress of the current lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Unbound,
    TableResolved,
    ColumnsSelected,
    Executed,
    Hydrated,
    Failed,
}

#[derive(Debug)]
pub struct Model {
    registry: Arc<SchemaRegistry>,
    table_name: Option<String>,
    table: Option<Arc<Table>>,
    selected_columns: Vec<String>,
    state: QueryState,
    data: Option<Record>,
    fillable: Vec<String>,
    guarded: Vec<String>,
    observers: Observers,
}

impl Model {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            table_name: None,
            table: None,
            selected_columns: Vec::new(),
            state: QueryState::Unbound,
            data: None,
            fillable: Vec::new(),
            guarded: Vec::new(),
            observers: Observers::default(),
        }
    }

    /// Bind the model to a table
    ///
    /// Registered tables are found by stored or derived name. Unknown names
    /// are snake_cased and used as given, without a column list.
    pub fn table(&mut self, name: &str) -> &mut Self {
        match self.registry.get_table(name) {
            Some(table) => {
                self.table_name = Some(table.name.clone());
                self.table = Some(table);
            }
            None => {
                tracing::debug!(table = name, "no migration registered, running schema-less");
                self.table_name = Some(to_snake_case(name));
                self.table = None;
            }
        }
        self.selected_columns.clear();
        self.data = None;
        self.state = QueryState::TableResolved;
        self
    }

    pub fn table_name(&self) -> Option<&str> {
        self.table_name.as_deref()
    }

    /// Descriptor of the bound table, when it has a migration
    pub fn table_descriptor(&self) -> Option<&Table> {
        self.table.as_deref()
    }

    pub fn has_migration(&self) -> bool {
        self.table.is_some()
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.selected_columns
    }

    /// Result of the last successful lookup
    pub fn data(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    /// Choose the columns the next lookup reads
    ///
    /// With a migration, unknown columns are dropped and an empty request
    /// selects every table column. Without one the request is taken as is.
    pub fn set_selected_columns(&mut self, columns: &[&str]) -> OrmResult<()> {
        let table_name = self
            .table_name
            .clone()
            .ok_or_else(|| OrmError::invalid_argument("no table bound to the model"))?;

        let mut selected: Vec<String> = columns.iter().map(|c| c.to_string()).collect();

        if let Some(table) = &self.table {
            if selected.is_empty() {
                selected = table.column_names();
            } else {
                selected.retain(|column| {
                    let known = table.has_column(column);
                    if !known {
                        tracing::warn!(table = %table_name, column = %column, "dropping unknown column");
                    }
                    known
                });
            }
        }

        if selected.is_empty() {
            self.state = QueryState::Failed;
            return Err(OrmError::invalid_argument(format!(
                "no valid columns to select from '{}'",
                table_name
            )));
        }

        self.selected_columns = selected;
        self.state = QueryState::ColumnsSelected;
        Ok(())
    }

    /// Fetch the row whose key equals `id`
    ///
    /// `id` must be an integer or a string; anything else fails before the
    /// pool is touched.
    pub async fn find(
        &mut self,
        pool: &dyn DatabasePool,
        id: impl Into<DatabaseValue>,
        columns: &[&str],
    ) -> OrmResult<Record> {
        let result = self.execute_find(pool, id.into(), columns).await;
        match &result {
            Ok(record) => {
                self.data = Some(record.clone());
                self.state = QueryState::Hydrated;
            }
            Err(_) => {
                self.data = None;
                self.state = QueryState::Failed;
            }
        }
        result
    }

    async fn execute_find(
        &mut self,
        pool: &dyn DatabasePool,
        key: DatabaseValue,
        columns: &[&str],
    ) -> OrmResult<Record> {
        if !key.is_key() {
            return Err(OrmError::invalid_argument(format!(
                "id must be an integer or a string, got {}",
                key.kind()
            )));
        }

        self.set_selected_columns(columns)?;

        let table = self.table_name.clone().unwrap_or_default();
        let key_column = self
            .table
            .as_ref()
            .map(|t| t.key_column().to_string())
            .unwrap_or_else(|| "id".to_string());

        let lookup = KeyLookup {
            table: table.clone(),
            columns: self.selected_columns.clone(),
            key_column,
            key,
        };

        let row = pool
            .find_by_key(&lookup)
            .await?
            .ok_or_else(|| OrmError::not_found(&table, &lookup.key))?;
        self.state = QueryState::Executed;

        if row.column_count() != lookup.columns.len() {
            return Err(OrmError::scan(format!(
                "expected {} columns from '{}', got {}",
                lookup.columns.len(),
                table,
                row.column_count()
            )));
        }

        let mut record = Record::new();
        for (index, column) in lookup.columns.iter().enumerate() {
            record.insert(column.clone(), row.get_by_index(index)?);
        }

        tracing::debug!(table = %table, key = %lookup.key, columns = record.len(), "record found");
        Ok(record)
    }

    /// Fetch a row and copy it into `T` through its field map
    ///
    /// Schema-less models with no requested columns select the mapped ones.
    pub async fn find_as<T: Hydrate>(
        &mut self,
        pool: &dyn DatabasePool,
        id: impl Into<DatabaseValue>,
        columns: &[&str],
    ) -> OrmResult<Hydrated<T>> {
        let field_map = T::field_map();
        let requested: Vec<&str> = if columns.is_empty() && !self.has_migration() {
            field_map.columns()
        } else {
            columns.to_vec()
        };

        let record = self.find(pool, id, &requested).await?;

        let mut model = T::default();
        let warnings = field_map.apply(&mut model, &record);
        Ok(Hydrated { model, warnings })
    }

    /// Attributes allowed for mass assignment
    pub fn fillable(&mut self, fields: &[&str]) -> &mut Self {
        self.fillable = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Attributes refused for mass assignment; `*` guards everything
    pub fn guarded(&mut self, fields: &[&str]) -> &mut Self {
        self.guarded = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn fillable_fields(&self) -> &[String] {
        &self.fillable
    }

    pub fn guarded_fields(&self) -> &[String] {
        &self.guarded
    }

    /// Whether `attribute` may be set from bulk input
    ///
    /// Guarded wins over fillable. An empty fillable list allows anything
    /// not guarded.
    pub fn is_mass_assignable(&self, attribute: &str) -> bool {
        if self.guarded.iter().any(|g| g == "*" || g == attribute) {
            return false;
        }
        self.fillable.is_empty() || self.fillable.iter().any(|f| f == attribute)
    }

    pub fn observe(&mut self, observer: impl ModelObserver + 'static) -> &mut Self {
        self.observers.register(Arc::new(observer));
        self
    }

    /// Run every observer for `event`, stopping at the first error
    pub async fn fire(&self, event: LifecycleEvent) -> OrmResult<()> {
        let ctx = HookContext {
            table: self.table_name.as_deref().unwrap_or_default(),
            data: self.data.as_ref(),
        };
        self.observers.fire(event, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryPool;
    use crate::dialect::Dialect;
    use crate::schema::column::{big_increments, boolean, string};
    use crate::schema::{Schema, TableBuilder};

    fn users() -> Table {
        Table::new(
            "user",
            [
                big_increments(()),
                string("name", ["not_null"]),
                string("email", ["unique"]),
                boolean("active", ()),
            ],
        )
    }

    fn registry() -> Arc<SchemaRegistry> {
        Arc::new(SchemaRegistry::bootstrap(Schema::new("app"), [users as TableBuilder]).unwrap())
    }

    fn pool() -> MemoryPool {
        let pool = MemoryPool::new(Dialect::MySql);
        pool.insert(
            "users",
            [
                ("id", DatabaseValue::Int64(1)),
                ("name", DatabaseValue::from("Ada")),
                ("email", DatabaseValue::from("ada@example.com")),
                ("active", DatabaseValue::Bool(true)),
            ],
        );
        pool
    }

    #[test]
    fn test_table_resolution() {
        let mut model = Model::new(registry());
        assert_eq!(model.state(), QueryState::Unbound);

        model.table("User");
        assert!(model.has_migration());
        assert_eq!(model.table_name(), Some("users"));
        assert_eq!(model.state(), QueryState::TableResolved);

        model.table("AuditLog");
        assert!(!model.has_migration());
        assert_eq!(model.table_name(), Some("audit_log"));
    }

    #[test]
    fn test_unknown_columns_are_dropped_without_skipping_neighbours() {
        let mut model = Model::new(registry());
        model.table("users");
        model
            .set_selected_columns(&["bogus", "other", "name", "nope", "email"])
            .unwrap();
        assert_eq!(model.selected_columns(), ["name", "email"]);
    }

    #[test]
    fn test_empty_selection_defaults_to_table_columns() {
        let mut model = Model::new(registry());
        model.table("users");
        model.set_selected_columns(&[]).unwrap();
        assert_eq!(model.selected_columns(), ["id", "name", "email", "active"]);
    }

    #[test]
    fn test_zero_valid_columns_is_invalid() {
        let mut model = Model::new(registry());
        model.table("users");
        let err = model.set_selected_columns(&["bogus"]).unwrap_err();
        assert!(matches!(err, OrmError::InvalidArgument(_)));
        assert_eq!(model.state(), QueryState::Failed);

        model.table("audit_log");
        assert!(model.set_selected_columns(&[]).is_err());
    }

    #[test]
    fn test_schema_less_trusts_caller() {
        let mut model = Model::new(registry());
        model.table("audit_log");
        model.set_selected_columns(&["anything"]).unwrap();
        assert_eq!(model.selected_columns(), ["anything"]);
    }

    #[tokio::test]
    async fn test_find_returns_requested_columns() {
        let pool = pool();
        let mut model = Model::new(registry());
        model.table("users");

        let record = model.find(&pool, 1i64, &["name", "email"]).await.unwrap();
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("name"), Some(&DatabaseValue::from("Ada")));
        assert_eq!(model.state(), QueryState::Hydrated);
        assert_eq!(model.data(), Some(&record));
    }

    #[tokio::test]
    async fn test_find_rejects_unsupported_ids_before_querying() {
        let pool = pool();
        let mut model = Model::new(registry());
        model.table("users");

        for id in [DatabaseValue::Null, DatabaseValue::Bool(true), DatabaseValue::Float64(1.0)] {
            let err = model.find(&pool, id, &[]).await.unwrap_err();
            assert!(matches!(err, OrmError::InvalidArgument(_)));
        }
        assert_eq!(pool.lookup_count(), 0);
        assert_eq!(model.state(), QueryState::Failed);
    }

    #[tokio::test]
    async fn test_find_missing_row() {
        let pool = pool();
        let mut model = Model::new(registry());
        model.table("users");

        let err = model.find(&pool, 42i64, &[]).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(model.data().is_none());
    }

    #[test]
    fn test_mass_assignment_lists() {
        let mut model = Model::new(registry());
        assert!(model.is_mass_assignable("name"));

        model.fillable(&["name", "email"]).guarded(&["email"]);
        assert!(model.is_mass_assignable("name"));
        assert!(!model.is_mass_assignable("email"));
        assert!(!model.is_mass_assignable("active"));

        model.guarded(&["*"]);
        assert!(!model.is_mass_assignable("name"));
        assert_eq!(model.fillable_fields(), ["name", "email"]);
    }

    #[tokio::test]
    async fn test_fire_propagates_hook_errors() {
        struct RejectSave;

        #[async_trait::async_trait]
        impl ModelObserver for RejectSave {
            async fn before_save(&self, ctx: HookContext<'_>) -> OrmResult<()> {
                Err(OrmError::invalid_argument(format!("{} is read-only", ctx.table)))
            }
        }

        let mut model = Model::new(registry());
        model.table("users").observe(RejectSave);

        assert!(model.fire(LifecycleEvent::AfterSave).await.is_ok());
        let err = model.fire(LifecycleEvent::BeforeSave).await.unwrap_err();
        assert!(err.to_string().contains("users is read-only"));
    }
}
