//! Named collections of tables

use crate::dialect::Dialect;
use crate::error::{OrmError, OrmResult};
use crate::naming::to_table_name;
use crate::schema::table::Table;

/// A named, ordered set of tables
///
/// Table names are unique per schema. `add_table` refuses duplicates, while
/// tables pushed directly into `tables` are only checked by [`Schema::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub name: String,
    pub tables: Vec<Table>,
    pub charset: Option<String>,
    pub collation: Option<String>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Schema whose charset and collation default to `DB_CHARSET` and
    /// `DB_COLLATION`; unset or empty variables leave them unset
    pub fn from_env(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            charset: tessera_core::env_var("DB_CHARSET"),
            collation: tessera_core::env_var("DB_COLLATION"),
            ..Default::default()
        }
    }

    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn with_collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Index of a table by stored name, or by the table name derived from it
    fn position(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|table| table.name == name)
            .or_else(|| {
                let derived = to_table_name(name);
                self.tables.iter().position(|table| table.name == derived)
            })
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.position(name).map(|i| &self.tables[i])
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.position(name).map(move |i| &mut self.tables[i])
    }

    /// Append a table, rejecting a name that is already taken
    pub fn add_table(&mut self, table: Table) -> OrmResult<()> {
        if self.tables.iter().any(|existing| existing.name == table.name) {
            return Err(OrmError::configuration(format!(
                "table '{}' already exists in schema '{}'",
                table.name, self.name
            )));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Append tables in order, stopping at the first duplicate
    pub fn add_tables<I>(&mut self, tables: I) -> OrmResult<()>
    where
        I: IntoIterator<Item = Table>,
    {
        for table in tables {
            self.add_table(table)?;
        }
        Ok(())
    }

    /// Replace the stored table with the same name
    pub fn replace_table(&mut self, table: Table) -> OrmResult<()> {
        match self.tables.iter_mut().find(|existing| existing.name == table.name) {
            Some(existing) => {
                *existing = table;
                Ok(())
            }
            None => Err(OrmError::configuration(format!(
                "cannot replace table '{}': not found in schema '{}'",
                table.name, self.name
            ))),
        }
    }

    /// Remove a table and return it
    pub fn drop_table(&mut self, name: &str) -> OrmResult<Table> {
        match self.position(name) {
            Some(i) => Ok(self.tables.remove(i)),
            None => Err(OrmError::configuration(format!(
                "cannot drop table '{}': not found in schema '{}'",
                name, self.name
            ))),
        }
    }

    /// Rename a stored table
    ///
    /// `new_name` is normalized with [`to_table_name`] and must not resolve to
    /// another stored table. Fails without touching any table when `old_name`
    /// is missing or the target is taken.
    pub fn rename_table(&mut self, old_name: &str, new_name: &str) -> OrmResult<()> {
        let index = self.position(old_name).ok_or_else(|| {
            OrmError::configuration(format!(
                "cannot rename '{}': not found in schema '{}'",
                old_name, self.name
            ))
        })?;

        let target = to_table_name(new_name);
        match self.position(new_name).or_else(|| self.position(&target)) {
            Some(existing) if existing != index => {
                return Err(OrmError::configuration(format!(
                    "cannot rename '{}' to '{}': table '{}' already exists",
                    old_name, target, self.tables[existing].name
                )));
            }
            _ => {}
        }

        self.tables[index].name = target;
        Ok(())
    }

    /// Give tables without a charset or collation the schema's
    pub fn apply_defaults(&mut self) {
        for table in self.tables.iter_mut() {
            if table.charset.is_none() {
                table.charset = self.charset.clone();
            }
            if table.collation.is_none() {
                table.collation = self.collation.clone();
            }
        }
    }

    /// Report every pair of tables sharing a name
    pub fn validate(&self) -> OrmResult<()> {
        let mut errors = Vec::new();

        for (i, left) in self.tables.iter().enumerate() {
            for (j, right) in self.tables.iter().enumerate().skip(i + 1) {
                if left.name == right.name {
                    errors.push(format!(
                        "duplicate table name '{}' at positions {} and {}",
                        left.name, i, j
                    ));
                }
            }
        }

        collect_errors(&self.name, errors)
    }

    /// Check that every foreign key targets an existing table and column
    ///
    /// Not part of [`Schema::validate`]; call it once all tables are added.
    pub fn validate_references(&self) -> OrmResult<()> {
        let mut errors = Vec::new();

        for table in &self.tables {
            for foreign_key in table.all_foreign_keys() {
                if !table.has_column(&foreign_key.column) {
                    errors.push(format!(
                        "{}.{}: foreign key column does not exist",
                        table.name, foreign_key.column
                    ));
                }

                match self.tables.iter().find(|t| t.name == foreign_key.table) {
                    None => errors.push(format!(
                        "{}.{}: referenced table '{}' does not exist",
                        table.name, foreign_key.column, foreign_key.table
                    )),
                    Some(target) if !target.has_column(&foreign_key.references) => {
                        errors.push(format!(
                            "{}.{}: referenced column '{}.{}' does not exist",
                            table.name, foreign_key.column, foreign_key.table, foreign_key.references
                        ))
                    }
                    Some(_) => {}
                }
            }
        }

        collect_errors(&self.name, errors)
    }

    /// Table names in sorted order
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.iter().map(|table| table.name.clone()).collect();
        names.sort();
        names
    }

    /// DDL for every table, in declaration order
    pub fn to_create_sql(&self, dialect: Dialect) -> OrmResult<Vec<String>> {
        let mut statements = Vec::new();
        for table in &self.tables {
            statements.extend(table.to_create_sql(dialect)?);
        }
        Ok(statements)
    }
}

fn collect_errors(schema: &str, errors: Vec<String>) -> OrmResult<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(OrmError::configuration(format!(
            "schema '{}' is invalid: {}",
            schema,
            errors.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::{big_increments, big_int, string};

    fn table(name: &str) -> Table {
        Table::new(name, [big_increments(()), string("name", ())])
    }

    #[test]
    fn test_add_table_rejects_duplicates() {
        let mut schema = Schema::new("app");
        schema.add_table(table("user")).unwrap();
        let err = schema.add_table(table("user")).unwrap_err();
        assert!(matches!(err, OrmError::Configuration(_)));
        assert_eq!(schema.tables.len(), 1);
    }

    #[test]
    fn test_add_tables_stops_at_first_duplicate() {
        let mut schema = Schema::new("app");
        let result = schema.add_tables([table("user"), table("post"), table("user"), table("tag")]);
        assert!(result.is_err());
        assert_eq!(schema.table_names(), vec!["posts", "users"]);
    }

    #[test]
    fn test_lookup_accepts_model_names() {
        let mut schema = Schema::new("app");
        schema.add_table(table("UserProfile")).unwrap();
        assert!(schema.has_table("user_profiles"));
        assert!(schema.has_table("UserProfile"));
        assert!(!schema.has_table("profiles"));
    }

    #[test]
    fn test_replace_table() {
        let mut schema = Schema::new("app");
        schema.add_table(table("user")).unwrap();

        let replacement = Table::new("user", [big_increments(())]);
        schema.replace_table(replacement).unwrap();
        assert_eq!(schema.table("users").unwrap().columns.len(), 1);

        assert!(schema.replace_table(table("ghost")).is_err());
    }

    #[test]
    fn test_drop_table() {
        let mut schema = Schema::new("app");
        schema.add_tables([table("user"), table("post")]).unwrap();
        let dropped = schema.drop_table("post").unwrap();
        assert_eq!(dropped.name, "posts");
        assert!(!schema.has_table("posts"));
        assert!(schema.drop_table("post").is_err());
    }

    #[test]
    fn test_rename_table_mutates_stored_table() {
        let mut schema = Schema::new("app");
        schema.add_table(table("user")).unwrap();
        schema.rename_table("users", "Members").unwrap();
        assert_eq!(schema.table_names(), vec!["members"]);
    }

    #[test]
    fn test_rename_to_existing_name_changes_nothing() {
        let mut schema = Schema::new("app");
        schema.add_tables([table("user"), table("post")]).unwrap();
        let before = schema.clone();

        assert!(schema.rename_table("users", "posts").is_err());
        assert!(schema.rename_table("ghosts", "spirits").is_err());
        assert_eq!(schema, before);
    }

    #[test]
    fn test_rename_target_is_normalized() {
        let mut schema = Schema::new("app");
        schema.add_tables([table("user"), table("post")]).unwrap();
        let before = schema.clone();

        assert!(schema.rename_table("users", "post").is_err());
        assert!(schema.rename_table("users", "Post").is_err());
        assert_eq!(schema, before);

        schema.rename_table("user", "Member").unwrap();
        assert_eq!(schema.table_names(), vec!["members", "posts"]);

        schema.rename_table("members", "member").unwrap();
        assert_eq!(schema.table_names(), vec!["members", "posts"]);
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_seeds_table_defaults() {
        std::env::set_var("DB_CHARSET", "latin1");
        std::env::set_var("DB_COLLATION", "latin1_swedish_ci");
        let mut schema = Schema::from_env("app");
        std::env::set_var("DB_COLLATION", "");
        let without_collation = Schema::from_env("app");
        std::env::remove_var("DB_CHARSET");
        std::env::remove_var("DB_COLLATION");

        assert_eq!(without_collation.charset.as_deref(), Some("latin1"));
        assert_eq!(without_collation.collation, None);

        schema.add_table(table("user")).unwrap();
        schema.apply_defaults();
        let users = schema.table("users").unwrap();
        assert_eq!(users.charset.as_deref(), Some("latin1"));
        assert_eq!(users.collation.as_deref(), Some("latin1_swedish_ci"));
    }

    #[test]
    fn test_apply_defaults_persists() {
        let mut schema = Schema::new("app").with_charset("utf8mb4").with_collation("utf8mb4_unicode_ci");
        let mut explicit = table("post");
        explicit.charset("latin1");
        schema.add_tables([table("user"), explicit]).unwrap();

        schema.apply_defaults();

        let users = schema.table("users").unwrap();
        assert_eq!(users.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(users.collation.as_deref(), Some("utf8mb4_unicode_ci"));
        let posts = schema.table("posts").unwrap();
        assert_eq!(posts.charset.as_deref(), Some("latin1"));
        assert_eq!(posts.collation.as_deref(), Some("utf8mb4_unicode_ci"));
    }

    #[test]
    fn test_validate_reports_every_duplicate_pair() {
        let mut schema = Schema::new("app");
        schema.tables = vec![table("user"), table("user"), table("user"), table("post")];

        let err = schema.validate().unwrap_err().to_string();
        assert!(err.contains("positions 0 and 1"));
        assert!(err.contains("positions 0 and 2"));
        assert!(err.contains("positions 1 and 2"));
        assert!(!err.contains("posts"));
    }

    #[test]
    fn test_validate_passes_for_unique_names() {
        let mut schema = Schema::new("app");
        schema.add_tables([table("user"), table("post")]).unwrap();
        assert!(schema.validate().is_ok());
    }

    #[test]
    fn test_validate_references() {
        let mut posts = Table::new("post", [big_increments(()), big_int("user_id", ()), big_int("category_id", ())]);
        posts.foreign("user_id", Vec::<&str>::new());
        posts.foreign("category_id", Vec::<&str>::new());

        let mut schema = Schema::new("app");
        schema.add_tables([table("user"), posts]).unwrap();
        assert!(schema.validate().is_ok());

        let err = schema.validate_references().unwrap_err().to_string();
        assert!(err.contains("referenced table 'categories' does not exist"));
        assert!(!err.contains("users"));

        schema.add_table(table("category")).unwrap();
        assert!(schema.validate_references().is_ok());
    }
}
