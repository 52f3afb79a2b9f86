//! Table descriptors

use std::collections::BTreeMap;

use crate::naming::{to_snake_case, to_table_name};
use crate::schema::column::Column;
use crate::schema::foreign_key::{foreign, ForeignKey};

/// Secondary index over one or more columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    /// Index named `idx_<table>_<columns>` unless `name` is given
    pub fn new(table: &str, columns: &[&str], unique: bool, name: Option<&str>) -> Self {
        let columns: Vec<String> = columns.iter().map(|c| to_snake_case(c)).collect();
        let name = match name {
            Some(name) => name.to_string(),
            None => format!("idx_{}_{}", table, columns.join("_")),
        };
        Self { name, columns, unique }
    }
}

/// Table descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<Index>,
    /// Free-form table-level constraints keyed by name
    pub constraints: BTreeMap<String, String>,
    pub engine: Option<String>,
    pub charset: Option<String>,
    pub collation: Option<String>,
    pub auto_increment_start: Option<u64>,
    pub temporary: bool,
    pub comment: Option<String>,
}

impl Table {
    /// Build a table from its columns
    ///
    /// The name is snake_cased and pluralized (`"UserProfile"` becomes
    /// `user_profiles`). `None` entries are skipped, which lets callers
    /// include columns conditionally.
    pub fn new<I, C>(name: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Option<Column>>,
    {
        let columns: Vec<Column> = columns.into_iter().filter_map(Into::into).collect();
        let primary_keys = columns
            .iter()
            .filter(|column| column.primary_key)
            .map(|column| column.name.clone())
            .collect();

        Self {
            name: to_table_name(name),
            columns,
            primary_keys,
            foreign_keys: Vec::new(),
            indexes: Vec::new(),
            constraints: BTreeMap::new(),
            engine: None,
            charset: None,
            collation: None,
            auto_increment_start: None,
            temporary: false,
            comment: None,
        }
    }

    /// Declare a foreign key on `column`, see [`foreign`]
    ///
    /// A key already declared for the same column is replaced.
    pub fn foreign<I, S>(&mut self, column: &str, options: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_foreign_key(foreign(column, options))
    }

    pub fn add_foreign_key(&mut self, foreign_key: ForeignKey) -> &mut Self {
        match self
            .foreign_keys
            .iter_mut()
            .find(|existing| existing.column == foreign_key.column)
        {
            Some(existing) => *existing = foreign_key,
            None => self.foreign_keys.push(foreign_key),
        }
        self
    }

    pub fn index(&mut self, columns: &[&str], unique: bool, name: Option<&str>) -> &mut Self {
        let index = Index::new(&self.name, columns, unique, name);
        self.indexes.push(index);
        self
    }

    /// Replace the primary key with a (possibly composite) set of columns
    pub fn primary_key(&mut self, columns: &[&str]) -> &mut Self {
        self.primary_keys = columns.iter().map(|c| to_snake_case(c)).collect();
        for column in &mut self.columns {
            column.primary_key = self.primary_keys.contains(&column.name);
        }
        self
    }

    pub fn constraint(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.constraints.insert(key.into(), value.into());
        self
    }

    pub fn engine(&mut self, engine: impl Into<String>) -> &mut Self {
        self.engine = Some(engine.into());
        self
    }

    pub fn charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = Some(charset.into());
        self
    }

    pub fn collation(&mut self, collation: impl Into<String>) -> &mut Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn comment(&mut self, comment: impl Into<String>) -> &mut Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn auto_increment_start(&mut self, start: u64) -> &mut Self {
        self.auto_increment_start = Some(start);
        self
    }

    pub fn temporary(&mut self) -> &mut Self {
        self.temporary = true;
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    /// Column used for single-key lookups: the sole primary key, else `id`
    pub fn key_column(&self) -> &str {
        match self.primary_keys.as_slice() {
            [single] => single.as_str(),
            _ => "id",
        }
    }

    /// Table-level keys followed by column-level ones
    pub fn all_foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys
            .iter()
            .chain(self.columns.iter().filter_map(|column| column.foreign_key.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::{big_increments, big_int, created_at, deleted_at, string, updated_at};
    use crate::schema::foreign_key::ReferentialAction;

    fn users() -> Table {
        Table::new(
            "user",
            [
                big_increments(()),
                string("name", ()),
                string("email", ["unique"]),
                string("password", ()),
                created_at(()),
                updated_at(()),
                deleted_at(()),
            ],
        )
    }

    #[test]
    fn test_new_table_collects_primary_key() {
        let table = users();
        assert_eq!(table.name, "users");
        assert_eq!(table.primary_keys, vec!["id".to_string()]);
        let id = table.column("id").unwrap();
        assert!(id.auto_increment);
        assert_eq!(table.key_column(), "id");
    }

    #[test]
    fn test_new_table_skips_none_columns() {
        let with_soft_deletes = false;
        let table = Table::new(
            "Post",
            [
                Some(big_increments(())),
                Some(string("title", ())),
                with_soft_deletes.then(|| deleted_at(())),
            ],
        );
        assert_eq!(table.name, "posts");
        assert_eq!(table.column_names(), vec!["id", "title"]);
    }

    #[test]
    fn test_foreign_mutates_in_place() {
        let mut table = Table::new("post", [big_increments(()), big_int("user_id", ())]);
        table.foreign("user_id", Vec::<&str>::new());

        assert_eq!(table.foreign_keys.len(), 1);
        assert_eq!(table.foreign_keys[0].table, "users");
        assert_eq!(table.foreign_keys[0].references, "id");

        table.foreign("user_id", ["ondelete:cascade"]);
        assert_eq!(table.foreign_keys.len(), 1);
        assert_eq!(table.foreign_keys[0].on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn test_composite_primary_key() {
        let mut table = Table::new("role_user", [big_int("role_id", ()), big_int("user_id", ())]);
        table.primary_key(&["role_id", "user_id"]);
        assert_eq!(table.primary_keys.len(), 2);
        assert!(table.columns.iter().all(|c| c.primary_key));
        assert_eq!(table.key_column(), "id");
    }

    #[test]
    fn test_index_naming() {
        let mut table = users();
        table.index(&["name", "email"], false, None);
        table.index(&["password"], true, Some("uq_pw"));
        assert_eq!(table.indexes[0].name, "idx_users_name_email");
        assert!(table.indexes[1].unique);
        assert_eq!(table.indexes[1].name, "uq_pw");
    }

    #[test]
    fn test_all_foreign_keys_includes_column_level() {
        let mut table = Table::new(
            "comment",
            [big_increments(()), big_int("post_id", ["fk:posts(id)"]), big_int("author_id", ())],
        );
        table.foreign("author_id", ["on:users"]);
        let targets: Vec<_> = table.all_foreign_keys().map(|fk| fk.table.as_str()).collect();
        assert_eq!(targets, vec!["users", "posts"]);
    }
}
