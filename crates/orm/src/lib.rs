//! # tessera-orm
//!
//! Declarative schema building with per-dialect type translation, a schema
//! registry filled once at startup, and key lookups that hydrate either an
//! untyped [`Record`] or a struct bound through an explicit [`FieldMap`].
//!
//! ```
//! use tessera_orm::schema::column::{big_increments, big_int, string};
//! use tessera_orm::{Schema, SchemaRegistry, Table, TableBuilder};
//!
//! fn users() -> Table {
//!     Table::new("user", [big_increments(()), string("email", ["unique", "not_null"])])
//! }
//!
//! fn posts() -> Table {
//!     let mut posts = Table::new("post", [big_increments(()), big_int("user_id", ["not_null"])]);
//!     posts.foreign("user_id", ["ondelete:cascade"]);
//!     posts
//! }
//!
//! let registry = SchemaRegistry::bootstrap(Schema::new("app"), [users as TableBuilder, posts]).unwrap();
//! let posts = registry.get_table("post").unwrap();
//! assert_eq!(posts.foreign_keys[0].table, "users");
//! ```

pub mod backends;
pub mod config;
pub mod database;
pub mod dialect;
pub mod error;
pub mod model;
pub mod naming;
pub mod schema;

pub use backends::{DatabasePool, DatabaseRow, DatabaseValue, KeyLookup, MemoryPool};
pub use config::{DatabaseConfig, PoolConfig};
pub use database::Database;
pub use dialect::{ColumnType, ConstraintKind, Dialect};
pub use error::{ConversionWarning, ModelResult, OrmError, OrmResult};
pub use model::{
    FieldMap, FromDatabaseValue, Hydrate, Hydrated, LifecycleEvent, Model, ModelObserver,
    QueryState, Record,
};
pub use naming::{is_plural, pluralize, to_snake_case, to_table_name};
pub use schema::{
    foreign, Column, ColumnOption, ColumnOptions, ForeignKey, Index, ReferentialAction, Schema,
    SchemaRegistry, Table, TableBuilder,
};
