//! Demo schema used by the `schema` and `find` commands

use tessera_orm::schema::column::{
    big_increments, big_int, boolean, created_at, deleted_at, enumeration, integer, string, text,
    updated_at,
};
use tessera_orm::{OrmResult, Schema, SchemaRegistry, Table, TableBuilder};

pub fn create_users_table() -> Table {
    Table::new(
        "user",
        [
            big_increments(()),
            string("name", ["100", "not_null"]),
            string("email", ["not_null", "unique"]),
            boolean("is_admin", ["not_null", "default:false"]),
            created_at(()),
            updated_at(()),
        ],
    )
}

pub fn create_categories_table() -> Table {
    let mut table = Table::new(
        "category",
        [
            big_increments(()),
            string("name", ["60", "not_null", "unique"]),
            big_int("parent_id", ()),
        ],
    );
    table.foreign("parent_id", ["id", "categories", "set_null", "cascade"]);
    table
}

pub fn create_posts_table() -> Table {
    let mut table = Table::new(
        "post",
        [
            big_increments(()),
            big_int("user_id", ["not_null", "index"]),
            big_int("category_id", ()),
            string("title", ["not_null"]),
            text("body", ()),
            enumeration("status", &["draft", "published"], ["default:draft"]),
            integer("views", ["not_null", "default:0"]),
            created_at(()),
            updated_at(()),
            deleted_at(()),
        ],
    );
    table
        .foreign("user_id", ["ondelete:cascade"])
        .foreign("category_id", ["ondelete:set_null"])
        .comment("Blog posts");
    table
}

pub fn create_comments_table() -> Table {
    let mut table = Table::new(
        "comment",
        [
            big_increments(()),
            big_int("post_id", ["not_null"]),
            big_int("user_id", ["not_null"]),
            text("body", ["not_null"]),
            created_at(()),
        ],
    );
    table
        .foreign("post_id", ["ondelete:cascade"])
        .foreign("user_id", ["ondelete:cascade"]);
    table
}

pub const MIGRATIONS: [TableBuilder; 4] = [
    create_users_table,
    create_categories_table,
    create_posts_table,
    create_comments_table,
];

pub const SCHEMA_NAME: &str = "blog";

/// Build the demo schema with `DB_CHARSET`/`DB_COLLATION` as table defaults
pub fn bootstrap() -> OrmResult<SchemaRegistry> {
    bootstrap_into(Schema::from_env(SCHEMA_NAME))
}

/// Build, validate and register the demo tables inside `schema`
pub fn bootstrap_into(schema: Schema) -> OrmResult<SchemaRegistry> {
    let registry = SchemaRegistry::bootstrap(schema, MIGRATIONS)?;
    if let Some(schema) = registry.schema() {
        schema.validate_references()?;
    }
    Ok(registry)
}
