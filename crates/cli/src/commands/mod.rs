pub mod find;
pub mod schema;
