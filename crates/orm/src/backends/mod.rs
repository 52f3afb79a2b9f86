//! Database Backend Abstractions
//!
//! One `DatabasePool` implementation per supported store, plus an in-memory
//! pool for running models without a server.

pub mod core;
pub mod memory;
pub mod mysql;
pub mod postgres;

#[cfg(feature = "mongodb")]
pub mod mongodb;

// Re-export core traits and types
pub use self::core::*;
pub use memory::{MemoryPool, MemoryRow};
pub use mysql::MySqlPool;
pub use postgres::PostgresPool;

#[cfg(feature = "mongodb")]
pub use self::mongodb::MongoPool;
