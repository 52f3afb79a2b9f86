//! Database handle
//!
//! Opens the single connection pool the application shares and hands it out
//! as `Arc<dyn DatabasePool>`.

use std::sync::Arc;

use crate::backends::{DatabasePool, MySqlPool, PostgresPool};
use crate::config::DatabaseConfig;
use crate::dialect::Dialect;
use crate::error::OrmResult;

/// The shared database connection
#[derive(Clone)]
pub struct Database {
    pool: Arc<dyn DatabasePool>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.pool.dialect())
            .finish()
    }
}

impl Database {
    /// Open the pool for the configured driver and ping it once
    pub async fn connect(config: &DatabaseConfig) -> OrmResult<Self> {
        let url = config.connection_url()?;

        let pool: Arc<dyn DatabasePool> = match config.driver {
            Dialect::MySql => Arc::new(MySqlPool::connect(&url, &config.pool).await?),
            Dialect::PostgreSql => Arc::new(PostgresPool::connect(&url, &config.pool).await?),
            Dialect::MongoDb => connect_mongodb(&url, &config.database).await?,
        };

        let latency = pool.health_check().await.map_err(|e| {
            tracing::error!(driver = %config.driver, error = %e, "database health check failed");
            e
        })?;

        tracing::info!(
            driver = %config.driver,
            host = %config.host,
            database = %config.database,
            max_connections = config.pool.max_connections,
            latency_ms = latency.as_millis() as u64,
            "database connection established"
        );

        Ok(Self { pool })
    }

    /// Wrap an already opened pool
    pub fn from_pool(pool: Arc<dyn DatabasePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> Arc<dyn DatabasePool> {
        Arc::clone(&self.pool)
    }

    pub fn dialect(&self) -> Dialect {
        self.pool.dialect()
    }

    pub async fn close(&self) -> OrmResult<()> {
        self.pool.close().await?;
        tracing::info!(driver = %self.pool.dialect(), "database connection closed");
        Ok(())
    }
}

#[cfg(feature = "mongodb")]
async fn connect_mongodb(uri: &str, database: &str) -> OrmResult<Arc<dyn DatabasePool>> {
    let pool = crate::backends::MongoPool::connect(uri, database).await?;
    Ok(Arc::new(pool))
}

#[cfg(not(feature = "mongodb"))]
async fn connect_mongodb(_uri: &str, _database: &str) -> OrmResult<Arc<dyn DatabasePool>> {
    Err(crate::error::OrmError::configuration(
        "the mongodb driver requires the `mongodb` cargo feature",
    ))
}
