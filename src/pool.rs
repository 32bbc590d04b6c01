//! Pool configuration and pooled connections.

mod connection;
mod types;

pub use connection::MiddlewarePoolConnection;
pub use types::MiddlewarePool;

use crate::error::RowDocError;
use crate::types::DatabaseType;

/// Configuration and connection pool for a database
///
/// This struct holds both the configuration and the connection pool
/// for a database, making it easier to manage database connections.
#[derive(Clone, Debug)]
pub struct ConfigAndPool {
    /// The connection pool
    pub pool: MiddlewarePool,
    /// The database type
    pub db_type: DatabaseType,
    /// Whether placeholder translation is enabled by default
    pub translate_placeholders: bool,
}

impl ConfigAndPool {
    /// Check a connection out of the pool.
    ///
    /// # Errors
    /// Returns the pool error if no connection can be obtained.
    pub async fn get_connection(&self) -> Result<MiddlewarePoolConnection, RowDocError> {
        MiddlewarePool::get_connection(&self.pool, self.translate_placeholders).await
    }
}
