#[cfg(feature = "postgres")]
use deadpool_postgres::Object as PostgresObject;
#[cfg(feature = "sqlite")]
use deadpool_sqlite::Object as SqliteObject;

use super::types::MiddlewarePool;
use crate::error::RowDocError;
use crate::query::{QueryBuilder, QueryTarget};
use crate::types::DatabaseType;

/// A connection checked out of a [`MiddlewarePool`], returned to it on drop.
pub enum MiddlewarePoolConnection {
    #[cfg(feature = "postgres")]
    Postgres {
        client: PostgresObject,
        translate_placeholders: bool,
    },
    #[cfg(feature = "sqlite")]
    Sqlite {
        conn: SqliteObject,
        translate_placeholders: bool,
    },
}

impl std::fmt::Debug for MiddlewarePoolConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres {
                translate_placeholders,
                ..
            } => f
                .debug_struct("Postgres")
                .field("translate_placeholders", translate_placeholders)
                .finish_non_exhaustive(),
            #[cfg(feature = "sqlite")]
            Self::Sqlite {
                translate_placeholders,
                ..
            } => f
                .debug_struct("Sqlite")
                .field("translate_placeholders", translate_placeholders)
                .finish_non_exhaustive(),
        }
    }
}

impl MiddlewarePool {
    /// Get a connection from the pool
    ///
    /// # Errors
    /// Returns `RowDocError::PoolErrorPostgres` or `RowDocError::PoolErrorSqlite` if the
    /// pool fails to provide a connection.
    pub async fn get_connection(
        pool: &MiddlewarePool,
        translate_placeholders: bool,
    ) -> Result<MiddlewarePoolConnection, RowDocError> {
        match pool {
            #[cfg(feature = "postgres")]
            MiddlewarePool::Postgres(pool) => {
                let client: PostgresObject = pool.get().await?;
                Ok(MiddlewarePoolConnection::Postgres {
                    client,
                    translate_placeholders,
                })
            }
            #[cfg(feature = "sqlite")]
            MiddlewarePool::Sqlite(pool) => {
                let conn: SqliteObject = pool.get().await?;
                Ok(MiddlewarePoolConnection::Sqlite {
                    conn,
                    translate_placeholders,
                })
            }
        }
    }
}

impl MiddlewarePoolConnection {
    #[must_use]
    pub fn database_type(&self) -> DatabaseType {
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres { .. } => DatabaseType::Postgres,
            #[cfg(feature = "sqlite")]
            Self::Sqlite { .. } => DatabaseType::Sqlite,
        }
    }

    /// Start a query on this connection; pick an output with one of the builder's
    /// terminal methods.
    ///
    /// ```rust,no_run
    /// use sql_rowdoc::prelude::*;
    ///
    /// # async fn demo(conn: &MiddlewarePoolConnection) -> Result<(), RowDocError> {
    /// let json = conn
    ///     .query("SELECT Name FROM SimpleMonsters WHERE Habitat = @habitat")
    ///     .params(QueryParams::named().bind("habitat", "Monstropolis"))
    ///     .to_json_string()
    ///     .await?;
    /// # let _ = json;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn query<'a>(&'a self, sql: &'a str) -> QueryBuilder<'a> {
        let target = match self {
            #[cfg(feature = "postgres")]
            Self::Postgres {
                client,
                translate_placeholders,
            } => QueryTarget::Postgres {
                client,
                translate_placeholders: *translate_placeholders,
            },
            #[cfg(feature = "sqlite")]
            Self::Sqlite {
                conn,
                translate_placeholders,
            } => QueryTarget::Sqlite {
                conn,
                translate_placeholders: *translate_placeholders,
            },
        };
        QueryBuilder::new(target, sql)
    }

    /// Execute a batch of SQL statements without parameters.
    ///
    /// # Errors
    /// Returns the driver error if any statement fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), RowDocError> {
        tracing::debug!(backend = ?self.database_type(), "execute batch");
        match self {
            #[cfg(feature = "postgres")]
            Self::Postgres { client, .. } => {
                let client: &tokio_postgres::Client = client;
                crate::postgres::execute_batch(client, sql).await
            }
            #[cfg(feature = "sqlite")]
            Self::Sqlite { conn, .. } => crate::sqlite::execute_batch(conn, sql).await,
        }
    }

    #[cfg(feature = "sqlite")]
    pub(crate) fn into_sqlite(self) -> Result<(SqliteObject, bool), RowDocError> {
        match self {
            Self::Sqlite {
                conn,
                translate_placeholders,
            } => Ok((conn, translate_placeholders)),
            #[allow(unreachable_patterns)]
            _ => Err(RowDocError::Unimplemented(
                "SQLite transaction requested on a non-SQLite connection".into(),
            )),
        }
    }

    #[cfg(feature = "postgres")]
    pub(crate) fn as_postgres_mut(&mut self) -> Result<(&mut PostgresObject, bool), RowDocError> {
        match self {
            Self::Postgres {
                client,
                translate_placeholders,
            } => Ok((client, *translate_placeholders)),
            #[allow(unreachable_patterns)]
            _ => Err(RowDocError::Unimplemented(
                "Postgres transaction requested on a non-Postgres connection".into(),
            )),
        }
    }
}
