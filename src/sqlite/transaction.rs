use deadpool_sqlite::Object;

use crate::error::RowDocError;
use crate::pool::MiddlewarePoolConnection;
use crate::query::{QueryBuilder, QueryTarget};

use super::executor::execute_batch;

/// Transaction handle that owns the `SQLite` connection until completion.
///
/// Dropping an open transaction rolls it back, on a spawned task when a tokio runtime
/// is running and inline otherwise.
pub struct Tx {
    conn: Option<Object>,
    translate_placeholders: bool,
}

/// Begin a transaction, consuming the `SQLite` connection until commit/rollback.
///
/// # Errors
/// Returns `RowDocError::Unimplemented` for a non-SQLite connection, or the driver
/// error if `BEGIN` fails.
pub async fn begin_transaction(conn: MiddlewarePoolConnection) -> Result<Tx, RowDocError> {
    let (conn, translate_placeholders) = conn.into_sqlite()?;
    execute_batch(&conn, "BEGIN").await?;
    Ok(Tx {
        conn: Some(conn),
        translate_placeholders,
    })
}

impl Tx {
    fn conn(&self) -> Result<&Object, RowDocError> {
        self.conn.as_ref().ok_or_else(|| {
            RowDocError::ExecutionError("SQLite transaction already completed".into())
        })
    }

    /// Start a query that runs inside this transaction.
    ///
    /// # Errors
    /// Returns `RowDocError::ExecutionError` if the transaction has already completed.
    pub fn query<'tx>(&'tx self, sql: &'tx str) -> Result<QueryBuilder<'tx>, RowDocError> {
        let conn = self.conn()?;
        Ok(QueryBuilder::new(
            QueryTarget::Sqlite {
                conn,
                translate_placeholders: self.translate_placeholders,
            },
            sql,
        ))
    }

    /// Execute a batch inside the open transaction.
    ///
    /// # Errors
    /// Returns `RowDocError` if executing the batch fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), RowDocError> {
        execute_batch(self.conn()?, sql).await
    }

    /// Commit the transaction and hand the connection back.
    ///
    /// # Errors
    /// Returns `RowDocError` if committing the transaction fails.
    pub async fn commit(mut self) -> Result<MiddlewarePoolConnection, RowDocError> {
        self.finish("COMMIT").await
    }

    /// Roll back the transaction and hand the connection back.
    ///
    /// # Errors
    /// Returns `RowDocError` if rolling back fails.
    pub async fn rollback(mut self) -> Result<MiddlewarePoolConnection, RowDocError> {
        self.finish("ROLLBACK").await
    }

    async fn finish(&mut self, statement: &str) -> Result<MiddlewarePoolConnection, RowDocError> {
        let conn = self.conn.take().ok_or_else(|| {
            RowDocError::ExecutionError("SQLite transaction already completed".into())
        })?;
        if let Err(err) = execute_batch(&conn, statement).await {
            // still open; Drop rolls it back
            self.conn = Some(conn);
            return Err(err);
        }
        Ok(MiddlewarePoolConnection::Sqlite {
            conn,
            translate_placeholders: self.translate_placeholders,
        })
    }
}

impl Drop for Tx {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!("sqlite transaction dropped while open; rolling back");
                handle.spawn(async move {
                    if let Err(err) = execute_batch(&conn, "ROLLBACK").await {
                        tracing::warn!(error = %err, "background rollback failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(
                    "sqlite transaction dropped outside a tokio runtime; rolling back inline"
                );
                let rolled_back = match conn.lock() {
                    Ok(guard) => guard.execute_batch("ROLLBACK").map_err(|e| e.to_string()),
                    Err(poisoned) => Err(poisoned.to_string()),
                };
                if let Err(error) = rolled_back {
                    tracing::warn!(%error, "inline rollback failed");
                }
            }
        }
    }
}
