use deadpool_postgres::Transaction as PgTransaction;

use crate::error::RowDocError;
use crate::pool::MiddlewarePoolConnection;
use crate::query::{QueryBuilder, QueryTarget};

use super::executor::execute_batch;

/// Lightweight transaction wrapper for Postgres.
///
/// Dropping it without commit rolls back, as `tokio-postgres` does.
pub struct Tx<'a> {
    tx: PgTransaction<'a>,
    translate_placeholders: bool,
}

/// Begin a new transaction on the provided Postgres connection.
///
/// # Errors
/// Returns `RowDocError::Unimplemented` for a non-Postgres connection, or the driver
/// error if creating the transaction fails.
pub async fn begin_transaction(
    conn: &mut MiddlewarePoolConnection,
) -> Result<Tx<'_>, RowDocError> {
    let (client, translate_placeholders) = conn.as_postgres_mut()?;
    let tx = client.transaction().await?;
    Ok(Tx {
        tx,
        translate_placeholders,
    })
}

impl Tx<'_> {
    /// Start a query that runs inside this transaction.
    #[must_use]
    pub fn query<'q>(&'q self, sql: &'q str) -> QueryBuilder<'q> {
        QueryBuilder::new(
            QueryTarget::PostgresTx {
                tx: &self.tx,
                translate_placeholders: self.translate_placeholders,
            },
            sql,
        )
    }

    /// Execute a batch of SQL statements inside the transaction.
    ///
    /// # Errors
    /// Returns an error if execution fails.
    pub async fn execute_batch(&self, sql: &str) -> Result<(), RowDocError> {
        execute_batch(&*self.tx, sql).await
    }

    /// Commit the transaction.
    ///
    /// # Errors
    /// Returns an error if commit fails.
    pub async fn commit(self) -> Result<(), RowDocError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Roll back the transaction.
    ///
    /// # Errors
    /// Returns an error if rollback fails.
    pub async fn rollback(self) -> Result<(), RowDocError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
