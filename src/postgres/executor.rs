use std::future::Future;
use std::time::Duration;

use tokio_postgres::{CancelToken, Client, GenericClient, NoTls, Statement, Transaction};

use crate::convert::{ConverterSet, ObjectNode};
use crate::error::RowDocError;
use crate::query::{Request, SingleRowMode};
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

use super::params::{PreparedCall, prepare_call};
use super::query::{build_nodes, build_result_set, build_single_row, column_names};

/// A client or open transaction the executor can run statements on.
pub trait PgSession: GenericClient + Sync {
    fn cancel_token(&self) -> CancelToken;
}

impl PgSession for Client {
    fn cancel_token(&self) -> CancelToken {
        Client::cancel_token(self)
    }
}

impl PgSession for Transaction<'_> {
    fn cancel_token(&self) -> CancelToken {
        Transaction::cancel_token(self)
    }
}

/// Execute a batch of SQL statements for Postgres
///
/// # Errors
/// Returns the driver error if any statement fails.
pub async fn execute_batch<C: PgSession>(client: &C, query: &str) -> Result<(), RowDocError> {
    client.batch_execute(query).await?;
    Ok(())
}

/// Run a SELECT and materialize every row.
///
/// # Errors
/// Returns parameter, driver or timeout errors.
pub(crate) async fn fetch_rows<C: PgSession>(
    client: &C,
    request: Request,
) -> Result<ResultSet, RowDocError> {
    let timeout = request.timeout;
    let call = into_call(request)?;
    with_timeout(client, timeout, async {
        let stmt = prepare_checked(client, &call).await?;
        let rows = client.query_raw(&stmt, call.values.iter()).await?;
        build_result_set(column_names(&stmt), rows).await
    })
    .await
}

/// Run a SELECT and convert each row as it arrives.
///
/// # Errors
/// Returns parameter, driver, timeout or conversion errors.
pub(crate) async fn fetch_nodes<C: PgSession>(
    client: &C,
    request: Request,
    converters: ConverterSet,
) -> Result<Vec<ObjectNode>, RowDocError> {
    let timeout = request.timeout;
    let call = into_call(request)?;
    with_timeout(client, timeout, async {
        let stmt = prepare_checked(client, &call).await?;
        let rows = client.query_raw(&stmt, call.values.iter()).await?;
        build_nodes(&column_names(&stmt), rows, &converters).await
    })
    .await
}

/// Run a SELECT expected to return one row.
///
/// # Errors
/// Returns cardinality, parameter, driver or timeout errors.
pub(crate) async fn fetch_single<C: PgSession>(
    client: &C,
    request: Request,
    mode: SingleRowMode,
) -> Result<DbRow, RowDocError> {
    let timeout = request.timeout;
    let call = into_call(request)?;
    with_timeout(client, timeout, async {
        let stmt = prepare_checked(client, &call).await?;
        let rows = client.query_raw(&stmt, call.values.iter()).await?;
        build_single_row(column_names(&stmt), rows, mode).await
    })
    .await
}

/// Execute a DML query (INSERT, UPDATE, DELETE) and return the affected row count.
///
/// # Errors
/// Returns parameter, driver or timeout errors.
pub(crate) async fn execute_dml<C: PgSession>(
    client: &C,
    request: Request,
) -> Result<usize, RowDocError> {
    let timeout = request.timeout;
    let call = into_call(request)?;
    with_timeout(client, timeout, async {
        let stmt = prepare_checked(client, &call).await?;
        let rows = client.execute_raw(&stmt, call.values.iter()).await?;
        usize::try_from(rows).map_err(|e| {
            RowDocError::ExecutionError(format!("Invalid rows affected count: {e}"))
        })
    })
    .await
}

fn into_call(request: Request) -> Result<PreparedCall, RowDocError> {
    prepare_call(&request.sql, request.params, request.command_type)
}

async fn prepare_checked<C: PgSession>(
    client: &C,
    call: &PreparedCall,
) -> Result<Statement, RowDocError> {
    let stmt = client.prepare(&call.sql).await?;
    check_arity(stmt.params().len(), &call.values)?;
    Ok(stmt)
}

fn check_arity(expected: usize, values: &[RowValues]) -> Result<(), RowDocError> {
    if expected == values.len() {
        Ok(())
    } else {
        Err(RowDocError::ParameterError(format!(
            "statement expects {expected} parameter(s), got {}",
            values.len()
        )))
    }
}

/// Await `work`, sending a cancel request to the server if `timeout` passes first.
async fn with_timeout<C, T, F>(
    client: &C,
    timeout: Option<Duration>,
    work: F,
) -> Result<T, RowDocError>
where
    C: PgSession,
    F: Future<Output = Result<T, RowDocError>>,
{
    let Some(limit) = timeout else {
        return work.await;
    };
    let token = client.cancel_token();
    match tokio::time::timeout(limit, work).await {
        Ok(out) => out,
        Err(_) => {
            tracing::warn!(timeout = ?limit, "postgres query timed out; cancelling");
            if let Err(err) = token.cancel_query(NoTls).await {
                tracing::warn!(error = %err, "postgres cancel request failed");
            }
            Err(RowDocError::Timeout(limit))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_mismatch_is_a_parameter_error() {
        assert!(check_arity(1, &[RowValues::Int(1)]).is_ok());
        assert!(matches!(
            check_arity(2, &[RowValues::Int(1)]),
            Err(RowDocError::ParameterError(_))
        ));
    }
}
