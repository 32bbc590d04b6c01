use std::time::Duration;

use deadpool_sqlite::Object;
use rusqlite::Connection;

use crate::convert::{ConverterSet, ObjectNode};
use crate::error::RowDocError;
use crate::query::{Request, SingleRowMode};
use crate::results::{DbRow, ResultSet};
use crate::types::CommandType;

use super::params::bind_params;
use super::query::{build_nodes, build_result_set, build_single_row, column_names};

/// rusqlite's busy timeout for a freshly opened connection.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Execute a batch of SQL statements for `SQLite` without parameters.
///
/// # Errors
/// Returns `RowDocError::SqliteError` if any statement fails.
pub async fn execute_batch(conn: &Object, query: &str) -> Result<(), RowDocError> {
    let query_owned = query.to_owned();
    conn.interact(move |conn| conn.execute_batch(&query_owned))
        .await??;
    Ok(())
}

/// Run a SELECT and materialize every row.
///
/// # Errors
/// Returns parameter, driver or timeout errors.
pub(crate) async fn fetch_rows(conn: &Object, request: Request) -> Result<ResultSet, RowDocError> {
    ensure_text_command(&request)?;
    let Request {
        sql,
        params,
        timeout,
        ..
    } = request;
    run(conn, timeout, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        bind_params(&mut stmt, &params)?;
        let columns = column_names(&stmt);
        build_result_set(stmt.raw_query(), columns)
    })
    .await
}

/// Run a SELECT and convert each row as it is stepped.
///
/// # Errors
/// Returns parameter, driver, timeout or conversion errors.
pub(crate) async fn fetch_nodes(
    conn: &Object,
    request: Request,
    converters: ConverterSet,
) -> Result<Vec<ObjectNode>, RowDocError> {
    ensure_text_command(&request)?;
    let Request {
        sql,
        params,
        timeout,
        ..
    } = request;
    run(conn, timeout, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        bind_params(&mut stmt, &params)?;
        let columns = column_names(&stmt);
        build_nodes(stmt.raw_query(), &columns, &converters)
    })
    .await
}

/// Run a SELECT expected to return one row.
///
/// # Errors
/// Returns `RowDocError::RowNotFound` / `RowDocError::MultipleRowsFound` on a
/// cardinality mismatch, otherwise parameter, driver or timeout errors.
pub(crate) async fn fetch_single(
    conn: &Object,
    request: Request,
    mode: SingleRowMode,
) -> Result<DbRow, RowDocError> {
    ensure_text_command(&request)?;
    let Request {
        sql,
        params,
        timeout,
        ..
    } = request;
    run(conn, timeout, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        bind_params(&mut stmt, &params)?;
        let columns = column_names(&stmt);
        build_single_row(stmt.raw_query(), columns, mode)
    })
    .await
}

/// Execute a DML query (INSERT, UPDATE, DELETE) and return the affected row count.
///
/// # Errors
/// Returns parameter, driver or timeout errors.
pub(crate) async fn execute_dml(conn: &Object, request: Request) -> Result<usize, RowDocError> {
    ensure_text_command(&request)?;
    let Request {
        sql,
        params,
        timeout,
        ..
    } = request;
    run(conn, timeout, move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        bind_params(&mut stmt, &params)?;
        Ok(stmt.raw_execute()?)
    })
    .await
}

fn ensure_text_command(request: &Request) -> Result<(), RowDocError> {
    match request.command_type {
        CommandType::Text => Ok(()),
        CommandType::StoredProcedure => Err(RowDocError::Unimplemented(format!(
            "SQLite has no stored procedures (asked to call '{}')",
            request.sql
        ))),
    }
}

/// Run `work` on the pooled connection's blocking thread.
///
/// With a timeout, the connection's busy timeout follows the limit for the duration of
/// the call, and a statement still running at the deadline is interrupted.
async fn run<T, F>(conn: &Object, timeout: Option<Duration>, work: F) -> Result<T, RowDocError>
where
    T: Send + 'static,
    F: FnOnce(&mut Connection) -> Result<T, RowDocError> + Send + 'static,
{
    let Some(limit) = timeout else {
        return conn.interact(work).await?;
    };

    let interrupt = conn.interact(|conn| conn.get_interrupt_handle()).await?;
    let call = conn.interact(move |conn| {
        conn.busy_timeout(limit)?;
        let out = work(conn);
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        out
    });

    match tokio::time::timeout(limit, call).await {
        Ok(joined) => joined?,
        Err(_) => {
            interrupt.interrupt();
            tracing::warn!(timeout = ?limit, "sqlite query timed out; statement interrupted");
            Err(RowDocError::Timeout(limit))
        }
    }
}
