use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures_util::{TryStreamExt, pin_mut};
use serde_json::{Map, Value};
use tokio_postgres::types::Type;
use tokio_postgres::{Row, RowStream, Statement};

use crate::convert::{ConverterSet, ObjectNode, value_node};
use crate::error::RowDocError;
use crate::query::SingleRowMode;
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

/// Extracts a `RowValues` from a `tokio_postgres` Row at the given index.
///
/// # Errors
/// Returns `RowDocError::PostgresError` if the column cannot be read, or
/// `RowDocError::ExecutionError` for a type with no `RowValues` form.
pub fn postgres_extract_value(row: &Row, idx: usize) -> Result<RowValues, RowDocError> {
    let column = &row.columns()[idx];
    let value = match *column.type_() {
        Type::INT2 => row
            .try_get::<_, Option<i16>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT4 => row
            .try_get::<_, Option<i32>>(idx)?
            .map(|v| RowValues::Int(i64::from(v))),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.map(RowValues::Int),
        Type::FLOAT4 => row
            .try_get::<_, Option<f32>>(idx)?
            .map(|v| RowValues::Float(f64::from(v))),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.map(RowValues::Float),
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.map(RowValues::Bool),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)?
            .map(RowValues::Timestamp),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)?
            .map(|v| RowValues::Timestamp(v.naive_utc())),
        Type::DATE => row
            .try_get::<_, Option<NaiveDate>>(idx)?
            .map(|v| RowValues::Timestamp(v.and_time(chrono::NaiveTime::MIN))),
        Type::JSON | Type::JSONB => row.try_get::<_, Option<Value>>(idx)?.map(RowValues::JSON),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx)?.map(RowValues::Blob),
        _ => row
            .try_get::<_, Option<String>>(idx)
            .map_err(|e| {
                RowDocError::ExecutionError(format!(
                    "column '{}' has unsupported type {}: {e}",
                    column.name(),
                    column.type_()
                ))
            })?
            .map(RowValues::Text),
    };
    Ok(value.unwrap_or(RowValues::Null))
}

/// Column names of a prepared statement, shared by every row it yields.
#[must_use]
pub fn column_names(stmt: &Statement) -> Arc<Vec<String>> {
    Arc::new(
        stmt.columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect(),
    )
}

fn row_values(row: &Row) -> Result<Vec<RowValues>, RowDocError> {
    (0..row.len())
        .map(|idx| postgres_extract_value(row, idx))
        .collect()
}

/// Build a result set from a Postgres row stream.
///
/// # Errors
/// Returns errors from the stream or from value extraction.
pub async fn build_result_set(
    column_names: Arc<Vec<String>>,
    rows: RowStream,
) -> Result<ResultSet, RowDocError> {
    pin_mut!(rows);
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(column_names);
    while let Some(row) = rows.try_next().await? {
        result_set.add_row_values(row_values(&row)?);
    }
    Ok(result_set)
}

/// Convert streamed rows into object nodes without building a `ResultSet`.
///
/// # Errors
/// Returns stream, extraction or conversion errors.
pub async fn build_nodes(
    column_names: &[String],
    rows: RowStream,
    converters: &ConverterSet,
) -> Result<Vec<ObjectNode>, RowDocError> {
    pin_mut!(rows);
    let mut nodes = Vec::new();
    while let Some(row) = rows.try_next().await? {
        let mut node = Map::new();
        for (idx, column) in column_names.iter().enumerate() {
            let value = postgres_extract_value(&row, idx)?;
            node.insert(column.clone(), value_node(column, &value, converters)?);
        }
        nodes.push(node);
    }
    Ok(nodes)
}

/// Read the single row a query is expected to return.
///
/// # Errors
/// Returns `RowDocError::RowNotFound` when there are no rows, and
/// `RowDocError::MultipleRowsFound` for more than one row under
/// [`SingleRowMode::Exactly`].
pub async fn build_single_row(
    column_names: Arc<Vec<String>>,
    rows: RowStream,
    mode: SingleRowMode,
) -> Result<DbRow, RowDocError> {
    pin_mut!(rows);
    let Some(row) = rows.try_next().await? else {
        return Err(RowDocError::RowNotFound);
    };
    let first = DbRow::new(column_names, row_values(&row)?);

    if mode == SingleRowMode::Exactly && rows.try_next().await?.is_some() {
        let mut count = 2;
        while rows.try_next().await?.is_some() {
            count += 1;
        }
        return Err(RowDocError::MultipleRowsFound(count));
    }
    Ok(first)
}
