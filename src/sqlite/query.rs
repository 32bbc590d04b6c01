use std::sync::Arc;

use rusqlite::types::ValueRef;
use rusqlite::{Row, Rows, Statement};
use serde_json::Map;

use crate::convert::{ConverterSet, ObjectNode, value_node};
use crate::error::RowDocError;
use crate::query::SingleRowMode;
use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

/// Extract a `RowValues` from a `SQLite` row.
///
/// # Errors
///
/// Returns `RowDocError::SqliteError` if the column cannot be read, and
/// `RowDocError::EncodingError` for TEXT that is not valid UTF-8.
pub fn sqlite_extract_value_sync(row: &Row<'_>, idx: usize) -> Result<RowValues, RowDocError> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => RowValues::Null,
        ValueRef::Integer(i) => RowValues::Int(i),
        ValueRef::Real(f) => RowValues::Float(f),
        ValueRef::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => RowValues::Text(text.to_owned()),
            Err(e) => {
                let stmt: &Statement<'_> = row.as_ref();
                let column = stmt.column_name(idx).unwrap_or("?");
                return Err(RowDocError::EncodingError(format!(
                    "column {column:?} holds text that is not valid utf-8: {e}"
                )));
            }
        },
        ValueRef::Blob(b) => RowValues::Blob(b.to_vec()),
    })
}

/// Column names of a prepared statement, shared by every row it yields.
#[must_use]
pub fn column_names(stmt: &Statement<'_>) -> Arc<Vec<String>> {
    Arc::new(
        stmt.column_names()
            .iter()
            .map(std::string::ToString::to_string)
            .collect(),
    )
}

fn row_values(row: &Row<'_>, col_count: usize) -> Result<Vec<RowValues>, RowDocError> {
    let mut values = Vec::with_capacity(col_count);
    for i in 0..col_count {
        values.push(sqlite_extract_value_sync(row, i)?);
    }
    Ok(values)
}

/// Build a result set from bound rows.
///
/// # Errors
/// Returns `RowDocError::SqliteError` if stepping or reading a row fails.
pub fn build_result_set(
    mut rows: Rows<'_>,
    column_names: Arc<Vec<String>>,
) -> Result<ResultSet, RowDocError> {
    let col_count = column_names.len();
    let mut result_set = ResultSet::with_capacity(10);
    result_set.set_column_names(column_names);

    while let Some(row) = rows.next()? {
        result_set.add_row_values(row_values(row, col_count)?);
    }

    Ok(result_set)
}

/// Convert rows into object nodes as they are stepped, without building a `ResultSet`.
///
/// # Errors
/// Returns driver errors, or the first conversion error.
pub fn build_nodes(
    mut rows: Rows<'_>,
    column_names: &[String],
    converters: &ConverterSet,
) -> Result<Vec<ObjectNode>, RowDocError> {
    let mut nodes = Vec::new();
    while let Some(row) = rows.next()? {
        let mut node = Map::new();
        for (i, column) in column_names.iter().enumerate() {
            let value = sqlite_extract_value_sync(row, i)?;
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
pub fn build_single_row(
    mut rows: Rows<'_>,
    column_names: Arc<Vec<String>>,
    mode: SingleRowMode,
) -> Result<DbRow, RowDocError> {
    let Some(row) = rows.next()? else {
        return Err(RowDocError::RowNotFound);
    };
    let first = DbRow::new(Arc::clone(&column_names), row_values(row, column_names.len())?);

    if mode == SingleRowMode::Exactly && rows.next()?.is_some() {
        let mut count = 2;
        while rows.next()?.is_some() {
            count += 1;
        }
        return Err(RowDocError::MultipleRowsFound(count));
    }
    Ok(first)
}
