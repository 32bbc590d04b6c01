use rusqlite::Statement;
use rusqlite::types::Value;

use crate::error::RowDocError;
use crate::params::QueryParams;
use crate::types::RowValues;

/// Timestamp layout written for bound timestamps; `RowValues::as_timestamp` reads it back.
const TIMESTAMP_BIND_FORMAT: &str = "%F %T%.f";

/// Convert a single `RowValues` to a rusqlite `Value`.
#[must_use]
pub fn row_value_to_sqlite_value(value: &RowValues) -> Value {
    match value {
        RowValues::Int(i) => Value::Integer(*i),
        RowValues::Float(f) => Value::Real(*f),
        RowValues::Text(s) => Value::Text(s.clone()),
        RowValues::Bool(b) => Value::Integer(i64::from(*b)),
        RowValues::Timestamp(dt) => Value::Text(dt.format(TIMESTAMP_BIND_FORMAT).to_string()),
        RowValues::Null => Value::Null,
        RowValues::JSON(jval) => Value::Text(jval.to_string()),
        RowValues::Blob(bytes) => Value::Blob(bytes.clone()),
    }
}

/// Bind `params` to every parameter slot of `stmt`.
///
/// Positional values must cover the statement's parameter count exactly. Named values
/// are matched to the statement's `:name`, `@name` and `$name` slots ignoring sigil and
/// ASCII case; values the statement never references are ignored.
///
/// # Errors
/// Returns `RowDocError::ParameterError` on a count mismatch or an unbound slot.
pub fn bind_params(stmt: &mut Statement<'_>, params: &QueryParams) -> Result<(), RowDocError> {
    let expected = stmt.parameter_count();
    match params {
        QueryParams::None => {
            if expected != 0 {
                return Err(RowDocError::ParameterError(format!(
                    "statement expects {expected} parameter(s) but none were supplied"
                )));
            }
        }
        QueryParams::Positional(values) => {
            if values.len() != expected {
                return Err(RowDocError::ParameterError(format!(
                    "statement expects {expected} parameter(s), got {}",
                    values.len()
                )));
            }
            for (idx, value) in values.iter().enumerate() {
                stmt.raw_bind_parameter(idx + 1, row_value_to_sqlite_value(value))?;
            }
        }
        QueryParams::Named(_) => {
            for idx in 1..=expected {
                let value = match stmt.parameter_name(idx) {
                    Some(name) if !name.starts_with('?') => {
                        params.lookup(name).ok_or_else(|| {
                            RowDocError::ParameterError(format!("no value supplied for {name}"))
                        })?
                    }
                    _ => {
                        return Err(RowDocError::ParameterError(format!(
                            "parameter {idx} is positional but only named values were supplied"
                        )));
                    }
                };
                stmt.raw_bind_parameter(idx, row_value_to_sqlite_value(value))?;
            }
        }
    }
    Ok(())
}
