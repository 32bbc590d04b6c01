use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Number, Value as JsonValue};

use super::converter::ConverterSet;
use crate::error::RowDocError;
use crate::results::DbRow;
use crate::types::RowValues;

/// Object node produced from one row.
pub type ObjectNode = Map<String, JsonValue>;

/// Timestamp layout used by the default mapping.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Convert one row into an object node, one field per column.
///
/// Fields keep the column order of the row.
///
/// # Errors
/// Returns `RowDocError::EncodingError` if a value has no JSON representation, or any
/// error raised by a converter.
pub fn to_node(row: &DbRow, converters: &ConverterSet) -> Result<ObjectNode, RowDocError> {
    let mut node = Map::new();
    for (column, value) in row.iter() {
        node.insert(column.to_string(), value_node(column, value, converters)?);
    }
    Ok(node)
}

/// Convert a sequence of rows into object nodes, preserving order.
///
/// # Errors
/// Fails on the first row that cannot be converted.
pub fn to_object_nodes<'a, I>(
    rows: I,
    converters: &ConverterSet,
) -> Result<Vec<ObjectNode>, RowDocError>
where
    I: IntoIterator<Item = &'a DbRow>,
{
    rows.into_iter()
        .map(|row| to_node(row, converters))
        .collect()
}

/// Convert a sequence of rows into an array node. No rows gives an empty array.
///
/// # Errors
/// Fails on the first row that cannot be converted.
pub fn to_array_node<'a, I>(rows: I, converters: &ConverterSet) -> Result<JsonValue, RowDocError>
where
    I: IntoIterator<Item = &'a DbRow>,
{
    let nodes = to_object_nodes(rows, converters)?;
    Ok(JsonValue::Array(
        nodes.into_iter().map(JsonValue::Object).collect(),
    ))
}

/// Node for a single column value: converters first, then the default mapping.
pub(crate) fn value_node(
    column: &str,
    value: &RowValues,
    converters: &ConverterSet,
) -> Result<JsonValue, RowDocError> {
    if !converters.is_empty()
        && let Some(node) = converters.apply(column, value)?
    {
        return Ok(node);
    }
    default_value_node(column, value)
}

/// Default scalar mapping used when no converter claims a value.
///
/// # Errors
/// Returns `RowDocError::EncodingError` for non-finite floats.
pub fn default_value_node(column: &str, value: &RowValues) -> Result<JsonValue, RowDocError> {
    Ok(match value {
        RowValues::Int(i) => JsonValue::Number(Number::from(*i)),
        RowValues::Float(f) => Number::from_f64(*f).map(JsonValue::Number).ok_or_else(|| {
            RowDocError::EncodingError(format!(
                "column '{column}' holds {f}, which JSON cannot represent"
            ))
        })?,
        RowValues::Text(s) => JsonValue::String(s.clone()),
        RowValues::Bool(b) => JsonValue::Bool(*b),
        RowValues::Null => JsonValue::Null,
        RowValues::Timestamp(ts) => JsonValue::String(ts.format(TIMESTAMP_FORMAT).to_string()),
        RowValues::JSON(v) => v.clone(),
        RowValues::Blob(bytes) => JsonValue::String(STANDARD.encode(bytes)),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::convert::FnConverter;
    use crate::results::ResultSet;

    fn monsters(names: &[&str]) -> ResultSet {
        let mut rs = ResultSet::with_capacity(names.len());
        rs.set_column_names(Arc::new(vec!["Name".into()]));
        for name in names {
            rs.add_row_values(vec![RowValues::Text((*name).into())]);
        }
        rs
    }

    #[test]
    fn every_column_becomes_a_field() {
        let row = DbRow::new(
            Arc::new(vec!["Id".into(), "Name".into(), "Habitat".into()]),
            vec![
                RowValues::Int(2),
                RowValues::Text("Flint".into()),
                RowValues::Null,
            ],
        );
        let node = to_node(&row, &ConverterSet::new()).unwrap();
        assert_eq!(
            JsonValue::Object(node),
            json!({"Id": 2, "Name": "Flint", "Habitat": null})
        );
    }

    #[test]
    fn array_keeps_row_order() {
        let rs = monsters(&["Flint", "Boo"]);
        let node = to_array_node(&rs, &ConverterSet::new()).unwrap();
        assert_eq!(node, json!([{"Name": "Flint"}, {"Name": "Boo"}]));
    }

    #[test]
    fn no_rows_is_an_empty_array() {
        let rs = ResultSet::default();
        let node = to_array_node(&rs, &ConverterSet::new()).unwrap();
        assert_eq!(node, json!([]));
    }

    #[test]
    fn default_scalar_mapping() {
        let ts = NaiveDate::from_ymd_opt(1985, 7, 3)
            .unwrap()
            .and_hms_milli_opt(1, 21, 0, 500)
            .unwrap();
        assert_eq!(
            default_value_node("T", &RowValues::Timestamp(ts)).unwrap(),
            json!("1985-07-03T01:21:00.500")
        );
        assert_eq!(
            default_value_node("B", &RowValues::Blob(b"boo".to_vec())).unwrap(),
            json!("Ym9v")
        );
        assert_eq!(
            default_value_node("J", &RowValues::JSON(json!({"a": [1, 2]}))).unwrap(),
            json!({"a": [1, 2]})
        );
        assert_eq!(
            default_value_node("F", &RowValues::Float(1.5)).unwrap(),
            json!(1.5)
        );
        assert_eq!(
            default_value_node("Flag", &RowValues::Bool(true)).unwrap(),
            json!(true)
        );
    }

    #[test]
    fn non_finite_float_is_an_encoding_error() {
        let err = default_value_node("Scariness", &RowValues::Float(f64::NAN)).unwrap_err();
        assert!(matches!(err, RowDocError::EncodingError(msg) if msg.contains("Scariness")));
    }

    #[test]
    fn converters_run_before_default_mapping() {
        let upper = ConverterSet::new().with(FnConverter::text("upper", |s| s.to_uppercase()));
        let rs = monsters(&["flint"]);
        let node = to_array_node(&rs, &upper).unwrap();
        assert_eq!(node, json!([{"Name": "FLINT"}]));
    }
}
