use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bson::{Bson, Document};
use serde_json::{Map, Number, Value as JsonValue};

use crate::error::RowDocError;

/// Build the BSON document for a node.
///
/// Objects map to documents. Arrays use BSON's own array layout at the top level: a
/// document keyed `"0"`, `"1"`, ... in element order.
pub(crate) fn node_to_document(node: &JsonValue) -> Result<Document, RowDocError> {
    match node {
        JsonValue::Object(map) => object_to_document(map),
        JsonValue::Array(items) => {
            let mut doc = Document::new();
            for (idx, item) in items.iter().enumerate() {
                doc.insert(idx.to_string(), json_to_bson(item)?);
            }
            Ok(doc)
        }
        other => Err(RowDocError::EncodingError(format!(
            "BSON needs an object or array at the top level, got {}",
            json_kind(other)
        ))),
    }
}

pub(crate) fn object_to_document(map: &Map<String, JsonValue>) -> Result<Document, RowDocError> {
    let mut doc = Document::new();
    for (key, value) in map {
        doc.insert(key.clone(), json_to_bson(value)?);
    }
    Ok(doc)
}

fn json_to_bson(value: &JsonValue) -> Result<Bson, RowDocError> {
    Ok(match value {
        JsonValue::Null => Bson::Null,
        JsonValue::Bool(b) => Bson::Boolean(*b),
        JsonValue::Number(n) => number_to_bson(n)?,
        JsonValue::String(s) => Bson::String(s.clone()),
        JsonValue::Array(items) => Bson::Array(
            items
                .iter()
                .map(json_to_bson)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        JsonValue::Object(map) => Bson::Document(object_to_document(map)?),
    })
}

fn number_to_bson(n: &Number) -> Result<Bson, RowDocError> {
    if let Some(i) = n.as_i64() {
        return Ok(Bson::Int64(i));
    }
    if n.is_u64() {
        return Err(RowDocError::EncodingError(format!(
            "integer {n} is larger than BSON's int64"
        )));
    }
    n.as_f64()
        .map(Bson::Double)
        .ok_or_else(|| RowDocError::EncodingError(format!("number {n} has no BSON form")))
}

/// Read a top-level document back into an object node.
pub(crate) fn document_to_object(doc: Document) -> Result<Map<String, JsonValue>, RowDocError> {
    let mut map = Map::new();
    for (key, value) in doc {
        map.insert(key, bson_to_json(value)?);
    }
    Ok(map)
}

/// Read a top-level array-layout document back into an array node.
pub(crate) fn document_to_array(doc: Document) -> Result<JsonValue, RowDocError> {
    let mut items = Vec::with_capacity(doc.len());
    for (idx, (key, value)) in doc.into_iter().enumerate() {
        if key != idx.to_string() {
            return Err(RowDocError::DecodeError(format!(
                "array element {idx} is keyed '{key}'"
            )));
        }
        items.push(bson_to_json(value)?);
    }
    Ok(JsonValue::Array(items))
}

fn bson_to_json(value: Bson) -> Result<JsonValue, RowDocError> {
    Ok(match value {
        Bson::Null | Bson::Undefined => JsonValue::Null,
        Bson::Boolean(b) => JsonValue::Bool(b),
        Bson::Int32(i) => JsonValue::Number(Number::from(i)),
        Bson::Int64(i) => JsonValue::Number(Number::from(i)),
        Bson::Double(f) => Number::from_f64(f).map(JsonValue::Number).ok_or_else(|| {
            RowDocError::DecodeError(format!("double {f} has no JSON form"))
        })?,
        Bson::String(s) | Bson::Symbol(s) => JsonValue::String(s),
        Bson::Array(items) => JsonValue::Array(
            items
                .into_iter()
                .map(bson_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
        Bson::Document(doc) => JsonValue::Object(document_to_object(doc)?),
        Bson::DateTime(dt) => JsonValue::String(
            dt.try_to_rfc3339_string()
                .map_err(|e| RowDocError::DecodeError(format!("datetime out of range: {e}")))?,
        ),
        Bson::Binary(bin) => JsonValue::String(STANDARD.encode(bin.bytes)),
        Bson::ObjectId(oid) => JsonValue::String(oid.to_hex()),
        other => {
            return Err(RowDocError::DecodeError(format!(
                "unsupported BSON element {:?}",
                other.element_type()
            )));
        }
    })
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn array_layout_uses_index_keys() {
        let doc = node_to_document(&json!([{"Name": "Flint"}, {"Name": "Boo"}])).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(keys, ["0", "1"]);
        assert_eq!(
            document_to_array(doc).unwrap(),
            json!([{"Name": "Flint"}, {"Name": "Boo"}])
        );
    }

    #[test]
    fn scalars_map_to_bson_types() {
        let doc = node_to_document(&json!({"i": 7, "f": 2.5, "s": "x", "b": false, "n": null}))
            .unwrap();
        assert_eq!(doc.get("i"), Some(&Bson::Int64(7)));
        assert_eq!(doc.get("f"), Some(&Bson::Double(2.5)));
        assert_eq!(doc.get("n"), Some(&Bson::Null));
    }

    #[test]
    fn oversized_unsigned_is_rejected() {
        let err = node_to_document(&json!({"big": u64::MAX})).unwrap_err();
        assert!(matches!(err, RowDocError::EncodingError(_)));
    }

    #[test]
    fn top_level_scalar_is_rejected() {
        assert!(matches!(
            node_to_document(&json!("Flint")),
            Err(RowDocError::EncodingError(_))
        ));
    }

    #[test]
    fn out_of_order_array_keys_fail_to_decode() {
        let mut doc = Document::new();
        doc.insert("1", "Boo");
        assert!(matches!(
            document_to_array(doc),
            Err(RowDocError::DecodeError(_))
        ));
    }
}
