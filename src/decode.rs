//! Decoders matching the [`encode`](crate::encode) output paths.

use std::io::Read;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bson::Document;
use serde_json::Value as JsonValue;

use crate::convert::ObjectNode;
use crate::encode::{TextEncoding, document_to_array, document_to_object};
use crate::error::RowDocError;

/// Parse JSON text.
///
/// # Errors
/// Returns `RowDocError::Json` on malformed input.
pub fn json_str(text: &str) -> Result<JsonValue, RowDocError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode JSON bytes written in `encoding`.
///
/// # Errors
/// Returns `RowDocError::DecodeError` or `RowDocError::Json` on malformed input.
pub fn json_bytes(bytes: &[u8], encoding: TextEncoding) -> Result<JsonValue, RowDocError> {
    json_str(&encoding.decode(bytes)?)
}

/// Read a JSON stream to its end and decode it.
///
/// # Errors
/// Returns `RowDocError::Io` if reading fails, otherwise as [`json_bytes`].
pub fn json_reader<R: Read>(mut reader: R, encoding: TextEncoding) -> Result<JsonValue, RowDocError> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    json_bytes(&buf, encoding)
}

/// Decode a BSON document into an object node.
///
/// # Errors
/// Returns `RowDocError::BsonDeserialize` on malformed BSON, or
/// `RowDocError::DecodeError` for elements without a JSON form.
pub fn bson_object<R: Read>(mut reader: R) -> Result<ObjectNode, RowDocError> {
    let doc = Document::from_reader(&mut reader)?;
    document_to_object(doc)
}

/// Decode a BSON document written from an array node.
///
/// # Errors
/// As [`bson_object`], plus `RowDocError::DecodeError` when the keys are not `"0"`,
/// `"1"`, ... in order.
pub fn bson_array<R: Read>(mut reader: R) -> Result<JsonValue, RowDocError> {
    let doc = Document::from_reader(&mut reader)?;
    document_to_array(doc)
}

/// Undo the Base64 step of the BSON Base64 path, giving the raw BSON bytes.
///
/// # Errors
/// Returns `RowDocError::DecodeError` on invalid Base64.
pub fn base64_bytes(text: &str) -> Result<Vec<u8>, RowDocError> {
    STANDARD
        .decode(text)
        .map_err(|e| RowDocError::DecodeError(format!("invalid base64: {e}")))
}
