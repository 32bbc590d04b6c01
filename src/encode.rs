//! Output paths for tree nodes: text JSON and binary BSON, as streams, strings, bytes,
//! or Base64.
//!
//! Every path is a deterministic function of the node, so the same node yields the same
//! content whichever path is taken. Buffers are owned by the call and dropped on every
//! exit path, including a failed encode.

mod bson_doc;
mod sink;
mod text;

use std::io::{Cursor, ErrorKind};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value as JsonValue;

use crate::convert::ConverterSet;
use crate::error::RowDocError;

pub(crate) use bson_doc::{document_to_array, document_to_object};
pub use sink::DocSink;
pub use text::TextEncoding;

use text::TranscodingWriter;

/// A fully written, in-memory document positioned at offset 0.
pub type DocStream = Cursor<Vec<u8>>;

/// Per-call encoding settings.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Byte encoding for text JSON paths
    pub encoding: TextEncoding,
    /// Value converters applied while rows become nodes
    pub converters: ConverterSet,
}

impl EncodeOptions {
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_converters(mut self, converters: ConverterSet) -> Self {
        self.converters = converters;
        self
    }
}

/// Write `node` as JSON text into `sink`, then rewind the sink if it can seek.
///
/// A failure part-way leaves whatever was written in a caller-owned sink.
///
/// # Errors
/// Returns `RowDocError::EncodingError` if a character cannot be represented in
/// `encoding`, or `RowDocError::Io` if the sink fails.
pub fn write_json<S: DocSink + ?Sized>(
    node: &JsonValue,
    sink: &mut S,
    encoding: TextEncoding,
) -> Result<(), RowDocError> {
    let mut writer = TranscodingWriter::new(&mut *sink, encoding);
    serde_json::to_writer(&mut writer, node).map_err(json_write_error)?;
    writer.finish().map_err(io_write_error)?;
    sink.rewind_if_seekable()?;
    Ok(())
}

/// Encode `node` as JSON text into a fresh stream positioned at its start.
///
/// # Errors
/// See [`write_json`].
pub fn json_stream(node: &JsonValue, encoding: TextEncoding) -> Result<DocStream, RowDocError> {
    let mut stream = Cursor::new(Vec::new());
    write_json(node, &mut stream, encoding)?;
    tracing::trace!(bytes = stream.get_ref().len(), encoding = encoding.name(), "json stream");
    Ok(stream)
}

/// Encode `node` as JSON text and decode the bytes back with the same encoding.
///
/// # Errors
/// See [`write_json`].
pub fn json_string(node: &JsonValue, encoding: TextEncoding) -> Result<String, RowDocError> {
    let mut buf = Vec::new();
    write_json(node, &mut buf, encoding)?;
    encoding.decode(&buf)
}

/// Write `node` as BSON into `sink`, then rewind the sink if it can seek.
///
/// # Errors
/// Returns `RowDocError::EncodingError` if the node has no BSON form, or a sink error.
pub fn write_bson<S: DocSink + ?Sized>(node: &JsonValue, sink: &mut S) -> Result<(), RowDocError> {
    let doc = bson_doc::node_to_document(node)?;
    doc.to_writer(&mut *sink)?;
    sink.flush()?;
    sink.rewind_if_seekable()?;
    Ok(())
}

/// Encode `node` as BSON into a fresh stream positioned at its start.
///
/// # Errors
/// See [`write_bson`].
pub fn bson_stream(node: &JsonValue) -> Result<DocStream, RowDocError> {
    let mut stream = Cursor::new(Vec::new());
    write_bson(node, &mut stream)?;
    tracing::trace!(bytes = stream.get_ref().len(), "bson stream");
    Ok(stream)
}

/// Encode `node` as raw BSON bytes.
///
/// # Errors
/// See [`write_bson`].
pub fn bson_bytes(node: &JsonValue) -> Result<Vec<u8>, RowDocError> {
    let mut buf = Vec::new();
    write_bson(node, &mut buf)?;
    Ok(buf)
}

/// Encode `node` as BSON, then as standard Base64 without line breaks.
///
/// # Errors
/// See [`write_bson`].
pub fn bson_base64(node: &JsonValue) -> Result<String, RowDocError> {
    Ok(STANDARD.encode(bson_bytes(node)?))
}

fn json_write_error(err: serde_json::Error) -> RowDocError {
    if err.is_io() {
        io_write_error(std::io::Error::from(err))
    } else {
        RowDocError::Json(err)
    }
}

// The transcoder reports unrepresentable text as InvalidData.
fn io_write_error(err: std::io::Error) -> RowDocError {
    if err.kind() == ErrorKind::InvalidData {
        RowDocError::EncodingError(err.to_string())
    } else {
        RowDocError::Io(err)
    }
}
