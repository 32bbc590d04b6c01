//! Query entry points: run SQL through a pooled connection or transaction and return
//! the rows as object nodes, JSON or BSON.
//!
//! ```rust,no_run
//! use sql_rowdoc::prelude::*;
//!
//! # async fn demo() -> Result<(), RowDocError> {
//! let cap = ConfigAndPool::sqlite_builder("monsters.db").build().await?;
//! let conn = cap.get_connection().await?;
//!
//! let monsters = conn
//!     .query("SELECT Name FROM SimpleMonsters ORDER BY Id")
//!     .to_json_string()
//!     .await?;
//!
//! let boo = conn
//!     .query("SELECT * FROM SimpleMonsters WHERE Name = ?1")
//!     .params(vec![RowValues::Text("Boo".into())])
//!     .single_row(SingleRowMode::Exactly)
//!     .first_bson_bytes()
//!     .await?;
//! # let _ = (monsters, boo);
//! # Ok(())
//! # }
//! ```

mod options;
mod target;

use std::time::Duration;

use serde_json::Value as JsonValue;

use crate::convert::{
    ConverterSet, ObjectNode, ValueConverter, to_array_node, to_node, to_object_nodes,
};
use crate::encode::{self, DocSink, DocStream, EncodeOptions, TextEncoding};
use crate::error::RowDocError;
use crate::params::QueryParams;
use crate::results::ResultSet;
use crate::translation::{TranslationMode, translate_placeholders};
use crate::types::{CommandType, RowValues};

pub use options::{QueryOptions, SingleRowMode};

pub(crate) use options::Request;
pub(crate) use target::QueryTarget;

/// Fluent query over a connection or transaction.
///
/// Option methods can be chained in any order; a terminal method runs the query and
/// consumes the builder.
#[must_use = "a query runs only when a terminal method is awaited"]
pub struct QueryBuilder<'a> {
    target: QueryTarget<'a>,
    sql: &'a str,
    params: QueryParams,
    options: QueryOptions,
    encode: EncodeOptions,
    named_onto_positional: bool,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(target: QueryTarget<'a>, sql: &'a str) -> Self {
        Self {
            target,
            sql,
            params: QueryParams::None,
            options: QueryOptions::default(),
            encode: EncodeOptions::default(),
            named_onto_positional: false,
        }
    }

    /// Replace the parameter bag.
    pub fn params(mut self, params: impl Into<QueryParams>) -> Self {
        self.params = params.into();
        self.named_onto_positional = false;
        self
    }

    /// Bind one named parameter, turning the bag into a named one.
    ///
    /// Binding a name after positional values have been set makes the terminal
    /// method fail with `RowDocError::ParameterError`.
    pub fn bind(mut self, name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        if matches!(&self.params, QueryParams::Positional(values) if !values.is_empty()) {
            self.named_onto_positional = true;
        }
        self.params = std::mem::take(&mut self.params).bind(name, value);
        self
    }

    /// Replace all query options at once.
    pub fn options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn translation(mut self, translation: TranslationMode) -> Self {
        self.options.translation = translation;
        self
    }

    pub fn command_type(mut self, command_type: CommandType) -> Self {
        self.options.command_type = command_type;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn buffered(mut self, buffered: bool) -> Self {
        self.options.buffered = buffered;
        self
    }

    pub fn single_row(mut self, single_row: SingleRowMode) -> Self {
        self.options.single_row = single_row;
        self
    }

    /// Replace the converter set.
    pub fn converters(mut self, converters: ConverterSet) -> Self {
        self.encode.converters = converters;
        self
    }

    /// Append one converter after any already set.
    pub fn converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.encode.converters = std::mem::take(&mut self.encode.converters).with(converter);
        self
    }

    /// Text encoding for the JSON stream and string terminals.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encode.encoding = encoding;
        self
    }

    pub fn encode_options(mut self, encode: EncodeOptions) -> Self {
        self.encode = encode;
        self
    }

    /// Run the query and return the raw rows.
    ///
    /// # Errors
    /// Propagates parameter, driver, pool and timeout errors unchanged.
    pub async fn to_result_set(self) -> Result<ResultSet, RowDocError> {
        let (target, request, _, _) = self.into_request()?;
        target.fetch_rows(request).await
    }

    /// Run the query and return one object node per row.
    ///
    /// # Errors
    /// Propagates query errors; fails with `RowDocError::EncodingError` if a value
    /// cannot be represented.
    pub async fn to_objects(self) -> Result<Vec<ObjectNode>, RowDocError> {
        let (target, request, options, encode) = self.into_request()?;
        if options.buffered {
            let rows = target.fetch_rows(request).await?;
            to_object_nodes(&rows, &encode.converters)
        } else {
            target.fetch_nodes(request, encode.converters).await
        }
    }

    /// Run the query and return an array node; no rows gives an empty array.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_array(self) -> Result<JsonValue, RowDocError> {
        let (target, request, options, encode) = self.into_request()?;
        if options.buffered {
            let rows = target.fetch_rows(request).await?;
            to_array_node(&rows, &encode.converters)
        } else {
            let nodes = target.fetch_nodes(request, encode.converters).await?;
            Ok(JsonValue::Array(
                nodes.into_iter().map(JsonValue::Object).collect(),
            ))
        }
    }

    /// Rows as a JSON array stream positioned at its start.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_json_stream(self) -> Result<DocStream, RowDocError> {
        let encoding = self.encode.encoding;
        let node = self.to_array().await?;
        encode::json_stream(&node, encoding)
    }

    /// Rows as a JSON array string.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_json_string(self) -> Result<String, RowDocError> {
        let encoding = self.encode.encoding;
        let node = self.to_array().await?;
        encode::json_string(&node, encoding)
    }

    /// Rows as a BSON stream positioned at its start.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_bson_stream(self) -> Result<DocStream, RowDocError> {
        let node = self.to_array().await?;
        encode::bson_stream(&node)
    }

    /// Rows as BSON bytes.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_bson_bytes(self) -> Result<Vec<u8>, RowDocError> {
        let node = self.to_array().await?;
        encode::bson_bytes(&node)
    }

    /// Rows as BSON, Base64 encoded.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects).
    pub async fn to_bson_base64(self) -> Result<String, RowDocError> {
        let node = self.to_array().await?;
        encode::bson_base64(&node)
    }

    /// Write rows as JSON into a caller-supplied sink, rewinding it if it can seek.
    ///
    /// # Errors
    /// See [`to_objects`](Self::to_objects); sink failures surface as `RowDocError::Io`.
    pub async fn write_json_to<S: DocSink + ?Sized>(self, sink: &mut S) -> Result<(), RowDocError> {
        let encoding = self.encode.encoding;
        let node = self.to_array().await?;
        encode::write_json(&node, sink, encoding)
    }

    /// Write rows as BSON into a caller-supplied sink, rewinding it if it can seek.
    ///
    /// # Errors
    /// See [`write_json_to`](Self::write_json_to).
    pub async fn write_bson_to<S: DocSink + ?Sized>(self, sink: &mut S) -> Result<(), RowDocError> {
        let node = self.to_array().await?;
        encode::write_bson(&node, sink)
    }

    /// Run the query and return its single row as an object node.
    ///
    /// # Errors
    /// Fails with `RowDocError::RowNotFound` when no row matches, and with
    /// `RowDocError::MultipleRowsFound` for several rows under
    /// [`SingleRowMode::Exactly`]; otherwise as [`to_objects`](Self::to_objects).
    pub async fn first_object(self) -> Result<ObjectNode, RowDocError> {
        let (target, request, options, encode) = self.into_request()?;
        let row = target.fetch_single(request, options.single_row).await?;
        to_node(&row, &encode.converters)
    }

    /// Single row as a JSON object stream positioned at its start.
    ///
    /// # Errors
    /// See [`first_object`](Self::first_object).
    pub async fn first_json_stream(self) -> Result<DocStream, RowDocError> {
        let encoding = self.encode.encoding;
        let node = JsonValue::Object(self.first_object().await?);
        encode::json_stream(&node, encoding)
    }

    /// Single row as a JSON object string.
    ///
    /// # Errors
    /// See [`first_object`](Self::first_object).
    pub async fn first_json_string(self) -> Result<String, RowDocError> {
        let encoding = self.encode.encoding;
        let node = JsonValue::Object(self.first_object().await?);
        encode::json_string(&node, encoding)
    }

    /// Single row as a BSON document stream positioned at its start.
    ///
    /// # Errors
    /// See [`first_object`](Self::first_object).
    pub async fn first_bson_stream(self) -> Result<DocStream, RowDocError> {
        let node = JsonValue::Object(self.first_object().await?);
        encode::bson_stream(&node)
    }

    /// Single row as BSON bytes.
    ///
    /// # Errors
    /// See [`first_object`](Self::first_object).
    pub async fn first_bson_bytes(self) -> Result<Vec<u8>, RowDocError> {
        let node = JsonValue::Object(self.first_object().await?);
        encode::bson_bytes(&node)
    }

    /// Single row as BSON, Base64 encoded.
    ///
    /// # Errors
    /// See [`first_object`](Self::first_object).
    pub async fn first_bson_base64(self) -> Result<String, RowDocError> {
        let node = JsonValue::Object(self.first_object().await?);
        encode::bson_base64(&node)
    }

    /// Run a DML statement and return the affected row count.
    ///
    /// # Errors
    /// Propagates parameter, driver, pool and timeout errors unchanged.
    pub async fn execute(self) -> Result<usize, RowDocError> {
        let (target, request, _, _) = self.into_request()?;
        target.execute(request).await
    }

    #[allow(clippy::type_complexity)]
    fn into_request(
        self,
    ) -> Result<(QueryTarget<'a>, Request, QueryOptions, EncodeOptions), RowDocError> {
        if self.named_onto_positional {
            return Err(RowDocError::ParameterError(
                "named parameter bound onto positional parameters".into(),
            ));
        }
        let target = self.target;
        let options = self.options;
        let translate = options.command_type == CommandType::Text
            && options.translation.resolve(target.translate_default());
        let sql = translate_placeholders(self.sql, target.placeholder_style(), translate);

        tracing::debug!(
            backend = ?target.database_type(),
            command_type = ?options.command_type,
            buffered = options.buffered,
            params = self.params.len(),
            translated = translate,
            "dispatching query"
        );
        tracing::trace!(sql = %sql, "query text");

        let request = Request {
            sql: sql.into_owned(),
            params: self.params,
            command_type: options.command_type,
            timeout: options.timeout,
        };
        Ok((target, request, options, self.encode))
    }
}
