use std::fmt;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::RowDocError;
use crate::types::RowValues;

/// A named value transform applied while rows are turned into nodes.
///
/// The first converter in a [`ConverterSet`] whose [`can_convert`](Self::can_convert)
/// accepts a value produces that value's node; values nobody claims use the default
/// scalar mapping.
pub trait ValueConverter: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Whether this converter handles `value` found in `column`.
    fn can_convert(&self, column: &str, value: &RowValues) -> bool;

    /// Produce the node for `value`.
    ///
    /// # Errors
    /// Returns `RowDocError::EncodingError` when the value cannot be represented.
    fn convert(&self, column: &str, value: &RowValues) -> Result<JsonValue, RowDocError>;
}

/// Ordered, possibly empty list of converters shared across calls.
///
/// Cloning is cheap: converters sit behind `Arc`.
///
/// ```rust
/// use sql_rowdoc::prelude::*;
/// use serde_json::json;
///
/// let shout = ConverterSet::new().with(FnConverter::text("upper", |s| s.to_uppercase()));
/// let node = shout.apply("Name", &RowValues::Text("flint".into())).unwrap();
/// assert_eq!(node, Some(json!("FLINT")));
/// ```
#[derive(Clone, Default)]
pub struct ConverterSet {
    converters: Vec<Arc<dyn ValueConverter>>,
}

impl ConverterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a converter; earlier converters take precedence.
    #[must_use]
    pub fn with(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.converters.push(Arc::new(converter));
        self
    }

    /// Append an already shared converter.
    #[must_use]
    pub fn with_shared(mut self, converter: Arc<dyn ValueConverter>) -> Self {
        self.converters.push(converter);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    /// Converter names in precedence order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.converters.iter().map(|c| c.name())
    }

    /// Run the first matching converter, or `None` when no converter claims the value.
    ///
    /// # Errors
    /// Propagates the matching converter's error.
    pub fn apply(
        &self,
        column: &str,
        value: &RowValues,
    ) -> Result<Option<JsonValue>, RowDocError> {
        match self
            .converters
            .iter()
            .find(|c| c.can_convert(column, value))
        {
            Some(converter) => converter.convert(column, value).map(Some),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for ConverterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type Predicate = dyn Fn(&str, &RowValues) -> bool + Send + Sync;
type Transform = dyn Fn(&str, &RowValues) -> Result<JsonValue, RowDocError> + Send + Sync;

/// Converter built from a predicate and a transform closure.
pub struct FnConverter {
    name: String,
    predicate: Box<Predicate>,
    transform: Box<Transform>,
}

impl FnConverter {
    pub fn new<P, T>(name: impl Into<String>, predicate: P, transform: T) -> Self
    where
        P: Fn(&str, &RowValues) -> bool + Send + Sync + 'static,
        T: Fn(&str, &RowValues) -> Result<JsonValue, RowDocError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(predicate),
            transform: Box::new(transform),
        }
    }

    /// Rewrite every text value with `f`.
    pub fn text<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::new(
            name,
            |_, value| matches!(value, RowValues::Text(_)),
            move |_, value| match value {
                RowValues::Text(s) => Ok(JsonValue::String(f(s))),
                other => Err(RowDocError::EncodingError(format!(
                    "text converter handed a {} value",
                    other.kind()
                ))),
            },
        )
    }

    /// Apply `transform` to any value in the listed columns (ASCII case-insensitive).
    pub fn for_columns<T>(name: impl Into<String>, columns: &[&str], transform: T) -> Self
    where
        T: Fn(&str, &RowValues) -> Result<JsonValue, RowDocError> + Send + Sync + 'static,
    {
        let columns: Vec<String> = columns.iter().map(|c| c.to_ascii_lowercase()).collect();
        Self::new(
            name,
            move |column, _| columns.iter().any(|c| c.eq_ignore_ascii_case(column)),
            transform,
        )
    }
}

impl ValueConverter for FnConverter {
    fn name(&self) -> &str {
        &self.name
    }

    fn can_convert(&self, column: &str, value: &RowValues) -> bool {
        (self.predicate)(column, value)
    }

    fn convert(&self, column: &str, value: &RowValues) -> Result<JsonValue, RowDocError> {
        (self.transform)(column, value)
    }
}

/// Format timestamps with a chrono format string instead of ISO-8601.
#[derive(Debug, Clone)]
pub struct TimestampFormatConverter {
    format: String,
}

impl TimestampFormatConverter {
    #[must_use]
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
        }
    }
}

impl Default for TimestampFormatConverter {
    fn default() -> Self {
        Self::new("%Y-%m-%dT%H:%M:%S")
    }
}

impl ValueConverter for TimestampFormatConverter {
    fn name(&self) -> &str {
        "timestamp-format"
    }

    fn can_convert(&self, _column: &str, value: &RowValues) -> bool {
        matches!(value, RowValues::Timestamp(_))
    }

    fn convert(&self, _column: &str, value: &RowValues) -> Result<JsonValue, RowDocError> {
        use std::fmt::Write;

        let RowValues::Timestamp(ts) = value else {
            return Err(RowDocError::EncodingError(format!(
                "timestamp converter handed a {} value",
                value.kind()
            )));
        };
        let mut out = String::with_capacity(self.format.len() + 8);
        // chrono reports a bad format string as a fmt::Error
        write!(out, "{}", ts.format(&self.format)).map_err(|_| {
            RowDocError::EncodingError(format!("invalid timestamp format '{}'", self.format))
        })?;
        Ok(JsonValue::String(out))
    }
}

/// Encode blobs as lower-case hex instead of Base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlobHexConverter;

impl ValueConverter for BlobHexConverter {
    fn name(&self) -> &str {
        "blob-hex"
    }

    fn can_convert(&self, _column: &str, value: &RowValues) -> bool {
        matches!(value, RowValues::Blob(_))
    }

    fn convert(&self, _column: &str, value: &RowValues) -> Result<JsonValue, RowDocError> {
        use std::fmt::Write;

        let bytes = value.as_blob().ok_or_else(|| {
            RowDocError::EncodingError(format!("blob converter handed a {} value", value.kind()))
        })?;
        let mut hex = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            let _ = write!(hex, "{b:02x}");
        }
        Ok(JsonValue::String(hex))
    }
}

/// Parse text stored in the listed columns as nested JSON.
#[derive(Debug, Clone)]
pub struct EmbeddedJsonConverter {
    columns: Vec<String>,
}

impl EmbeddedJsonConverter {
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

impl ValueConverter for EmbeddedJsonConverter {
    fn name(&self) -> &str {
        "embedded-json"
    }

    fn can_convert(&self, column: &str, value: &RowValues) -> bool {
        matches!(value, RowValues::Text(_))
            && self.columns.iter().any(|c| c.eq_ignore_ascii_case(column))
    }

    fn convert(&self, column: &str, value: &RowValues) -> Result<JsonValue, RowDocError> {
        let text = value.as_text().unwrap_or_default();
        serde_json::from_str(text).map_err(|e| {
            RowDocError::EncodingError(format!("column '{column}' does not hold JSON: {e}"))
        })
    }
}
