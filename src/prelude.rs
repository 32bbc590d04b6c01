//! Convenient imports for common functionality.
//!
//! This module re-exports the most commonly used types and functions
//! to make it easier to get started with the library.

pub use crate::convert::{
    BlobHexConverter, ConverterSet, EmbeddedJsonConverter, FnConverter, ObjectNode,
    TimestampFormatConverter, ValueConverter,
};
pub use crate::encode::{DocSink, DocStream, EncodeOptions, TextEncoding};
pub use crate::error::RowDocError;
pub use crate::params::QueryParams;
pub use crate::pool::{ConfigAndPool, MiddlewarePool, MiddlewarePoolConnection};
pub use crate::query::{QueryBuilder, QueryOptions, SingleRowMode};
pub use crate::results::{DbRow, ResultSet};
pub use crate::translation::{PlaceholderStyle, TranslationMode, translate_placeholders};
pub use crate::types::{CommandType, DatabaseType, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteOptions, SqliteOptionsBuilder};
