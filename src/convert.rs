//! Row to tree-node conversion.
//!
//! A row becomes a JSON object node (`serde_json::Map`), a sequence of rows becomes an
//! array node. Each value is offered to the caller's [`ConverterSet`] first and falls back
//! to the default scalar mapping:
//!
//! | value | node |
//! |---|---|
//! | `Int` | integer |
//! | `Float` | number (non-finite values are rejected) |
//! | `Text` | string |
//! | `Bool` | boolean |
//! | `Null` | null |
//! | `Timestamp` | ISO-8601 string |
//! | `JSON` | nested value |
//! | `Blob` | standard Base64 string |

mod converter;
mod node;

pub use converter::{
    BlobHexConverter, ConverterSet, EmbeddedJsonConverter, FnConverter,
    TimestampFormatConverter, ValueConverter,
};
pub use node::{ObjectNode, default_value_node, to_array_node, to_node, to_object_nodes};
pub(crate) use node::value_node;
