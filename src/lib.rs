//! Run SQL against pooled `SQLite` or Postgres connections and get the rows back as
//! documents.
//!
//! Rows become JSON object nodes ([`ObjectNode`](convert::ObjectNode)); a result
//! becomes an array node. Nodes are then written out as JSON text (UTF-8, UTF-16 or
//! Latin-1) or as BSON, each available as a stream, a string, raw bytes or Base64.
//!
//! ```rust,no_run
//! use sql_rowdoc::prelude::*;
//!
//! # async fn demo() -> Result<(), RowDocError> {
//! let cap = ConfigAndPool::sqlite_builder("monsters.db").build().await?;
//! let conn = cap.get_connection().await?;
//!
//! let json = conn
//!     .query(r#"SELECT "Name", "Habitat" FROM "SimpleMonsters" WHERE "Name" = @name"#)
//!     .bind("name", "Flint")
//!     .to_json_string()
//!     .await?;
//! assert_eq!(json, r#"[{"Name":"Flint","Habitat":"Shadows"}]"#);
//! # Ok(())
//! # }
//! ```
//!
//! Backends are behind the `sqlite` (default) and `postgres` features.

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one backend feature: `sqlite` or `postgres`");

pub mod convert;
pub mod decode;
pub mod encode;
pub mod error;
pub mod params;
pub mod pool;
pub mod prelude;
pub mod query;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use error::RowDocError;
pub use params::QueryParams;
pub use pool::{ConfigAndPool, MiddlewarePool, MiddlewarePoolConnection};
pub use query::{QueryBuilder, QueryOptions, SingleRowMode};
pub use results::{DbRow, ResultSet};
pub use types::{CommandType, DatabaseType, RowValues};
