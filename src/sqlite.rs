//! `SQLite` collaborator over `deadpool-sqlite`.
//!
//! Submodules:
//! - config: pool options and `ConfigAndPool` construction
//! - params: binding `QueryParams` to statement slots
//! - query: row extraction, result sets, per-row node conversion
//! - executor: running work on the pooled connection, with timeouts
//! - transaction: `Tx`, owning the connection until commit/rollback

pub mod config;
pub mod executor;
pub mod params;
pub mod query;
pub mod transaction;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use executor::execute_batch;
pub use params::{bind_params, row_value_to_sqlite_value};
pub use query::{build_result_set, sqlite_extract_value_sync};
pub use transaction::{Tx, begin_transaction};
