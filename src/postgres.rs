//! Postgres collaborator over `deadpool-postgres` / `tokio-postgres`.
//!
//! Submodules:
//! - config: pool construction and config validation
//! - params: `ToSql` for `RowValues`, named-parameter and routine-call rewriting
//! - query: row extraction, result sets, per-row node conversion
//! - executor: statement execution with cancel-on-timeout
//! - transaction: `Tx`, a query target inside an open transaction

pub mod config;
pub mod executor;
pub mod params;
pub mod query;
pub mod transaction;

pub use executor::{PgSession, execute_batch};
pub use params::{PreparedCall, prepare_call};
pub use query::{build_result_set, postgres_extract_value};
pub use transaction::{Tx, begin_transaction};
