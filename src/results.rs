//! Rows and result sets produced by the query facility.

mod result_set;
mod row;

pub use result_set::ResultSet;
pub use row::DbRow;
