//! Fixtures shared by the integration tests, benches and doc examples.

pub mod monsters;
pub mod test_helpers;

pub use test_helpers::{create_test_row, monster_result_set};
