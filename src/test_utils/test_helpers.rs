//! Helper utilities for testing and development.

use std::sync::Arc;

use crate::results::{DbRow, ResultSet};
use crate::types::RowValues;

/// Create a test row with the given column names and values.
#[must_use]
pub fn create_test_row(column_names: Vec<String>, values: Vec<RowValues>) -> DbRow {
    DbRow::new(Arc::new(column_names), values)
}

/// An in-memory `SimpleMonsters` result set with `rows` generated monsters.
///
/// Every third monster has no habitat so null handling is always exercised.
#[must_use]
pub fn monster_result_set(rows: usize) -> ResultSet {
    let columns: Arc<Vec<String>> = Arc::new(
        ["Id", "Name", "ScarySound", "Habitat"]
            .into_iter()
            .map(String::from)
            .collect(),
    );
    let mut result_set = ResultSet::with_capacity(rows);
    result_set.set_column_names(columns);
    for i in 0..rows {
        let id = i64::try_from(i).unwrap_or(i64::MAX);
        let habitat = if i % 3 == 2 {
            RowValues::Null
        } else {
            RowValues::Text(format!("Cave {i}"))
        };
        result_set.add_row_values(vec![
            RowValues::Int(id + 1),
            RowValues::Text(format!("Monster {i}")),
            RowValues::Text("grrr".into()),
            habitat,
        ]);
    }
    result_set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_set_has_nulls_every_third_row() {
        let rs = monster_result_set(6);
        assert_eq!(rs.len(), 6);
        assert!(rs.results[2].get("Habitat").is_some_and(RowValues::is_null));
        assert_eq!(rs.results[0].get("habitat").and_then(RowValues::as_text), Some("Cave 0"));
    }
}
