use std::collections::HashMap;
use std::sync::Arc;

use crate::types::RowValues;

/// A row from a database query result
///
/// Column names are shared by every row of a result set. Lookups by name ignore ASCII
/// case, matching how the databases themselves resolve unquoted identifiers.
#[derive(Debug, Clone)]
pub struct DbRow {
    /// The column names for this row (shared across all rows in a result set)
    pub column_names: Arc<Vec<String>>,
    /// The values for this row, in column order
    pub values: Vec<RowValues>,
    // lower-cased column name -> index; shared with sibling rows
    column_index: Arc<HashMap<String, usize>>,
}

impl DbRow {
    /// Create a new database row
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names
    /// * `values` - The values for this row
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<RowValues>) -> Self {
        let column_index = Arc::new(build_column_index(&column_names));
        Self::with_index(column_names, values, column_index)
    }

    pub(crate) fn with_index(
        column_names: Arc<Vec<String>>,
        values: Vec<RowValues>,
        column_index: Arc<HashMap<String, usize>>,
    ) -> Self {
        Self {
            column_names,
            values,
            column_index,
        }
    }

    /// Index of a column by name, ignoring ASCII case.
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        if let Some(&idx) = self.column_index.get(column_name) {
            return Some(idx);
        }
        self.column_index
            .get(&column_name.to_ascii_lowercase())
            .copied()
    }

    /// Value of a column by name, ignoring ASCII case.
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&RowValues> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Value of a column by position.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&RowValues> {
        self.values.get(index)
    }

    /// Iterate `(column name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RowValues)> {
        self.column_names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Map lower-cased column names to their position. On a case-insensitive collision the
/// first column wins.
pub(crate) fn build_column_index(column_names: &[String]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(column_names.len());
    for (i, name) in column_names.iter().enumerate() {
        index.entry(name.to_ascii_lowercase()).or_insert(i);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster_row() -> DbRow {
        DbRow::new(
            Arc::new(vec!["Id".into(), "Name".into(), "Habitat".into()]),
            vec![
                RowValues::Int(2),
                RowValues::Text("Flint".into()),
                RowValues::Null,
            ],
        )
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let row = monster_row();
        assert_eq!(row.get("name"), Some(&RowValues::Text("Flint".into())));
        assert_eq!(row.get("NAME"), row.get("Name"));
        assert_eq!(row.get_column_index("habitat"), Some(2));
        assert!(row.get("ScarySound").is_none());
    }

    #[test]
    fn iter_keeps_column_order() {
        let row = monster_row();
        let names: Vec<&str> = row.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Id", "Name", "Habitat"]);
    }
}
