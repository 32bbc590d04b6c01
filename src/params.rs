use crate::types::RowValues;

/// Leading sigils accepted on named parameters (`@name`, `:name`, `$name`).
pub(crate) const NAMED_SIGILS: [char; 3] = ['@', ':', '$'];

/// Parameter bag handed to the query facility along with the SQL text.
///
/// ```rust
/// use sql_rowdoc::prelude::*;
///
/// let by_name = QueryParams::named()
///     .bind("Name", "Flint")
///     .bind("@Habitat", RowValues::Null);
/// assert_eq!(by_name.len(), 2);
///
/// let by_position = QueryParams::from(vec![RowValues::Int(1)]);
/// assert_eq!(by_position.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum QueryParams {
    /// No parameters
    #[default]
    None,
    /// Bound in order to `?1`/`$1`-style placeholders
    Positional(Vec<RowValues>),
    /// Bound by name; names may carry a leading sigil and match case-insensitively
    Named(Vec<(String, RowValues)>),
}

impl QueryParams {
    /// Start an empty named bag.
    #[must_use]
    pub fn named() -> Self {
        QueryParams::Named(Vec::new())
    }

    /// Add a named value; a positional or empty bag turns into a named one and any
    /// positional values are dropped. `QueryBuilder::bind` reports that case as an error.
    ///
    /// Rebinding an existing name replaces its value.
    #[must_use]
    pub fn bind(self, name: impl Into<String>, value: impl Into<RowValues>) -> Self {
        let name = name.into();
        let value = value.into();
        let mut entries = match self {
            QueryParams::Named(entries) => entries,
            QueryParams::None | QueryParams::Positional(_) => Vec::new(),
        };
        let key = normalize_param_name(&name);
        if let Some(slot) = entries
            .iter_mut()
            .find(|(existing, _)| normalize_param_name(existing).eq_ignore_ascii_case(key))
        {
            slot.1 = value;
        } else {
            entries.push((name, value));
        }
        QueryParams::Named(entries)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            QueryParams::None => 0,
            QueryParams::Positional(values) => values.len(),
            QueryParams::Named(entries) => entries.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn is_named(&self) -> bool {
        matches!(self, QueryParams::Named(_))
    }

    /// Positional values, or an empty slice for named/empty bags.
    #[must_use]
    pub fn positional(&self) -> &[RowValues] {
        match self {
            QueryParams::Positional(values) => values,
            QueryParams::None | QueryParams::Named(_) => &[],
        }
    }

    /// Look up a named value, ignoring any sigil on either side and ASCII case.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&RowValues> {
        let QueryParams::Named(entries) = self else {
            return None;
        };
        let wanted = normalize_param_name(name);
        entries
            .iter()
            .find(|(candidate, _)| normalize_param_name(candidate).eq_ignore_ascii_case(wanted))
            .map(|(_, value)| value)
    }
}

impl From<Vec<RowValues>> for QueryParams {
    fn from(values: Vec<RowValues>) -> Self {
        if values.is_empty() {
            QueryParams::None
        } else {
            QueryParams::Positional(values)
        }
    }
}

impl From<&[RowValues]> for QueryParams {
    fn from(values: &[RowValues]) -> Self {
        QueryParams::from(values.to_vec())
    }
}

impl<K: Into<String>> From<Vec<(K, RowValues)>> for QueryParams {
    fn from(entries: Vec<(K, RowValues)>) -> Self {
        entries
            .into_iter()
            .fold(QueryParams::named(), |bag, (name, value)| bag.bind(name, value))
    }
}

/// Strip a single leading sigil from a parameter name.
#[must_use]
pub(crate) fn normalize_param_name(name: &str) -> &str {
    name.strip_prefix(NAMED_SIGILS).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_sigils_and_case() {
        let params = QueryParams::named().bind("@Name", "Flint");
        assert_eq!(params.lookup(":name"), Some(&RowValues::Text("Flint".into())));
        assert_eq!(params.lookup("NAME"), Some(&RowValues::Text("Flint".into())));
        assert_eq!(params.lookup("habitat"), None);
    }

    #[test]
    fn rebinding_replaces_value() {
        let params = QueryParams::named()
            .bind("Name", "Flint")
            .bind("@name", "Boo");
        assert_eq!(params.len(), 1);
        assert_eq!(params.lookup("Name"), Some(&RowValues::Text("Boo".into())));
    }

    #[test]
    fn empty_vec_is_no_params() {
        assert_eq!(QueryParams::from(Vec::<RowValues>::new()), QueryParams::None);
        assert!(QueryParams::None.is_empty());
    }
}
