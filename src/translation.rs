//! SQL placeholder scanning.
//!
//! Two rewrites share one scanner that skips quoted strings, quoted identifiers,
//! comments and dollar-quoted blocks:
//! - [`translate_placeholders`] converts between Postgres `$N` and SQLite `?N`.
//! - [`bind_named_placeholders`] turns `@name` / `:name` into `$N` for drivers that only
//!   bind by position.

use std::borrow::Cow;

mod parsers;
mod scanner;

use scanner::{Splice, rewrite, scan_digits, scan_identifier};

/// Target placeholder style for translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// PostgreSQL-style placeholders like `$1`.
    Postgres,
    /// SQLite-style placeholders like `?1`.
    Sqlite,
}

/// How to resolve translation for a call relative to the pool default.
///
/// ```rust
/// use sql_rowdoc::prelude::*;
///
/// let options = QueryOptions::default().with_translation(TranslationMode::ForceOn);
/// # let _ = options;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslationMode {
    /// Follow the pool's default setting.
    #[default]
    PoolDefault,
    /// Force translation on, regardless of pool default.
    ForceOn,
    /// Force translation off, regardless of pool default.
    ForceOff,
}

impl TranslationMode {
    #[must_use]
    pub fn resolve(self, pool_default: bool) -> bool {
        match self {
            TranslationMode::PoolDefault => pool_default,
            TranslationMode::ForceOn => true,
            TranslationMode::ForceOff => false,
        }
    }
}

/// Translate placeholders between Postgres-style `$N` and SQLite-style `?N`.
///
/// Placeholders inside literals, comments and dollar-quoted blocks are left alone.
/// Returns a borrowed `Cow` when no changes are needed.
///
/// ```rust
/// use sql_rowdoc::translation::{PlaceholderStyle, translate_placeholders};
///
/// let sql = translate_placeholders("SELECT Name FROM SimpleMonsters WHERE Id = $1", PlaceholderStyle::Sqlite, true);
/// assert_eq!(sql, "SELECT Name FROM SimpleMonsters WHERE Id = ?1");
/// ```
#[must_use]
pub fn translate_placeholders(sql: &str, target: PlaceholderStyle, enabled: bool) -> Cow<'_, str> {
    if !enabled {
        return Cow::Borrowed(sql);
    }
    let (from, to) = match target {
        PlaceholderStyle::Sqlite => (b'$', '?'),
        PlaceholderStyle::Postgres => (b'?', '$'),
    };
    rewrite(sql, |bytes, idx| {
        if bytes[idx] != from {
            return None;
        }
        let (end, digits) = scan_digits(bytes, idx + 1)?;
        let mut text = String::with_capacity(digits.len() + 1);
        text.push(to);
        text.push_str(digits);
        Some(Splice { end, text })
    })
}

/// SQL rewritten for positional binding, plus the parameter names in `$N` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBinding<'a> {
    pub sql: Cow<'a, str>,
    /// Names without their sigil, as first written in the SQL.
    pub names: Vec<String>,
}

/// Rewrite `@name` and `:name` placeholders to `$1`, `$2`, ... in order of first use.
///
/// A name used twice (in any ASCII case) reuses its number. Postgres casts (`::type`)
/// are not placeholders.
///
/// ```rust
/// use sql_rowdoc::translation::bind_named_placeholders;
///
/// let bound = bind_named_placeholders("SELECT * FROM SimpleMonsters WHERE Name = @name OR Habitat = @NAME");
/// assert_eq!(bound.sql, "SELECT * FROM SimpleMonsters WHERE Name = $1 OR Habitat = $1");
/// assert_eq!(bound.names, ["name"]);
/// ```
#[must_use]
pub fn bind_named_placeholders(sql: &str) -> NamedBinding<'_> {
    let mut names: Vec<String> = Vec::new();
    let sql = rewrite(sql, |bytes, idx| {
        let sigil = bytes[idx];
        if sigil != b'@' && sigil != b':' {
            return None;
        }
        if sigil == b':' && (idx > 0 && bytes[idx - 1] == b':' || bytes.get(idx + 1) == Some(&b':'))
        {
            return None;
        }
        let (end, ident) = scan_identifier(bytes, idx + 1)?;
        let position = match names.iter().position(|n| n.eq_ignore_ascii_case(ident)) {
            Some(existing) => existing + 1,
            None => {
                names.push(ident.to_string());
                names.len()
            }
        };
        Some(Splice {
            end,
            text: format!("${position}"),
        })
    });
    NamedBinding { sql, names }
}

/// Highest `$N` placeholder number in `sql`, or 0 when there is none.
#[must_use]
pub fn max_positional_placeholder(sql: &str) -> usize {
    let mut max = 0usize;
    let _ = rewrite(sql, |bytes, idx| {
        if bytes[idx] == b'$'
            && let Some((_, digits)) = scan_digits(bytes, idx + 1)
            && let Ok(n) = digits.parse::<usize>()
        {
            max = max.max(n);
        }
        None
    });
    max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_sqlite_to_postgres() {
        let sql = "select * from t where a = ?1 and b = ?2";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres, true);
        assert_eq!(res, "select * from t where a = $1 and b = $2");
    }

    #[test]
    fn translates_postgres_to_sqlite() {
        let sql = "insert into t values($1, $2)";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite, true);
        assert_eq!(res, "insert into t values(?1, ?2)");
    }

    #[test]
    fn skips_inside_literals_and_comments() {
        let sql = "select '?1', $1 -- $2\n/* ?3 */ from t where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite, true);
        assert_eq!(res, "select '?1', ?1 -- $2\n/* ?3 */ from t where a = ?1");
    }

    #[test]
    fn skips_dollar_quoted_blocks() {
        let sql = "$foo$ select $1 from t $foo$ where a = $1";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite, true);
        assert_eq!(res, "$foo$ select $1 from t $foo$ where a = ?1");
    }

    #[test]
    fn multibyte_text_is_preserved() {
        let sql = "select 'Бу 👻' as s, $1 as name where x = '$2'";
        let res = translate_placeholders(sql, PlaceholderStyle::Sqlite, true);
        assert_eq!(res, "select 'Бу 👻' as s, ?1 as name where x = '$2'");
    }

    #[test]
    fn respects_disabled_flag() {
        let sql = "select * from t where a = ?1";
        let res = translate_placeholders(sql, PlaceholderStyle::Postgres, false);
        assert!(matches!(res, Cow::Borrowed(_)));
        assert_eq!(res, sql);
    }

    #[test]
    fn translation_mode_resolution() {
        assert!(TranslationMode::ForceOn.resolve(false));
        assert!(!TranslationMode::ForceOff.resolve(true));
        assert!(TranslationMode::PoolDefault.resolve(true));
        assert!(!TranslationMode::PoolDefault.resolve(false));
    }

    #[test]
    fn named_placeholders_number_in_first_use_order() {
        let bound = bind_named_placeholders(
            "UPDATE SimpleMonsters SET Habitat = :habitat WHERE Name = @Name AND Habitat <> :Habitat",
        );
        assert_eq!(
            bound.sql,
            "UPDATE SimpleMonsters SET Habitat = $1 WHERE Name = $2 AND Habitat <> $1"
        );
        assert_eq!(bound.names, ["habitat", "Name"]);
    }

    #[test]
    fn casts_and_literals_are_not_named_placeholders() {
        let bound = bind_named_placeholders(
            "select '2020-01-01'::date, @id::int, ':nope', \"@col\" -- @skip\n from t",
        );
        assert_eq!(
            bound.sql,
            "select '2020-01-01'::date, $1::int, ':nope', \"@col\" -- @skip\n from t"
        );
        assert_eq!(bound.names, ["id"]);
    }

    #[test]
    fn no_named_placeholders_borrows() {
        let bound = bind_named_placeholders("select 1");
        assert!(matches!(bound.sql, Cow::Borrowed(_)));
        assert!(bound.names.is_empty());
    }

    #[test]
    fn highest_positional_placeholder() {
        assert_eq!(max_positional_placeholder("select $1, $3, '$9'"), 3);
        assert_eq!(max_positional_placeholder("select 1"), 0);
    }
}
