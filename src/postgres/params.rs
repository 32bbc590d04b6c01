use std::error::Error;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use tokio_util::bytes;

use crate::error::RowDocError;
use crate::params::{QueryParams, normalize_param_name};
use crate::translation::bind_named_placeholders;
use crate::types::{CommandType, RowValues};

/// `name` or `schema.name`, unquoted.
static ROUTINE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("routine name pattern compiles")
});

impl ToSql for RowValues {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            RowValues::Int(i) => match *ty {
                Type::INT2 => i16::try_from(*i)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*i)?.to_sql(ty, out),
                #[allow(clippy::cast_precision_loss)]
                Type::FLOAT8 => (*i as f64).to_sql(ty, out),
                _ => (*i).to_sql(ty, out),
            },
            RowValues::Float(f) => match *ty {
                #[allow(clippy::cast_possible_truncation)]
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                _ => (*f).to_sql(ty, out),
            },
            RowValues::Text(s) => s.to_sql(ty, out),
            RowValues::Bool(b) => (*b).to_sql(ty, out),
            RowValues::Timestamp(dt) => match *ty {
                Type::TIMESTAMPTZ => {
                    DateTime::<Utc>::from_naive_utc_and_offset(*dt, Utc).to_sql(ty, out)
                }
                Type::DATE => dt.date().to_sql(ty, out),
                _ => dt.to_sql(ty, out),
            },
            RowValues::Null => Ok(IsNull::Yes),
            RowValues::JSON(jsval) => jsval.to_sql(ty, out),
            RowValues::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

/// SQL text and positional values ready for `tokio-postgres`.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCall {
    pub sql: String,
    pub values: Vec<RowValues>,
}

/// Turn SQL text or a routine name plus a parameter bag into positional form.
///
/// Text commands keep `$N` placeholders as written; named values fill `@name` /
/// `:name` placeholders, which are renumbered. A stored procedure becomes
/// `SELECT * FROM routine(...)`, with named values passed as `name => $N`.
///
/// # Errors
/// Returns `RowDocError::ParameterError` for a placeholder with no value or an
/// invalid routine or argument name.
pub fn prepare_call(
    sql: &str,
    params: QueryParams,
    command_type: CommandType,
) -> Result<PreparedCall, RowDocError> {
    match command_type {
        CommandType::Text => prepare_text(sql, params),
        CommandType::StoredProcedure => prepare_routine(sql, params),
    }
}

fn prepare_text(sql: &str, params: QueryParams) -> Result<PreparedCall, RowDocError> {
    match params {
        QueryParams::None => Ok(PreparedCall {
            sql: sql.to_owned(),
            values: Vec::new(),
        }),
        QueryParams::Positional(values) => Ok(PreparedCall {
            sql: sql.to_owned(),
            values,
        }),
        named @ QueryParams::Named(_) => {
            let bound = bind_named_placeholders(sql);
            let values = bound
                .names
                .iter()
                .map(|name| {
                    named.lookup(name).cloned().ok_or_else(|| {
                        RowDocError::ParameterError(format!("no value supplied for @{name}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PreparedCall {
                sql: bound.sql.into_owned(),
                values,
            })
        }
    }
}

fn prepare_routine(name: &str, params: QueryParams) -> Result<PreparedCall, RowDocError> {
    let name = name.trim();
    if !ROUTINE_NAME.is_match(name) {
        return Err(RowDocError::ParameterError(format!(
            "'{name}' is not a valid routine name"
        )));
    }

    let mut args = Vec::with_capacity(params.len());
    let values = match params {
        QueryParams::None => Vec::new(),
        QueryParams::Positional(values) => {
            args.extend((1..=values.len()).map(|n| format!("${n}")));
            values
        }
        QueryParams::Named(entries) => {
            let mut values = Vec::with_capacity(entries.len());
            for (n, (arg, value)) in entries.into_iter().enumerate() {
                let arg = normalize_param_name(&arg);
                if !ROUTINE_NAME.is_match(arg) || arg.contains('.') {
                    return Err(RowDocError::ParameterError(format!(
                        "'{arg}' is not a valid argument name"
                    )));
                }
                args.push(format!("{arg} => ${}", n + 1));
                values.push(value);
            }
            values
        }
    };

    Ok(PreparedCall {
        sql: format!("SELECT * FROM {name}({})", args.join(", ")),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_text_params_are_renumbered() {
        let params = QueryParams::named()
            .bind("Habitat", "Monstropolis")
            .bind("name", "Boo")
            .bind("unused", 3i64);
        let call = prepare_call(
            "SELECT * FROM SimpleMonsters WHERE Name = @Name AND Habitat = :habitat",
            params,
            CommandType::Text,
        )
        .unwrap();
        assert_eq!(
            call.sql,
            "SELECT * FROM SimpleMonsters WHERE Name = $1 AND Habitat = $2"
        );
        assert_eq!(
            call.values,
            vec![
                RowValues::Text("Boo".into()),
                RowValues::Text("Monstropolis".into())
            ]
        );
    }

    #[test]
    fn missing_named_value_is_a_parameter_error() {
        let err = prepare_call(
            "SELECT * FROM SimpleMonsters WHERE Name = @name",
            QueryParams::named().bind("habitat", "x"),
            CommandType::Text,
        )
        .unwrap_err();
        assert!(matches!(err, RowDocError::ParameterError(msg) if msg.contains("@name")));
    }

    #[test]
    fn positional_routine_call() {
        let call = prepare_call(
            "monsters.by_habitat",
            QueryParams::from(vec![RowValues::Text("Pit".into()), RowValues::Int(2)]),
            CommandType::StoredProcedure,
        )
        .unwrap();
        assert_eq!(call.sql, "SELECT * FROM monsters.by_habitat($1, $2)");
        assert_eq!(call.values.len(), 2);
    }

    #[test]
    fn named_routine_call() {
        let call = prepare_call(
            "get_monster",
            QueryParams::named().bind("@id", 7i64),
            CommandType::StoredProcedure,
        )
        .unwrap();
        assert_eq!(call.sql, "SELECT * FROM get_monster(id => $1)");
        assert_eq!(call.values, vec![RowValues::Int(7)]);

        let call = prepare_call("list_monsters", QueryParams::None, CommandType::StoredProcedure)
            .unwrap();
        assert_eq!(call.sql, "SELECT * FROM list_monsters()");
    }

    #[test]
    fn routine_names_are_validated() {
        for bad in ["drop table x; --", "a.b.c", "1monster", ""] {
            let err = prepare_call(bad, QueryParams::None, CommandType::StoredProcedure)
                .unwrap_err();
            assert!(matches!(err, RowDocError::ParameterError(_)), "{bad}");
        }
        let err = prepare_call(
            "get_monster",
            QueryParams::named().bind("id; drop", 1i64),
            CommandType::StoredProcedure,
        )
        .unwrap_err();
        assert!(matches!(err, RowDocError::ParameterError(_)));
    }
}
