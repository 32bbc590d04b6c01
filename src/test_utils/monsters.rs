//! The `SimpleMonsters` / `MonsterAliases` fixture.
//!
//! Identifiers are quoted so both backends report the same PascalCase column names,
//! which is what the serde models below expect.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::RowDocError;
use crate::params::QueryParams;
use crate::pool::MiddlewarePoolConnection;
use crate::types::DatabaseType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SimpleMonster {
    pub id: i64,
    pub name: String,
    pub scary_sound: Option<String>,
    pub habitat: Option<String>,
}

impl SimpleMonster {
    /// A monster not yet stored; `id` is assigned on insert.
    #[must_use]
    pub fn new(name: &str, scary_sound: Option<&str>, habitat: Option<&str>) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            scary_sound: scary_sound.map(str::to_string),
            habitat: habitat.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MonsterAlias {
    pub id: i64,
    pub name: String,
    pub simple_monster_id: i64,
}

/// Name, scary sound, habitat and alias of every seeded monster, in insert order.
pub const SEED_MONSTERS: [(&str, Option<&str>, Option<&str>, Option<&str>); 10] = [
    ("Cookie Monster", Some("yum!"), Some("Garbage Can"), None),
    ("Flint", Some("ooooooo!"), Some("Shadows"), None),
    ("The Grinch", Some("sooo"), Some("Garbage Dump"), None),
    ("Mike Wazowski", Some("Blah"), Some("Opera House"), None),
    ("James P. Sullivan", Some("blah blah"), Some("Hawaii"), Some("Sully")),
    ("Celia Mae", None, None, Some("Celia")),
    ("Boo", None, None, None),
    ("Randall", None, None, None),
    ("Roz", None, None, None),
    ("Henry J. Waternoose", None, None, None),
];

#[cfg(feature = "sqlite")]
const SQLITE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "SimpleMonsters" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Name" TEXT NOT NULL,
    "ScarySound" TEXT,
    "Habitat" TEXT
);
CREATE TABLE IF NOT EXISTS "MonsterAliases" (
    "Id" INTEGER PRIMARY KEY AUTOINCREMENT,
    "Name" TEXT NOT NULL,
    "SimpleMonsterId" INTEGER NOT NULL REFERENCES "SimpleMonsters"("Id") ON DELETE CASCADE
);
"#;

#[cfg(feature = "postgres")]
const POSTGRES_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS "SimpleMonsters" (
    "Id" BIGSERIAL PRIMARY KEY,
    "Name" TEXT NOT NULL,
    "ScarySound" TEXT,
    "Habitat" TEXT
);
CREATE TABLE IF NOT EXISTS "MonsterAliases" (
    "Id" BIGSERIAL PRIMARY KEY,
    "Name" TEXT NOT NULL,
    "SimpleMonsterId" BIGINT NOT NULL REFERENCES "SimpleMonsters"("Id") ON DELETE CASCADE
);
"#;

const SELECT_MONSTERS: &str =
    r#"SELECT "Id", "Name", "ScarySound", "Habitat" FROM "SimpleMonsters""#;

/// Create both fixture tables if they do not exist.
///
/// # Errors
/// Returns the driver error if the DDL fails.
pub async fn create_schema(conn: &MiddlewarePoolConnection) -> Result<(), RowDocError> {
    let ddl = match conn.database_type() {
        #[cfg(feature = "sqlite")]
        DatabaseType::Sqlite => SQLITE_SCHEMA,
        #[cfg(feature = "postgres")]
        DatabaseType::Postgres => POSTGRES_SCHEMA,
    };
    conn.execute_batch(ddl).await
}

/// Insert the ten fixture monsters and their aliases; returns the stored monsters.
///
/// # Errors
/// Propagates insert failures.
pub async fn seed_monsters(
    conn: &MiddlewarePoolConnection,
) -> Result<Vec<SimpleMonster>, RowDocError> {
    let mut stored = Vec::with_capacity(SEED_MONSTERS.len());
    for (name, sound, habitat, alias) in SEED_MONSTERS {
        let mut monster = SimpleMonster::new(name, sound, habitat);
        monster.id = insert_monster(conn, &monster).await?;
        if let Some(alias) = alias {
            insert_alias(conn, monster.id, alias).await?;
        }
        stored.push(monster);
    }
    tracing::debug!(count = stored.len(), "seeded monsters");
    Ok(stored)
}

/// Insert a monster and return its new id; `monster.id` is ignored.
///
/// # Errors
/// Propagates driver errors, or `RowDocError::ExecutionError` if no id comes back.
pub async fn insert_monster(
    conn: &MiddlewarePoolConnection,
    monster: &SimpleMonster,
) -> Result<i64, RowDocError> {
    let row = conn
        .query(
            r#"INSERT INTO "SimpleMonsters" ("Name", "ScarySound", "Habitat")
               VALUES (@Name, @ScarySound, @Habitat) RETURNING "Id""#,
        )
        .params(monster_params(monster))
        .first_object()
        .await?;
    returned_id(&row)
}

/// Attach an alias to a stored monster and return the alias id.
///
/// # Errors
/// Propagates driver errors.
pub async fn insert_alias(
    conn: &MiddlewarePoolConnection,
    simple_monster_id: i64,
    name: &str,
) -> Result<i64, RowDocError> {
    let row = conn
        .query(
            r#"INSERT INTO "MonsterAliases" ("Name", "SimpleMonsterId")
               VALUES (@Name, @SimpleMonsterId) RETURNING "Id""#,
        )
        .bind("Name", name)
        .bind("SimpleMonsterId", simple_monster_id)
        .first_object()
        .await?;
    returned_id(&row)
}

/// Fetch one monster by id; `None` when it does not exist.
///
/// # Errors
/// Propagates driver and deserialization errors.
pub async fn get_monster(
    conn: &MiddlewarePoolConnection,
    id: i64,
) -> Result<Option<SimpleMonster>, RowDocError> {
    let sql = format!(r#"{SELECT_MONSTERS} WHERE "Id" = @Id"#);
    match conn.query(&sql).bind("Id", id).first_object().await {
        Ok(node) => Ok(Some(serde_json::from_value(JsonValue::Object(node))?)),
        Err(RowDocError::RowNotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Every monster ordered by id.
///
/// # Errors
/// Propagates driver and deserialization errors.
pub async fn get_all_monsters(
    conn: &MiddlewarePoolConnection,
) -> Result<Vec<SimpleMonster>, RowDocError> {
    let sql = format!(r#"{SELECT_MONSTERS} ORDER BY "Id""#);
    conn.query(&sql)
        .to_objects()
        .await?
        .into_iter()
        .map(|node| serde_json::from_value(JsonValue::Object(node)).map_err(RowDocError::from))
        .collect()
}

/// Aliases of one monster ordered by id.
///
/// # Errors
/// Propagates driver and deserialization errors.
pub async fn get_aliases(
    conn: &MiddlewarePoolConnection,
    simple_monster_id: i64,
) -> Result<Vec<MonsterAlias>, RowDocError> {
    let array = conn
        .query(
            r#"SELECT "Id", "Name", "SimpleMonsterId" FROM "MonsterAliases"
               WHERE "SimpleMonsterId" = @Id ORDER BY "Id""#,
        )
        .bind("Id", simple_monster_id)
        .to_array()
        .await?;
    Ok(serde_json::from_value(array)?)
}

/// Overwrite a stored monster's columns; returns the affected row count.
///
/// # Errors
/// Propagates driver errors.
pub async fn update_monster(
    conn: &MiddlewarePoolConnection,
    monster: &SimpleMonster,
) -> Result<usize, RowDocError> {
    conn.query(
        r#"UPDATE "SimpleMonsters"
           SET "Name" = @Name, "ScarySound" = @ScarySound, "Habitat" = @Habitat
           WHERE "Id" = @Id"#,
    )
    .params(monster_params(monster).bind("Id", monster.id))
    .execute()
    .await
}

/// Delete one monster (and, by cascade, its aliases); returns the affected row count.
///
/// # Errors
/// Propagates driver errors.
pub async fn delete_monster(conn: &MiddlewarePoolConnection, id: i64) -> Result<usize, RowDocError> {
    conn.query(r#"DELETE FROM "MonsterAliases" WHERE "SimpleMonsterId" = @Id"#)
        .bind("Id", id)
        .execute()
        .await?;
    conn.query(r#"DELETE FROM "SimpleMonsters" WHERE "Id" = @Id"#)
        .bind("Id", id)
        .execute()
        .await
}

/// Empty both tables; returns how many monsters were removed.
///
/// # Errors
/// Propagates driver errors.
pub async fn delete_all_monsters(conn: &MiddlewarePoolConnection) -> Result<usize, RowDocError> {
    conn.query(r#"DELETE FROM "MonsterAliases""#).execute().await?;
    conn.query(r#"DELETE FROM "SimpleMonsters""#).execute().await
}

fn monster_params(monster: &SimpleMonster) -> QueryParams {
    QueryParams::named()
        .bind("Name", monster.name.as_str())
        .bind("ScarySound", monster.scary_sound.as_deref())
        .bind("Habitat", monster.habitat.as_deref())
}

fn returned_id(row: &crate::convert::ObjectNode) -> Result<i64, RowDocError> {
    row.get("Id").and_then(JsonValue::as_i64).ok_or_else(|| {
        RowDocError::ExecutionError("insert did not return a numeric \"Id\"".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_list_matches_fixture_suite() {
        assert_eq!(SEED_MONSTERS.len(), 10);
        let aliased: Vec<_> = SEED_MONSTERS
            .iter()
            .filter_map(|(name, _, _, alias)| alias.map(|a| (*name, a)))
            .collect();
        assert_eq!(aliased, vec![("James P. Sullivan", "Sully"), ("Celia Mae", "Celia")]);
    }

    #[test]
    fn monster_serializes_with_column_names() {
        let monster = SimpleMonster::new("Boo", None, None);
        let value = serde_json::to_value(&monster).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"Id": 0, "Name": "Boo", "ScarySound": null, "Habitat": null})
        );
    }
}
