#![cfg(feature = "sqlite")]

mod common;

use sql_rowdoc::prelude::*;
use sql_rowdoc::test_utils::monsters::{self, SimpleMonster};

use common::monster_db;

#[tokio::test]
async fn seeding_stores_ten_monsters_and_two_aliases() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let all = monsters::get_all_monsters(&conn).await?;
    assert_eq!(all, db.seeded);
    assert_eq!(all.len(), 10);

    let sully = monsters::get_aliases(&conn, db.id_of("James P. Sullivan")).await?;
    assert_eq!(sully.len(), 1);
    assert_eq!(sully[0].name, "Sully");
    assert_eq!(sully[0].simple_monster_id, db.id_of("James P. Sullivan"));

    let celia = monsters::get_aliases(&conn, db.id_of("Celia Mae")).await?;
    assert_eq!(celia[0].name, "Celia");
    assert!(monsters::get_aliases(&conn, db.id_of("Boo")).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn insert_and_get_round_trip() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let mut godzilla = SimpleMonster::new("Godzilla", Some("undescribable"), Some("Japan"));
    godzilla.id = monsters::insert_monster(&conn, &godzilla).await?;
    assert!(godzilla.id > 0);

    let stored = monsters::get_monster(&conn, godzilla.id).await?;
    assert_eq!(stored, Some(godzilla));
    assert_eq!(monsters::get_monster(&conn, -1).await?, None);
    Ok(())
}

#[tokio::test]
async fn update_changes_one_monster() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let mut first = monsters::get_all_monsters(&conn).await?.remove(0);
    first.scary_sound = Some("My mother is coming to stay with us for a month".into());
    assert_eq!(monsters::update_monster(&conn, &first).await?, 1);

    let reread = monsters::get_monster(&conn, first.id).await?;
    assert_eq!(reread, Some(first));
    Ok(())
}

#[tokio::test]
async fn deletes_remove_monsters_and_aliases() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let sully = db.id_of("James P. Sullivan");
    assert_eq!(monsters::delete_monster(&conn, sully).await?, 1);
    assert_eq!(monsters::get_monster(&conn, sully).await?, None);
    assert!(monsters::get_aliases(&conn, sully).await?.is_empty());

    assert_eq!(monsters::delete_all_monsters(&conn).await?, 9);
    assert!(monsters::get_all_monsters(&conn).await?.is_empty());
    assert_eq!(
        conn.query(r#"SELECT * FROM "SimpleMonsters""#).to_json_string().await?,
        "[]"
    );
    Ok(())
}
