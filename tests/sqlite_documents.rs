#![cfg(feature = "sqlite")]

mod common;

use std::io::{Cursor, Read};

use serde_json::{Value, json};
use sql_rowdoc::decode;
use sql_rowdoc::prelude::*;

use common::monster_db;

const FLINT_OR_BOO: &str = r#"SELECT "Name", "Habitat" FROM "SimpleMonsters"
    WHERE "Name" IN ('Flint', 'Boo') ORDER BY "Id""#;

fn upper_case() -> FnConverter {
    FnConverter::text("upper", |s| s.to_uppercase())
}

#[tokio::test]
async fn rows_become_a_json_array() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let text = conn.query(FLINT_OR_BOO).to_json_string().await?;
    assert_eq!(
        text,
        r#"[{"Name":"Flint","Habitat":"Shadows"},{"Name":"Boo","Habitat":null}]"#
    );
    Ok(())
}

#[tokio::test]
async fn every_output_path_carries_the_same_document() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let node = conn.query(FLINT_OR_BOO).to_array().await?;

    let mut stream = conn.query(FLINT_OR_BOO).to_json_stream().await?;
    assert_eq!(stream.position(), 0);
    let mut text = String::new();
    stream.read_to_string(&mut text)?;
    assert_eq!(decode::json_str(&text)?, node);

    let bytes = conn.query(FLINT_OR_BOO).to_bson_bytes().await?;
    assert_eq!(decode::bson_array(bytes.as_slice())?, node);

    let bson_stream = conn.query(FLINT_OR_BOO).to_bson_stream().await?;
    assert_eq!(bson_stream.position(), 0);
    assert_eq!(bson_stream.get_ref(), &bytes);

    let base64 = conn.query(FLINT_OR_BOO).to_bson_base64().await?;
    assert_eq!(decode::base64_bytes(&base64)?, bytes);
    Ok(())
}

#[tokio::test]
async fn null_column_survives_bson() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let bytes = conn
        .query(r#"SELECT "Name", "Habitat" FROM "SimpleMonsters" WHERE "Name" = 'Boo'"#)
        .first_bson_bytes()
        .await?;
    let boo = decode::bson_object(bytes.as_slice())?;
    assert_eq!(boo.get("Name"), Some(&json!("Boo")));
    assert_eq!(boo.get("Habitat"), Some(&Value::Null));
    Ok(())
}

#[tokio::test]
async fn converter_applies_on_every_path() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let expected = json!([
        {"Name": "FLINT", "Habitat": "SHADOWS"},
        {"Name": "BOO", "Habitat": null},
    ]);

    let text = conn
        .query(FLINT_OR_BOO)
        .converter(upper_case())
        .to_json_string()
        .await?;
    assert_eq!(decode::json_str(&text)?, expected);

    let stream = conn
        .query(FLINT_OR_BOO)
        .converter(upper_case())
        .to_json_stream()
        .await?;
    assert_eq!(decode::json_reader(stream, TextEncoding::Utf8)?, expected);

    let bytes = conn
        .query(FLINT_OR_BOO)
        .converter(upper_case())
        .to_bson_bytes()
        .await?;
    assert_eq!(decode::bson_array(bytes.as_slice())?, expected);
    Ok(())
}

#[tokio::test]
async fn converter_applies_when_unbuffered() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let query = |buffered: bool| {
        conn.query(FLINT_OR_BOO)
            .converter(upper_case())
            .buffered(buffered)
    };

    let text = query(false).to_json_string().await?;
    assert_eq!(
        text,
        r#"[{"Name":"FLINT","Habitat":"SHADOWS"},{"Name":"BOO","Habitat":null}]"#
    );
    assert_eq!(text, query(true).to_json_string().await?);

    let mut streamed = String::new();
    query(false).to_json_stream().await?.read_to_string(&mut streamed)?;
    assert_eq!(streamed, text);

    assert_eq!(
        query(false).to_bson_bytes().await?,
        query(true).to_bson_bytes().await?
    );
    Ok(())
}

#[tokio::test]
async fn empty_result_is_an_empty_array() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let sql = r#"SELECT "Name" FROM "SimpleMonsters" WHERE "Name" = 'Sasquatch'"#;

    assert_eq!(conn.query(sql).to_json_string().await?, "[]");
    assert!(conn.query(sql).to_objects().await?.is_empty());
    let bytes = conn.query(sql).to_bson_bytes().await?;
    assert_eq!(decode::bson_array(bytes.as_slice())?, json!([]));
    Ok(())
}

#[tokio::test]
async fn single_row_terminals_report_cardinality() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let missing = conn
        .query(r#"SELECT * FROM "SimpleMonsters" WHERE "Name" = 'Sasquatch'"#)
        .first_json_string()
        .await;
    assert!(matches!(missing, Err(RowDocError::RowNotFound)));

    let all = r#"SELECT "Name" FROM "SimpleMonsters" ORDER BY "Id""#;
    let first = conn.query(all).first_object().await?;
    assert_eq!(first.get("Name"), Some(&json!("Cookie Monster")));

    let strict = conn
        .query(all)
        .single_row(SingleRowMode::Exactly)
        .first_bson_base64()
        .await;
    match strict {
        Err(err @ RowDocError::MultipleRowsFound(n)) => {
            assert_eq!(n, 10);
            assert!(err.is_cardinality());
        }
        other => panic!("expected MultipleRowsFound, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn first_paths_agree() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let sql = r#"SELECT "Id", "Name", "ScarySound" FROM "SimpleMonsters" WHERE "Name" = 'Flint'"#;

    let node = Value::Object(conn.query(sql).first_object().await?);
    assert_eq!(node["ScarySound"], json!("ooooooo!"));
    assert_eq!(node["Id"], json!(db.id_of("Flint")));

    let text = conn.query(sql).first_json_string().await?;
    assert_eq!(decode::json_str(&text)?, node);

    let stream = conn.query(sql).first_json_stream().await?;
    assert_eq!(decode::json_reader(stream, TextEncoding::Utf8)?, node);

    let bson = conn.query(sql).first_bson_stream().await?;
    assert_eq!(Value::Object(decode::bson_object(bson)?), node);

    let base64 = conn.query(sql).first_bson_base64().await?;
    let bytes = decode::base64_bytes(&base64)?;
    assert_eq!(Value::Object(decode::bson_object(bytes.as_slice())?), node);
    Ok(())
}

#[tokio::test]
async fn unbuffered_matches_buffered() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let sql = r#"SELECT * FROM "SimpleMonsters" ORDER BY "Id""#;

    let buffered = conn.query(sql).to_json_string().await?;
    let streamed = conn.query(sql).buffered(false).to_json_string().await?;
    assert_eq!(buffered, streamed);

    let rows = conn.query(sql).buffered(false).to_objects().await?;
    assert_eq!(rows.len(), 10);
    Ok(())
}

#[tokio::test]
async fn utf16_stream_decodes_to_the_same_rows() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let utf8 = conn.query(FLINT_OR_BOO).to_array().await?;
    let stream = conn
        .query(FLINT_OR_BOO)
        .encoding(TextEncoding::Utf16Le)
        .to_json_stream()
        .await?;
    // two bytes per code unit, no BOM
    assert_eq!(stream.get_ref()[..2], [b'[', 0]);
    assert_eq!(decode::json_reader(stream, TextEncoding::Utf16Le)?, utf8);

    let text = conn
        .query(FLINT_OR_BOO)
        .encoding(TextEncoding::Utf16Be)
        .to_json_string()
        .await?;
    assert_eq!(decode::json_str(&text)?, utf8);
    Ok(())
}

#[tokio::test]
async fn caller_sinks_are_rewound() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let mut json_sink = Cursor::new(Vec::new());
    conn.query(FLINT_OR_BOO).write_json_to(&mut json_sink).await?;
    assert_eq!(json_sink.position(), 0);

    let mut bson_sink = Cursor::new(Vec::new());
    conn.query(FLINT_OR_BOO).write_bson_to(&mut bson_sink).await?;
    assert_eq!(bson_sink.position(), 0);
    assert_eq!(
        decode::bson_array(bson_sink)?,
        decode::json_reader(json_sink, TextEncoding::Utf8)?
    );
    Ok(())
}

#[tokio::test]
async fn latin1_rejects_characters_it_cannot_hold() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;

    let ok = conn
        .query("SELECT 'Café' AS \"Spot\"")
        .encoding(TextEncoding::Latin1)
        .to_json_stream()
        .await?;
    assert_eq!(ok.get_ref().len(), r#"[{"Spot":"Café"}]"#.chars().count());

    let ghost = conn
        .query("SELECT '👻' AS \"Spot\"")
        .encoding(TextEncoding::Latin1)
        .to_json_string()
        .await;
    assert!(matches!(ghost, Err(RowDocError::EncodingError(_))));
    Ok(())
}

#[tokio::test]
async fn blobs_and_embedded_json() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let sql = r#"SELECT X'DEADBEEF' AS "Scale", '{"teeth":40}' AS "Stats""#;

    let plain = conn.query(sql).first_object().await?;
    assert_eq!(plain["Scale"], json!("3q2+7w=="));
    assert_eq!(plain["Stats"], json!(r#"{"teeth":40}"#));

    let converted = conn
        .query(sql)
        .converter(BlobHexConverter)
        .converter(EmbeddedJsonConverter::new(&["Stats"]))
        .first_object()
        .await?;
    assert_eq!(converted["Scale"], json!("deadbeef"));
    assert_eq!(converted["Stats"], json!({"teeth": 40}));
    Ok(())
}

#[tokio::test]
async fn mistyped_column_is_an_error_on_every_connection() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let first = db.connection().await?;
    let second = db.connection().await?;
    let sql = r#"SELECT "Nmae" FROM "SimpleMonsters""#;

    for conn in [&first, &second] {
        let typo = conn.query(sql).to_json_string().await;
        assert!(matches!(typo, Err(RowDocError::SqliteError(_))), "{typo:?}");
    }
    Ok(())
}

#[tokio::test]
async fn invalid_utf8_text_is_an_encoding_error() -> Result<(), RowDocError> {
    let db = monster_db().await?;
    let conn = db.connection().await?;
    let sql = r#"SELECT CAST(X'FF41' AS TEXT) AS "Garbled""#;

    for buffered in [true, false] {
        match conn.query(sql).buffered(buffered).to_json_string().await {
            Err(RowDocError::EncodingError(msg)) => assert!(msg.contains("Garbled"), "{msg}"),
            other => panic!("expected EncodingError, got {other:?}"),
        }
    }
    let single = conn.query(sql).first_object().await;
    assert!(matches!(single, Err(RowDocError::EncodingError(_))));
    Ok(())
}
