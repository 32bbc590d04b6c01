#![allow(dead_code)]

use sql_rowdoc::prelude::*;
use sql_rowdoc::test_utils::monsters::{self, SimpleMonster};
use tempfile::TempDir;

/// A seeded monster database in its own temp directory, removed on drop.
pub struct MonsterDb {
    pub cap: ConfigAndPool,
    pub seeded: Vec<SimpleMonster>,
    _dir: TempDir,
}

impl MonsterDb {
    pub async fn connection(&self) -> Result<MiddlewarePoolConnection, RowDocError> {
        self.cap.get_connection().await
    }

    pub fn id_of(&self, name: &str) -> i64 {
        self.seeded
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.id)
            .unwrap_or_else(|| panic!("{name} is not seeded"))
    }
}

pub async fn monster_db() -> Result<MonsterDb, RowDocError> {
    monster_db_with(false).await
}

pub async fn monster_db_with(translate_placeholders: bool) -> Result<MonsterDb, RowDocError> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("monsters.db");
    let cap = ConfigAndPool::sqlite_builder(path.to_string_lossy())
        .translation(translate_placeholders)
        .build()
        .await?;
    let seeded = {
        let conn = cap.get_connection().await?;
        monsters::create_schema(&conn).await?;
        monsters::seed_monsters(&conn).await?
    };
    Ok(MonsterDb {
        cap,
        seeded,
        _dir: dir,
    })
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
