use deadpool_sqlite::{Config as DeadpoolSqliteConfig, Hook, HookError, Runtime};
use rusqlite::config::DbConfig;

use crate::error::RowDocError;
use crate::pool::{ConfigAndPool, MiddlewarePool};
use crate::types::DatabaseType;

/// Options for configuring a `SQLite` pool.
#[derive(Debug, Clone)]
pub struct SqliteOptions {
    pub db_path: String,
    pub translate_placeholders: bool,
}

impl SqliteOptions {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            translate_placeholders: false,
        }
    }

    #[must_use]
    pub fn with_translation(mut self, translate_placeholders: bool) -> Self {
        self.translate_placeholders = translate_placeholders;
        self
    }
}

/// Fluent builder for `SQLite` options.
///
/// ```rust,no_run
/// use sql_rowdoc::prelude::*;
///
/// # async fn demo() -> Result<(), RowDocError> {
/// let cap = ConfigAndPool::sqlite_builder("monsters.db")
///     .translation(true)
///     .build()
///     .await?;
/// let conn = cap.get_connection().await?;
/// # let _ = conn;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SqliteOptionsBuilder {
    opts: SqliteOptions,
}

impl SqliteOptionsBuilder {
    #[must_use]
    pub fn new(db_path: impl Into<String>) -> Self {
        Self {
            opts: SqliteOptions::new(db_path),
        }
    }

    #[must_use]
    pub fn translation(mut self, translate_placeholders: bool) -> Self {
        self.opts.translate_placeholders = translate_placeholders;
        self
    }

    #[must_use]
    pub fn finish(self) -> SqliteOptions {
        self.opts
    }

    /// Build a `ConfigAndPool` for `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `RowDocError` if pool creation or the initial smoke test fails.
    pub async fn build(self) -> Result<ConfigAndPool, RowDocError> {
        ConfigAndPool::new_sqlite(self.finish()).await
    }
}

impl ConfigAndPool {
    #[must_use]
    pub fn sqlite_builder(db_path: impl Into<String>) -> SqliteOptionsBuilder {
        SqliteOptionsBuilder::new(db_path)
    }

    /// Asynchronous initializer for `ConfigAndPool` with Sqlite using `deadpool_sqlite`.
    ///
    /// Every pooled connection has the double-quoted string literal fallback turned
    /// off, so a mistyped `"Column"` is an error instead of a string constant. The
    /// database is switched to WAL journaling, which doubles as a connection test.
    ///
    /// # Errors
    /// Returns `RowDocError::ConnectionError` if pool creation fails, or the pool/driver
    /// error if the first connection cannot be used.
    pub async fn new_sqlite(opts: SqliteOptions) -> Result<Self, RowDocError> {
        let cfg = DeadpoolSqliteConfig::new(opts.db_path.clone());

        let pool = cfg
            .builder(Runtime::Tokio1)
            .map_err(|e| RowDocError::ConfigError(format!("Invalid SQLite pool config: {e}")))?
            .post_create(Hook::async_fn(|conn, _| {
                Box::pin(async move {
                    conn.interact(disable_double_quoted_strings)
                        .await
                        .map_err(|e| HookError::Message(e.to_string().into()))?
                        .map_err(HookError::Backend)
                })
            }))
            .build()
            .map_err(|e| {
                RowDocError::ConnectionError(format!("Failed to create SQLite pool: {e}"))
            })?;

        {
            let conn = pool.get().await?;
            conn.interact(|conn| conn.execute_batch("PRAGMA journal_mode = WAL;"))
                .await??;
        }
        tracing::debug!(path = %opts.db_path, "sqlite pool ready");

        Ok(ConfigAndPool {
            pool: MiddlewarePool::Sqlite(pool),
            db_type: DatabaseType::Sqlite,
            translate_placeholders: opts.translate_placeholders,
        })
    }
}

fn disable_double_quoted_strings(conn: &mut rusqlite::Connection) -> rusqlite::Result<()> {
    conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DML, false)?;
    conn.set_db_config(DbConfig::SQLITE_DBCONFIG_DQS_DDL, false)?;
    Ok(())
}
