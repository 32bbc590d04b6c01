use deadpool_postgres::Config as PgConfig;
use tokio_postgres::NoTls;

use crate::error::RowDocError;
use crate::pool::{ConfigAndPool, MiddlewarePool};
use crate::types::DatabaseType;

impl ConfigAndPool {
    /// Asynchronous initializer for `ConfigAndPool` with Postgres
    ///
    /// # Errors
    /// Returns `RowDocError::ConfigError` if required config fields are missing or
    /// `RowDocError::ConnectionError` if pool creation fails.
    #[allow(clippy::unused_async)]
    pub async fn new_postgres(pg_config: PgConfig) -> Result<Self, RowDocError> {
        Self::new_postgres_with_translation(pg_config, false).await
    }

    /// Asynchronous initializer for `ConfigAndPool` with Postgres and a translation default.
    ///
    /// With translation on, `?N` placeholders are rewritten to `$N` before a statement is
    /// prepared; placeholders inside literals, comments and dollar-quoted blocks are kept.
    ///
    /// # Errors
    /// Returns `RowDocError::ConfigError` if required config fields are missing or
    /// `RowDocError::ConnectionError` if pool creation fails.
    #[allow(clippy::unused_async)]
    pub async fn new_postgres_with_translation(
        pg_config: PgConfig,
        translate_placeholders: bool,
    ) -> Result<Self, RowDocError> {
        validate_config(&pg_config)?;

        let pg_pool = pg_config
            .create_pool(Some(deadpool_postgres::Runtime::Tokio1), NoTls)
            .map_err(|e| {
                RowDocError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;
        tracing::debug!(
            host = ?pg_config.host,
            dbname = ?pg_config.dbname,
            "postgres pool ready"
        );

        Ok(ConfigAndPool {
            pool: MiddlewarePool::Postgres(pg_pool),
            db_type: DatabaseType::Postgres,
            translate_placeholders,
        })
    }
}

fn validate_config(pg_config: &PgConfig) -> Result<(), RowDocError> {
    let missing = if pg_config.dbname.is_none() {
        Some("dbname")
    } else if pg_config.host.is_none() {
        Some("host")
    } else if pg_config.port.is_none() {
        Some("port")
    } else if pg_config.user.is_none() {
        Some("user")
    } else if pg_config.password.is_none() {
        Some("password")
    } else {
        None
    };
    match missing {
        Some(field) => Err(RowDocError::ConfigError(format!("{field} is required"))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> PgConfig {
        let mut cfg = PgConfig::new();
        cfg.dbname = Some("monsters".into());
        cfg.host = Some("localhost".into());
        cfg.port = Some(5432);
        cfg.user = Some("mike".into());
        cfg.password = Some("wazowski".into());
        cfg
    }

    #[test]
    fn complete_config_passes() {
        assert!(validate_config(&full_config()).is_ok());
    }

    #[test]
    fn missing_fields_are_named() {
        let mut cfg = full_config();
        cfg.port = None;
        let err = validate_config(&cfg).unwrap_err();
        assert!(matches!(err, RowDocError::ConfigError(msg) if msg == "port is required"));
    }
}
