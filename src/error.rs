use std::time::Duration;

use thiserror::Error;

#[cfg(feature = "postgres")]
use deadpool_postgres::PoolError as PostgresPoolError;
#[cfg(feature = "sqlite")]
use deadpool_sqlite::PoolError as SqlitePoolError;

#[derive(Debug, Error)]
pub enum RowDocError {
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PostgresError(#[from] tokio_postgres::Error),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    #[cfg(feature = "postgres")]
    #[error(transparent)]
    PoolErrorPostgres(#[from] PostgresPoolError),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    PoolErrorSqlite(#[from] SqlitePoolError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Query exceeded its timeout of {0:?}")]
    Timeout(Duration),

    #[error("Query returned no rows")]
    RowNotFound,

    #[error("Query returned {0} rows where exactly one was expected")]
    MultipleRowsFound(usize),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Decoding error: {0}")]
    DecodeError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    BsonSerialize(#[from] bson::ser::Error),

    #[error(transparent)]
    BsonDeserialize(#[from] bson::de::Error),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl RowDocError {
    /// True for the two single-row cardinality failures.
    #[must_use]
    pub fn is_cardinality(&self) -> bool {
        matches!(self, Self::RowNotFound | Self::MultipleRowsFound(_))
    }
}

#[cfg(feature = "sqlite")]
impl From<deadpool_sqlite::InteractError> for RowDocError {
    fn from(err: deadpool_sqlite::InteractError) -> Self {
        RowDocError::ConnectionError(format!("SQLite Interact Error: {err}"))
    }
}
