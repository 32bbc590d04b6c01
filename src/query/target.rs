use crate::convert::{ConverterSet, ObjectNode};
use crate::error::RowDocError;
use crate::results::{DbRow, ResultSet};
use crate::translation::PlaceholderStyle;
use crate::types::DatabaseType;

use super::options::{Request, SingleRowMode};

/// Where a [`QueryBuilder`](super::QueryBuilder) runs: a pooled connection or an open
/// transaction.
#[derive(Clone, Copy)]
pub(crate) enum QueryTarget<'a> {
    #[cfg(feature = "sqlite")]
    Sqlite {
        conn: &'a deadpool_sqlite::Object,
        translate_placeholders: bool,
    },
    #[cfg(feature = "postgres")]
    Postgres {
        client: &'a tokio_postgres::Client,
        translate_placeholders: bool,
    },
    #[cfg(feature = "postgres")]
    PostgresTx {
        tx: &'a tokio_postgres::Transaction<'a>,
        translate_placeholders: bool,
    },
}

impl QueryTarget<'_> {
    pub(crate) fn database_type(self) -> DatabaseType {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { .. } => DatabaseType::Sqlite,
            #[cfg(feature = "postgres")]
            Self::Postgres { .. } | Self::PostgresTx { .. } => DatabaseType::Postgres,
        }
    }

    pub(crate) fn translate_default(self) -> bool {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite {
                translate_placeholders,
                ..
            } => translate_placeholders,
            #[cfg(feature = "postgres")]
            Self::Postgres {
                translate_placeholders,
                ..
            }
            | Self::PostgresTx {
                translate_placeholders,
                ..
            } => translate_placeholders,
        }
    }

    pub(crate) fn placeholder_style(self) -> PlaceholderStyle {
        match self.database_type() {
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => PlaceholderStyle::Sqlite,
            #[cfg(feature = "postgres")]
            DatabaseType::Postgres => PlaceholderStyle::Postgres,
        }
    }

    pub(crate) async fn fetch_rows(self, request: Request) -> Result<ResultSet, RowDocError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { conn, .. } => crate::sqlite::executor::fetch_rows(conn, request).await,
            #[cfg(feature = "postgres")]
            Self::Postgres { client, .. } => {
                crate::postgres::executor::fetch_rows(client, request).await
            }
            #[cfg(feature = "postgres")]
            Self::PostgresTx { tx, .. } => crate::postgres::executor::fetch_rows(tx, request).await,
        }
    }

    pub(crate) async fn fetch_nodes(
        self,
        request: Request,
        converters: ConverterSet,
    ) -> Result<Vec<ObjectNode>, RowDocError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { conn, .. } => {
                crate::sqlite::executor::fetch_nodes(conn, request, converters).await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres { client, .. } => {
                crate::postgres::executor::fetch_nodes(client, request, converters).await
            }
            #[cfg(feature = "postgres")]
            Self::PostgresTx { tx, .. } => {
                crate::postgres::executor::fetch_nodes(tx, request, converters).await
            }
        }
    }

    pub(crate) async fn fetch_single(
        self,
        request: Request,
        mode: SingleRowMode,
    ) -> Result<DbRow, RowDocError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { conn, .. } => {
                crate::sqlite::executor::fetch_single(conn, request, mode).await
            }
            #[cfg(feature = "postgres")]
            Self::Postgres { client, .. } => {
                crate::postgres::executor::fetch_single(client, request, mode).await
            }
            #[cfg(feature = "postgres")]
            Self::PostgresTx { tx, .. } => {
                crate::postgres::executor::fetch_single(tx, request, mode).await
            }
        }
    }

    pub(crate) async fn execute(self, request: Request) -> Result<usize, RowDocError> {
        match self {
            #[cfg(feature = "sqlite")]
            Self::Sqlite { conn, .. } => crate::sqlite::executor::execute_dml(conn, request).await,
            #[cfg(feature = "postgres")]
            Self::Postgres { client, .. } => {
                crate::postgres::executor::execute_dml(client, request).await
            }
            #[cfg(feature = "postgres")]
            Self::PostgresTx { tx, .. } => {
                crate::postgres::executor::execute_dml(tx, request).await
            }
        }
    }
}
