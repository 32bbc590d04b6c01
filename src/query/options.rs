use std::time::Duration;

use clap::ValueEnum;

use crate::params::QueryParams;
use crate::translation::TranslationMode;
use crate::types::CommandType;

/// How single-row terminals treat a query that returns more than one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SingleRowMode {
    /// Keep the first row and ignore the rest.
    #[default]
    First,
    /// Fail with `RowDocError::MultipleRowsFound` unless exactly one row comes back.
    Exactly,
}

/// Per-call options for query/execute paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub translation: TranslationMode,
    pub command_type: CommandType,
    /// Cancel the call once this much time has passed.
    pub timeout: Option<Duration>,
    /// Materialize every row before conversion (`true`), or convert rows as the driver
    /// yields them (`false`).
    pub buffered: bool,
    pub single_row: SingleRowMode,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            translation: TranslationMode::PoolDefault,
            command_type: CommandType::Text,
            timeout: None,
            buffered: true,
            single_row: SingleRowMode::First,
        }
    }
}

impl QueryOptions {
    #[must_use]
    pub fn with_translation(mut self, translation: TranslationMode) -> Self {
        self.translation = translation;
        self
    }

    #[must_use]
    pub fn with_command_type(mut self, command_type: CommandType) -> Self {
        self.command_type = command_type;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_buffered(mut self, buffered: bool) -> Self {
        self.buffered = buffered;
        self
    }

    #[must_use]
    pub fn with_single_row(mut self, single_row: SingleRowMode) -> Self {
        self.single_row = single_row;
        self
    }
}

/// A call ready for a backend: SQL after translation, its parameters, and the
/// options the backend itself honours.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub(crate) sql: String,
    pub(crate) params: QueryParams,
    pub(crate) command_type: CommandType,
    pub(crate) timeout: Option<Duration>,
}
