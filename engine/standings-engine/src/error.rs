//! Error types for the standings engine

use thiserror::Error;

/// Result type alias for standings operations
pub type Result<T> = std::result::Result<T, StandingsError>;

/// Errors that can occur while deriving standings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StandingsError {
    /// The competition table is absent from the cache
    #[error("Competition table is missing")]
    MissingCompetitionTable,

    /// A sheet header no longer carries a column the engine relies on
    #[error("Sheet {sheet} is missing required column {column}")]
    MissingColumn { sheet: String, column: String },

    /// Engine configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StandingsError {
    /// Create a new missing column error
    pub fn missing_column(sheet: impl Into<String>, column: impl Into<String>) -> Self {
        Self::MissingColumn { sheet: sheet.into(), column: column.into() }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
