//! Error types for the standings service

use sheet_cache::CacheError;
use standings_engine::StandingsError;
use thiserror::Error;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors raised while serving standings
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Cache backend failure
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Derivation failure
    #[error("Standings error: {0}")]
    Standings(#[from] StandingsError),

    /// The workbook cannot be ingested
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Service configuration is unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Detail-free failure returned from public operations
    #[error("Internal failure in {operation}")]
    Internal { operation: &'static str },
}

impl ServiceError {
    /// Create a new ingest error
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(operation: &'static str) -> Self {
        Self::Internal { operation }
    }
}
