//! Standings Service
//!
//! Serves standings, listings and catalog reads for sales competitions from
//! the sheet cache, and refreshes that cache from spreadsheet payloads.

pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod keys;
pub mod logging;
pub mod service;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use config::{load_config, LoggingConfig, ServiceConfig};
pub use error::{Result, ServiceError};
pub use ingest::{ingest_workbook, IngestReport, Workbook};
pub use logging::{initialize_logging, initialize_logging_with_config};
pub use service::{Clock, FixedClock, LatestStageMatches, StandingsService, SystemClock};
pub use snapshot::StageSnapshot;
