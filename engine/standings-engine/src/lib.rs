//! # Standings Engine
//!
//! Derives group standings, rewards, wildcard pools and stage summaries for
//! multi-stage sales competitions from spreadsheet rows.
//!
//! ## Pipeline
//!
//! - **sheet**: null-row filtering and header assignment
//! - **schema**: typed match, competition and store records
//! - **calendar**: business-date resolution and cutoff filtering
//! - **stats / ranking / reward**: per-group aggregation, ordering, status and payouts
//! - **position**: day-over-day rank movement
//! - **aggregation**: cross-group wildcard pool and stage summaries
//!
//! Everything in this crate is synchronous and free of I/O.

pub mod aggregation;
pub mod calendar;
pub mod catalog;
pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod position;
pub mod ranking;
pub mod reward;
pub mod schema;
pub mod sheet;
pub mod standings;
pub mod stats;

pub use calendar::BusinessCalendar;
pub use config::{CalendarConfig, EngineConfig, RewardPolicy};
pub use error::{Result, StandingsError};
pub use models::*;
pub use ranking::PrefThresholds;
pub use reward::{RewardStrategy, RewardTier};
pub use schema::{parse_match_sheet, CompetitionTable, MatchRecord};
pub use sheet::{RawRow, RawSheet};
pub use standings::{GroupMatches, StageContext, StandingsEngine};
