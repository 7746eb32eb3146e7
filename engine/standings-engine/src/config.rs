//! Engine configuration

use crate::error::{Result, StandingsError};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Business time zone used when none is configured
pub const DEFAULT_UTC_OFFSET: &str = "+08:00";
/// Local hour from which the business day rolls over by default
pub const DEFAULT_CUTOFF_HOUR: u32 = 6;

/// Settings that shape standings derivation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub calendar: CalendarConfig,
    pub rewards: RewardPolicy,
}

impl EngineConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.calendar.validate()?;
        self.rewards.validate()
    }
}

/// Business-day settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Fixed UTC offset of the business time zone, e.g. "+08:00"
    pub utc_offset: String,
    /// Local hour from which today's date becomes the standings date
    pub cutoff_hour: u32,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { utc_offset: DEFAULT_UTC_OFFSET.to_string(), cutoff_hour: DEFAULT_CUTOFF_HOUR }
    }
}

impl CalendarConfig {
    pub fn validate(&self) -> Result<()> {
        parse_utc_offset(&self.utc_offset)?;
        if self.cutoff_hour > 23 {
            return Err(StandingsError::config(format!(
                "cutoff_hour must be between 0 and 23, got {}",
                self.cutoff_hour
            )));
        }
        Ok(())
    }

    /// Parsed business time zone
    pub fn offset(&self) -> Result<FixedOffset> {
        parse_utc_offset(&self.utc_offset)
    }
}

/// Which stages are rewarded by final position instead of by points
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardPolicy {
    /// Stage identifiers using position-based rewards
    pub position_based_stages: Vec<String>,
}

impl RewardPolicy {
    pub fn new(stages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { position_based_stages: stages.into_iter().map(Into::into).collect() }
    }

    pub fn validate(&self) -> Result<()> {
        if self.position_based_stages.iter().any(|s| s.trim().is_empty()) {
            return Err(StandingsError::config("position_based_stages contains a blank stage"));
        }
        Ok(())
    }

    /// Whether the stage is rewarded by final position
    pub fn uses_position_reward(&self, stage: &str) -> bool {
        self.position_based_stages.iter().any(|s| s == stage)
    }
}

/// Parse "+08:00" or "+0800" into a fixed offset; "Z" and "UTC" mean zero
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset> {
    let value = raw.trim();
    let value = if value.eq_ignore_ascii_case("z") || value.eq_ignore_ascii_case("utc") { "+00:00" } else { value };

    value
        .parse::<FixedOffset>()
        .map_err(|e| StandingsError::config(format!("invalid UTC offset {raw:?}: {e}")))
}
