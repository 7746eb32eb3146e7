//! Standings data model
//!
//! Every value here is derived per request from cached sheets and never
//! persisted. Wire names stay camelCase for existing consumers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Promotion status of a team after ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pref {
    /// Top of the group
    Win,
    /// Qualifies for the cross-group wildcard pool
    Wildcard,
    /// Promoted out of the wildcard pool
    LuckyWildcard,
}

/// Day-over-day rank movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PositionChange {
    /// Previous rank minus current rank (positive = moved up)
    Delta(i64),
    /// Team had no rank in the previous day's standing
    Unranked,
}

impl PositionChange {
    /// Wire value consumers use for "no prior-day baseline"
    pub const UNRANKED_SENTINEL: i64 = 99_999_999_999;

    /// Encode for the wire
    pub fn as_wire(self) -> i64 {
        match self {
            PositionChange::Delta(delta) => delta,
            PositionChange::Unranked => Self::UNRANKED_SENTINEL,
        }
    }

    /// Decode from the wire
    pub fn from_wire(value: i64) -> Self {
        if value == Self::UNRANKED_SENTINEL {
            PositionChange::Unranked
        } else {
            PositionChange::Delta(value)
        }
    }

    /// The delta, if the team was ranked yesterday
    pub fn delta(self) -> Option<i64> {
        match self {
            PositionChange::Delta(delta) => Some(delta),
            PositionChange::Unranked => None,
        }
    }
}

impl Default for PositionChange {
    fn default() -> Self {
        PositionChange::Delta(0)
    }
}

impl Serialize for PositionChange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for PositionChange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i64::deserialize(deserializer).map(PositionChange::from_wire)
    }
}

/// Per-team standing within a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStat {
    pub team: String,
    pub total_matches: u32,
    pub total_point: f64,
    pub win: u32,
    pub lose: u32,
    pub total_reward: f64,
    pub total_paid: f64,
    /// Sales divided by target, 0 when undefined
    pub total_achv: f64,
    pub total_sales: f64,
    pub total_target: f64,
    pub pref: Option<Pref>,
    pub position: PositionChange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub team_img: Option<String>,
}

impl TeamStat {
    /// Zeroed stats for a team
    pub fn new(team: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            total_matches: 0,
            total_point: 0.0,
            win: 0,
            lose: 0,
            total_reward: 0.0,
            total_paid: 0.0,
            total_achv: 0.0,
            total_sales: 0.0,
            total_target: 0.0,
            pref: None,
            position: PositionChange::default(),
            group: None,
            team_img: None,
        }
    }

    /// Whether the team has at least one counted match
    pub fn has_played(&self) -> bool {
        self.total_matches > 0
    }

    pub fn with_pref(self, pref: Option<Pref>) -> Self {
        Self { pref, ..self }
    }

    pub fn with_reward(self, total_reward: f64, total_paid: f64) -> Self {
        Self { total_reward, total_paid, ..self }
    }

    pub fn with_position(self, position: PositionChange) -> Self {
        Self { position, ..self }
    }

    pub fn with_group(self, group: impl Into<String>) -> Self {
        Self { group: Some(group.into()), ..self }
    }

    pub fn with_team_img(self, team_img: Option<String>) -> Self {
        Self { team_img, ..self }
    }
}

/// One match in a team's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPlayed {
    pub team: String,
    pub opponent: Option<String>,
    pub team_achv: Option<String>,
    pub opponent_achv: Option<String>,
    pub is_winner: bool,
    pub date: Option<String>,
}

/// Team standing with its match history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatDetail {
    #[serde(flatten)]
    pub stat: TeamStat,
    pub match_played: Vec<MatchPlayed>,
}

/// A named list of standings (a group, or a slice of a stage summary)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandingSection {
    pub name: String,
    pub teams: Vec<TeamStat>,
}

/// Store (team) metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub code: Option<String>,
    /// Area manager
    pub am: Option<String>,
    pub ssh: Option<String>,
    pub sh: Option<String>,
    pub image_url: Option<String>,
}

/// A match as shown in match lists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchListing {
    pub team1: Option<String>,
    pub team2: Option<String>,
    pub team1_achv: f64,
    pub team2_achv: f64,
    pub date: Option<String>,
    pub am1: Option<String>,
    pub ssh1: Option<String>,
    pub sh1: Option<String>,
    pub am2: Option<String>,
    pub ssh2: Option<String>,
    pub sh2: Option<String>,
    pub team1_image_url: Option<String>,
    pub team2_image_url: Option<String>,
    pub sales_update_time: Option<String>,
    pub is_approved: bool,
}

/// Stage entry of a competition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: Option<String>,
}

/// First and last business date of a stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchWindow {
    pub start_date: String,
    pub end_date: String,
}

/// Which match rows a reader may see
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Every row, published or not
    #[default]
    All,
    /// Only rows whose publish flag is set
    PublishedOnly,
}
