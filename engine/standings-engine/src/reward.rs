//! Reward calculation
//!
//! A stage either pays per point earned or pays a fixed amount depending on
//! whether the team finished as a group winner.

use crate::config::RewardPolicy;
use crate::models::{Pref, TeamStat};
use crate::schema::CompetitionRow;
use tracing::warn;

/// Reward columns for one side (winners or losers) of a competition row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RewardTier {
    /// Points the fixed reward is worth
    pub point_total: f64,
    /// Share of the reward paid out so far
    pub partial_fraction: f64,
    pub rate_per_point: f64,
}

impl RewardTier {
    /// Tier of a stage with no configuration row
    pub const UNDEFINED: RewardTier =
        RewardTier { point_total: f64::NAN, partial_fraction: f64::NAN, rate_per_point: f64::NAN };

    /// Fixed reward and amount paid under this tier
    pub fn payout(&self) -> (f64, f64) {
        let reward = self.point_total * self.rate_per_point;
        (reward, reward * self.partial_fraction)
    }
}

/// How a stage turns standings into money
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RewardStrategy {
    /// Points times the winner rate, partially paid
    PointRate { rate_per_point: f64, partial_fraction: f64 },
    /// Fixed winner or loser reward by final status
    PositionBased { winner: RewardTier, loser: RewardTier },
}

impl RewardStrategy {
    /// Strategy for a stage given its competition row, if any
    pub fn for_stage(policy: &RewardPolicy, competition: &str, stage: &str, row: Option<&CompetitionRow>) -> Self {
        if row.is_none() {
            warn!("No reward configuration for {}_{}; rewards are undefined", competition, stage);
        }
        let winner = row.map(|r| r.winner_tier).unwrap_or(RewardTier::UNDEFINED);

        if policy.uses_position_reward(stage) {
            let loser = row.map(|r| r.loser_tier).unwrap_or(RewardTier::UNDEFINED);
            RewardStrategy::PositionBased { winner, loser }
        } else {
            RewardStrategy::PointRate {
                rate_per_point: winner.rate_per_point,
                partial_fraction: winner.partial_fraction,
            }
        }
    }

    pub fn is_position_based(&self) -> bool {
        matches!(self, RewardStrategy::PositionBased { .. })
    }

    /// Reward and paid amount for one team
    pub fn payout(&self, stat: &TeamStat) -> (f64, f64) {
        match self {
            RewardStrategy::PointRate { rate_per_point, partial_fraction } => {
                let reward = stat.total_point * rate_per_point;
                let paid = reward * partial_fraction;
                (reward, if paid.is_nan() { 0.0 } else { paid })
            }
            RewardStrategy::PositionBased { winner, loser } => {
                if stat.pref == Some(Pref::Win) {
                    winner.payout()
                } else {
                    loser.payout()
                }
            }
        }
    }

    /// New stats with rewards filled in
    pub fn apply(&self, stats: Vec<TeamStat>) -> Vec<TeamStat> {
        stats
            .into_iter()
            .map(|stat| {
                let (reward, paid) = self.payout(&stat);
                stat.with_reward(reward, paid)
            })
            .collect()
    }
}
