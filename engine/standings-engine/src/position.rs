//! Day-over-day rank movement

use crate::models::{PositionChange, TeamStat};
use std::collections::HashMap;

/// Attach the movement of each team between `previous` and `current`.
///
/// Ranks are 1-based positions in each list. A team absent yesterday is
/// `Unranked`.
pub fn apply_position_change(current: Vec<TeamStat>, previous: &[TeamStat]) -> Vec<TeamStat> {
    let previous_rank: HashMap<&str, i64> =
        previous.iter().enumerate().map(|(i, stat)| (stat.team.as_str(), i as i64 + 1)).collect();

    current
        .into_iter()
        .enumerate()
        .map(|(i, stat)| {
            let position = match previous_rank.get(stat.team.as_str()) {
                Some(before) => PositionChange::Delta(before - (i as i64 + 1)),
                None => PositionChange::Unranked,
            };
            stat.with_position(position)
        })
        .collect()
}
