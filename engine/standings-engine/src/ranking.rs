//! Ordering and promotion status
//!
//! Teams are ordered by points, then by achievement ratio. The sort is
//! stable, so fully tied teams keep their prior relative order.

use crate::models::{Pref, TeamStat};
use std::cmp::Ordering;

/// Per-stage promotion thresholds. `None` means the stage row is missing
/// and nobody qualifies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrefThresholds {
    /// Winners per group
    pub winners: Option<usize>,
    /// Wildcards per group
    pub wildcards: Option<usize>,
    /// Wildcards promoted out of the cross-group pool
    pub next_stage_wildcards: Option<usize>,
}

/// Descending order key; undefined values rank below every number
fn descending(a: f64, b: f64) -> Ordering {
    let key = |v: f64| if v.is_nan() { f64::NEG_INFINITY } else { v + 0.0 };
    key(b).total_cmp(&key(a))
}

/// Standing order: higher points first, then higher achievement
pub fn compare_standing(a: &TeamStat, b: &TeamStat) -> Ordering {
    descending(a.total_point, b.total_point).then_with(|| descending(a.total_achv, b.total_achv))
}

/// Stable sort into standing order
pub fn rank(mut stats: Vec<TeamStat>) -> Vec<TeamStat> {
    stats.sort_by(compare_standing);
    stats
}

/// Status for the team at 0-based `index` of a ranked group
pub fn group_pref(index: usize, thresholds: &PrefThresholds) -> Option<Pref> {
    let winners = thresholds.winners?;
    if index < winners {
        return Some(Pref::Win);
    }
    let wildcards = thresholds.wildcards?;
    (index < winners.saturating_add(wildcards)).then_some(Pref::Wildcard)
}

/// Assign group statuses to a ranked group; teams without matches keep theirs
pub fn assign_group_prefs(ranked: Vec<TeamStat>, thresholds: &PrefThresholds) -> Vec<TeamStat> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(index, stat)| {
            if stat.has_played() {
                let pref = group_pref(index, thresholds);
                stat.with_pref(pref)
            } else {
                stat
            }
        })
        .collect()
}

/// Status for the entry at 0-based `index` of a ranked wildcard pool
pub fn wildcard_pref(index: usize, next_stage_wildcards: Option<usize>) -> Option<Pref> {
    next_stage_wildcards.filter(|limit| index < *limit).map(|_| Pref::LuckyWildcard)
}

/// Re-assign statuses across a ranked wildcard pool; teams without matches
/// keep theirs
pub fn assign_lucky_wildcards(ranked: Vec<TeamStat>, next_stage_wildcards: Option<usize>) -> Vec<TeamStat> {
    ranked
        .into_iter()
        .enumerate()
        .map(|(index, stat)| {
            if stat.has_played() {
                let pref = wildcard_pref(index, next_stage_wildcards);
                stat.with_pref(pref)
            } else {
                stat
            }
        })
        .collect()
}
