//! Per-team statistics over a set of matches

use crate::models::TeamStat;
use crate::schema::MatchRecord;
use crate::sheet::loose_number;
use std::collections::{HashMap, HashSet};

/// Every team appearing home or away, in first-seen order
pub fn team_universe(matches: &[MatchRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .flat_map(|m| [m.home.as_deref(), m.away.as_deref()])
        .flatten()
        .filter(|team| !team.trim().is_empty())
        .filter(|team| seen.insert(*team))
        .map(str::to_string)
        .collect()
}

/// Zeroed stats for every team
pub fn zeroed_stats(teams: &[String]) -> Vec<TeamStat> {
    teams.iter().map(TeamStat::new).collect()
}

/// One team's sales line for one business day
#[derive(Debug, PartialEq, Eq, Hash)]
struct SalesEntry<'a> {
    team: &'a str,
    bus_date: Option<&'a str>,
    sales: Option<&'a str>,
    target: Option<&'a str>,
}

/// Distinct sales lines, first occurrence kept
fn sales_entries<'a>(matches: &[&'a MatchRecord]) -> Vec<SalesEntry<'a>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for m in matches {
        let sides = [
            (m.home.as_deref(), m.home_sales.as_deref(), m.home_target.as_deref()),
            (m.away.as_deref(), m.away_sales.as_deref(), m.away_target.as_deref()),
        ];
        for (team, sales, target) in sides {
            let Some(team) = team else { continue };
            let entry = SalesEntry { team, bus_date: m.bus_date.as_deref(), sales, target };
            if seen.insert((entry.team, entry.bus_date, entry.sales, entry.target)) {
                entries.push(entry);
            }
        }
    }
    entries
}

/// Sales over target, 0 when the ratio is undefined
pub fn achievement_ratio(sales: f64, target: f64) -> f64 {
    let ratio = sales / target;
    if ratio.is_finite() {
        ratio
    } else {
        0.0
    }
}

/// Aggregate stats for `teams` over already-filtered matches.
///
/// Results are in `teams` order; rewards, status and position stay at their
/// defaults.
pub fn aggregate(teams: &[String], matches: &[&MatchRecord]) -> Vec<TeamStat> {
    let mut stats = zeroed_stats(teams);
    let index: HashMap<&str, usize> = teams.iter().enumerate().map(|(i, t)| (t.as_str(), i)).collect();

    for m in matches {
        let points = m.points();
        for team in [m.home.as_deref(), m.away.as_deref()].into_iter().flatten() {
            if let Some(&i) = index.get(team) {
                stats[i].total_matches += 1;
            }
        }
        if let Some(&i) = m.winner.as_deref().and_then(|w| index.get(w)) {
            stats[i].win += 1;
            stats[i].total_point += points;
        }
        if let Some(&i) = m.loser.as_deref().and_then(|l| index.get(l)) {
            stats[i].lose += 1;
        }
    }

    for entry in sales_entries(matches) {
        if let Some(&i) = index.get(entry.team) {
            stats[i].total_sales += loose_number(entry.sales);
            stats[i].total_target += loose_number(entry.target);
        }
    }

    stats
        .into_iter()
        .map(|stat| TeamStat { total_achv: achievement_ratio(stat.total_sales, stat.total_target), ..stat })
        .collect()
}
