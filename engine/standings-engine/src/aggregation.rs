//! Stage-level recombination of group standings
//!
//! Inputs are per-group sections whose `name` is the group name. Outputs are
//! new values labeled with that group; inputs are never modified.

use crate::models::{Pref, StandingSection, TeamStat};
use crate::ranking::{assign_lucky_wildcards, rank};

/// Section name of the group winners in the all-wildcards summary
pub const GROUP_WINNER_SECTION: &str = "groupWinner";
/// Section name of the wildcard pool in the all-wildcards summary
pub const WILDCARD_SECTION: &str = "wildcard";

/// Copy of `teams` labeled with `group`
pub fn label_group(group: &str, teams: &[TeamStat]) -> Vec<TeamStat> {
    teams.iter().cloned().map(|stat| stat.with_group(group)).collect()
}

fn labeled_with_pref<'a>(groups: &'a [StandingSection], pref: Pref) -> impl Iterator<Item = TeamStat> + 'a {
    groups.iter().flat_map(move |section| {
        section
            .teams
            .iter()
            .filter(move |stat| stat.pref == Some(pref))
            .map(move |stat| stat.clone().with_group(section.name.as_str()))
    })
}

/// Wildcard entries of every group, re-ranked with the top
/// `next_stage_wildcards` promoted
pub fn wildcard_pool(groups: &[StandingSection], next_stage_wildcards: Option<usize>) -> Vec<TeamStat> {
    let pool = rank(labeled_with_pref(groups, Pref::Wildcard).collect());
    assign_lucky_wildcards(pool, next_stage_wildcards)
}

/// Group winners and promoted wildcards, ranked together
pub fn stage_summary(groups: &[StandingSection], pool: &[TeamStat]) -> Vec<TeamStat> {
    let lucky = pool.iter().filter(|stat| stat.pref == Some(Pref::LuckyWildcard)).cloned();
    rank(labeled_with_pref(groups, Pref::Win).chain(lucky).collect())
}

/// Ranked group winners followed by the whole ranked wildcard pool
pub fn summary_with_all_wildcards(groups: &[StandingSection], pool: Vec<TeamStat>) -> Vec<StandingSection> {
    vec![
        StandingSection {
            name: GROUP_WINNER_SECTION.to_string(),
            teams: rank(labeled_with_pref(groups, Pref::Win).collect()),
        },
        StandingSection { name: WILDCARD_SECTION.to_string(), teams: rank(pool) },
    ]
}

/// Every group's standing with its teams labeled
pub fn full_breakdown(groups: &[StandingSection]) -> Vec<StandingSection> {
    groups
        .iter()
        .map(|section| StandingSection {
            name: section.name.clone(),
            teams: label_group(&section.name, &section.teams),
        })
        .collect()
}
