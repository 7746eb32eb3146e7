//! Group and stage standings
//!
//! [`StandingsEngine`] runs the per-group pipeline (filter, aggregate, rank,
//! assign status, reward) and the day-over-day comparison on top of it. All
//! methods are pure over the match rows they are given.

use crate::aggregation::{full_breakdown, stage_summary, summary_with_all_wildcards, wildcard_pool};
use crate::calendar::{previous_day, retain_before, BusinessCalendar};
use crate::config::{EngineConfig, RewardPolicy};
use crate::error::Result;
use crate::models::{MatchPlayed, StandingSection, StoreRecord, TeamStat, TeamStatDetail, Visibility};
use crate::position::apply_position_change;
use crate::ranking::{assign_group_prefs, rank, PrefThresholds};
use crate::reward::RewardStrategy;
use crate::schema::{CompetitionTable, MatchRecord, StoreIndex};
use crate::stats::{aggregate, team_universe, zeroed_stats};
use chrono::{DateTime, NaiveDate, Utc};
use std::cmp::Reverse;
use tracing::debug;

/// Match rows of one group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMatches {
    pub group: String,
    pub matches: Vec<MatchRecord>,
}

impl GroupMatches {
    pub fn new(group: impl Into<String>, matches: Vec<MatchRecord>) -> Self {
        Self { group: group.into(), matches }
    }
}

/// Everything a stage computation needs besides the match rows
#[derive(Debug, Clone)]
pub struct StageContext<'a> {
    pub competition: &'a str,
    pub stage: &'a str,
    pub thresholds: PrefThresholds,
    pub reward: RewardStrategy,
    pub visibility: Visibility,
    pub stores: StoreIndex<'a>,
}

impl<'a> StageContext<'a> {
    pub fn with_visibility(self, visibility: Visibility) -> Self {
        Self { visibility, ..self }
    }

    pub fn with_stores(self, stores: &'a [StoreRecord]) -> Self {
        Self { stores: StoreIndex::new(stores), ..self }
    }

    fn is_visible(&self, record: &MatchRecord) -> bool {
        match self.visibility {
            Visibility::All => true,
            Visibility::PublishedOnly => record.is_published(),
        }
    }

    fn visible<'m>(&'m self, matches: &'m [MatchRecord]) -> impl Iterator<Item = &'m MatchRecord> + 'm {
        matches.iter().filter(move |record| self.is_visible(record))
    }

    fn with_images(&self, stats: Vec<TeamStat>) -> Vec<TeamStat> {
        stats
            .into_iter()
            .map(|stat| {
                let image = self.stores.image_url(&stat.team);
                stat.with_team_img(image)
            })
            .collect()
    }
}

/// Derives standings for groups and stages
#[derive(Debug, Clone, Default)]
pub struct StandingsEngine {
    calendar: BusinessCalendar,
    rewards: RewardPolicy,
}

impl StandingsEngine {
    pub fn new(calendar: BusinessCalendar, rewards: RewardPolicy) -> Self {
        Self { calendar, rewards }
    }

    /// Build from validated configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(BusinessCalendar::from_config(&config.calendar)?, config.rewards.clone()))
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Resolve thresholds and reward strategy of a stage
    pub fn stage_context<'a>(
        &self,
        competitions: &'a CompetitionTable,
        competition: &'a str,
        stage: &'a str,
    ) -> StageContext<'a> {
        let reward_row = competitions.find_by_id(competition, stage);
        StageContext {
            competition,
            stage,
            thresholds: competitions.thresholds(competition, stage),
            reward: RewardStrategy::for_stage(&self.rewards, competition, stage, reward_row),
            visibility: Visibility::All,
            stores: StoreIndex::default(),
        }
    }

    /// Ranked, rewarded standing of one group counting matches before `reference`
    pub fn group_results(&self, ctx: &StageContext<'_>, matches: &[MatchRecord], reference: NaiveDate) -> Vec<TeamStat> {
        let teams = team_universe(matches);
        let played = retain_before(ctx.visible(matches), reference);

        if played.is_empty() {
            debug!(
                "No matches before {} for {}-{}; returning {} zeroed teams",
                reference,
                ctx.competition,
                ctx.stage,
                teams.len()
            );
            return ctx.with_images(zeroed_stats(&teams));
        }

        let stats = ctx.with_images(aggregate(&teams, &played));
        let ranked = assign_group_prefs(rank(stats), &ctx.thresholds);
        ctx.reward.apply(ranked)
    }

    /// Today's group standing with movement against yesterday's
    pub fn group_standing(&self, ctx: &StageContext<'_>, matches: &[MatchRecord], now: DateTime<Utc>) -> Vec<TeamStat> {
        let today = self.calendar.filter_date(now);
        let current = self.group_results(ctx, matches, today);
        let previous = self.group_results(ctx, matches, previous_day(today));
        apply_position_change(current, &previous)
    }

    /// Group standing with each team's visible match history, newest first
    pub fn group_standing_detail(
        &self,
        ctx: &StageContext<'_>,
        matches: &[MatchRecord],
        now: DateTime<Utc>,
    ) -> Vec<TeamStatDetail> {
        let visible: Vec<&MatchRecord> = ctx.visible(matches).collect();

        self.group_standing(ctx, matches, now)
            .into_iter()
            .map(|stat| {
                let mut history: Vec<&MatchRecord> =
                    visible.iter().copied().filter(|record| record.involves(&stat.team)).collect();
                history.sort_by_key(|record| Reverse(record.business_date()));

                let match_played = history.into_iter().map(|record| played_entry(&stat.team, record)).collect();
                TeamStatDetail { stat, match_played }
            })
            .collect()
    }

    /// Today's standing of every group, unlabeled
    fn group_sections(&self, ctx: &StageContext<'_>, groups: &[GroupMatches], now: DateTime<Utc>) -> Vec<StandingSection> {
        groups
            .iter()
            .map(|group| StandingSection {
                name: group.group.clone(),
                teams: self.group_standing(ctx, &group.matches, now),
            })
            .collect()
    }

    /// Cross-group wildcard pool with promotions
    pub fn wildcard_standing(&self, ctx: &StageContext<'_>, groups: &[GroupMatches], now: DateTime<Utc>) -> Vec<TeamStat> {
        let sections = self.group_sections(ctx, groups, now);
        wildcard_pool(&sections, ctx.thresholds.next_stage_wildcards)
    }

    /// Group winners and promoted wildcards of a stage
    pub fn result_summary(&self, ctx: &StageContext<'_>, groups: &[GroupMatches], now: DateTime<Utc>) -> Vec<TeamStat> {
        let today = self.calendar.filter_date(now);
        let results: Vec<StandingSection> = groups
            .iter()
            .map(|group| StandingSection {
                name: group.group.clone(),
                teams: self.group_results(ctx, &group.matches, today),
            })
            .collect();
        let pool = self.wildcard_standing(ctx, groups, now);
        stage_summary(&results, &pool)
    }

    /// Group winners section and full wildcard pool section
    pub fn summary_with_all_wildcards(
        &self,
        ctx: &StageContext<'_>,
        groups: &[GroupMatches],
        now: DateTime<Utc>,
    ) -> Vec<StandingSection> {
        let sections = self.group_sections(ctx, groups, now);
        let pool = wildcard_pool(&sections, ctx.thresholds.next_stage_wildcards);
        summary_with_all_wildcards(&sections, pool)
    }

    /// Labeled standing of every group
    pub fn all_group_standings(
        &self,
        ctx: &StageContext<'_>,
        groups: &[GroupMatches],
        now: DateTime<Utc>,
    ) -> Vec<StandingSection> {
        full_breakdown(&self.group_sections(ctx, groups, now))
    }
}

fn played_entry(team: &str, record: &MatchRecord) -> MatchPlayed {
    let is_home = record.home.as_deref() == Some(team);
    let (opponent, team_achv, opponent_achv) = if is_home {
        (&record.away, &record.home_percent, &record.away_percent)
    } else {
        (&record.home, &record.away_percent, &record.home_percent)
    };

    MatchPlayed {
        team: team.to_string(),
        opponent: opponent.clone(),
        team_achv: team_achv.clone(),
        opponent_achv: opponent_achv.clone(),
        is_winner: record.is_winner(team),
        date: record.bus_date.clone(),
    }
}
