//! Single-snapshot reads
//!
//! A request reads every key it needs once and computes from that copy, so a
//! concurrent refresh cannot mix two generations of data within one answer.

use crate::error::{Result, ServiceError};
use crate::keys;
use futures::future::try_join_all;
use sheet_cache::SheetCache;
use standings_engine::catalog;
use standings_engine::schema::{parse_match_sheet, parse_stores};
use standings_engine::{CompetitionTable, GroupMatches, MatchRecord, RawSheet, StandingsError, StoreRecord};

/// Raw sheet at `key`, `None` when absent
pub(crate) async fn read_sheet(cache: &SheetCache, key: &str) -> Result<Option<RawSheet>> {
    Ok(cache.get::<RawSheet>(key).await?)
}

pub(crate) async fn read_competitions(cache: &SheetCache) -> Result<Option<CompetitionTable>> {
    Ok(read_sheet(cache, keys::COMPETITION).await?.map(|sheet| CompetitionTable::from_sheet(&sheet)))
}

/// Store table; absent means no stores
pub(crate) async fn read_stores(cache: &SheetCache) -> Result<Vec<StoreRecord>> {
    Ok(read_sheet(cache, keys::STORE).await?.map(|sheet| parse_stores(&sheet)).unwrap_or_default())
}

/// Parsed matchup sheet of a group, `None` when absent
pub(crate) async fn read_group(
    cache: &SheetCache,
    competition: &str,
    stage: &str,
    group: &str,
) -> Result<Option<Vec<MatchRecord>>> {
    let key = keys::matchup(competition, stage, group);
    match read_sheet(cache, &key).await? {
        Some(sheet) => Ok(Some(parse_match_sheet(&key, &sheet)?)),
        None => Ok(None),
    }
}

/// Everything a stage or group standing is computed from
#[derive(Debug, Clone)]
pub struct StageSnapshot {
    pub competitions: CompetitionTable,
    /// Groups in stage order; a missing matchup sheet reads as no matches
    pub groups: Vec<GroupMatches>,
    pub stores: Vec<StoreRecord>,
}

impl StageSnapshot {
    /// Snapshot of every group of a stage, fetched concurrently
    pub async fn load_stage(cache: &SheetCache, competition: &str, stage: &str, with_stores: bool) -> Result<Self> {
        Self::try_load_stage(cache, competition, stage, with_stores)
            .await?
            .ok_or_else(|| ServiceError::from(StandingsError::MissingCompetitionTable))
    }

    /// Like [`StageSnapshot::load_stage`], but `None` when no competition
    /// table is cached
    pub async fn try_load_stage(
        cache: &SheetCache,
        competition: &str,
        stage: &str,
        with_stores: bool,
    ) -> Result<Option<Self>> {
        let Some(competitions) = read_competitions(cache).await? else {
            return Ok(None);
        };
        let names = catalog::groups(&competitions, competition, stage);

        let (groups, stores) = tokio::try_join!(
            try_join_all(names.iter().map(|group| load_group_matches(cache, competition, stage, group))),
            optional_stores(cache, with_stores),
        )?;

        Ok(Some(Self { competitions, groups, stores }))
    }

    /// Snapshot of a single group
    pub async fn load_group(
        cache: &SheetCache,
        competition: &str,
        stage: &str,
        group: &str,
        with_stores: bool,
    ) -> Result<Self> {
        let competitions = require_competitions(cache).await?;
        let (matches, stores) = tokio::try_join!(
            load_group_matches(cache, competition, stage, group),
            optional_stores(cache, with_stores),
        )?;

        Ok(Self { competitions, groups: vec![matches], stores })
    }

    /// Matches of the first (for group snapshots, the only) group
    pub fn first_group_matches(&self) -> &[MatchRecord] {
        self.groups.first().map(|group| group.matches.as_slice()).unwrap_or(&[])
    }
}

async fn require_competitions(cache: &SheetCache) -> Result<CompetitionTable> {
    Ok(read_competitions(cache).await?.ok_or(StandingsError::MissingCompetitionTable)?)
}

async fn load_group_matches(cache: &SheetCache, competition: &str, stage: &str, group: &str) -> Result<GroupMatches> {
    let matches = read_group(cache, competition, stage, group).await?.unwrap_or_default();
    Ok(GroupMatches::new(group, matches))
}

async fn optional_stores(cache: &SheetCache, wanted: bool) -> Result<Vec<StoreRecord>> {
    if wanted {
        read_stores(cache).await
    } else {
        Ok(Vec::new())
    }
}
