//! Standings service
//!
//! Public operations read a snapshot from the cache and hand it to the
//! engine. Failures are logged with their cause and surfaced to callers as a
//! detail-free [`ServiceError::Internal`].

use crate::config::ServiceConfig;
use crate::error::{Result, ServiceError};
use crate::ingest::{ingest_workbook, IngestReport, Workbook};
use crate::keys;
use crate::snapshot::{read_competitions, read_group, read_sheet, read_stores, StageSnapshot};
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sheet_cache::{RedisStore, SheetCache};
use standings_engine::schema::sales_update_time;
use standings_engine::{
    catalog, listing, MatchListing, MatchWindow, Stage, StandingSection, StandingsEngine, StoreRecord, TeamStat,
    TeamStatDetail, Visibility,
};
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Matches of the latest stage of a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestStageMatches {
    pub competition: String,
    pub stage: Stage,
    pub group: String,
    pub matches: Vec<MatchListing>,
}

/// Log the cause and replace it with a detail-free error
async fn guarded<T, F>(operation: &'static str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    work.await.map_err(|e| {
        error!("Error in {}: {}", operation, e);
        ServiceError::internal(operation)
    })
}

/// Cache-backed standings service
#[derive(Clone)]
pub struct StandingsService {
    cache: SheetCache,
    engine: StandingsEngine,
    clock: Arc<dyn Clock>,
}

impl StandingsService {
    /// Create a service over an existing cache
    pub fn new(cache: SheetCache, engine: StandingsEngine) -> Self {
        Self { cache, engine, clock: Arc::new(SystemClock) }
    }

    /// Replace the clock used to resolve "today"
    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    /// Connect to Redis and build the engine from configuration
    pub async fn connect(config: &ServiceConfig) -> anyhow::Result<Self> {
        let engine = StandingsEngine::from_config(&config.engine_config()).context("Invalid engine configuration")?;
        let store = RedisStore::connect(&config.cache).await.context("Failed to connect to Redis")?;
        let cache = SheetCache::with_config(Arc::new(store), &config.cache);

        info!("Standings service connected to {}", config.cache.redis_url);
        Ok(Self::new(cache, engine))
    }

    pub fn cache(&self) -> &SheetCache {
        &self.cache
    }

    // Standings

    /// Today's group standing with day-over-day movement
    pub async fn group_standing(&self, competition: &str, stage: &str, group: &str) -> Result<Vec<TeamStat>> {
        guarded("group_standing", async {
            let snapshot = StageSnapshot::load_group(&self.cache, competition, stage, group, false).await?;
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            Ok(self.engine.group_standing(&ctx, snapshot.first_group_matches(), self.clock.now()))
        })
        .await
    }

    /// Today's group results without movement
    pub async fn group_results(&self, competition: &str, stage: &str, group: &str) -> Result<Vec<TeamStat>> {
        guarded("group_results", async {
            let snapshot = StageSnapshot::load_group(&self.cache, competition, stage, group, false).await?;
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            let today = self.engine.calendar().filter_date(self.clock.now());
            Ok(self.engine.group_results(&ctx, snapshot.first_group_matches(), today))
        })
        .await
    }

    /// Group standing with team images and match history
    pub async fn group_standing_detail(
        &self,
        competition: &str,
        stage: &str,
        group: &str,
        visibility: Visibility,
    ) -> Result<Vec<TeamStatDetail>> {
        guarded("group_standing_detail", async {
            let snapshot = StageSnapshot::load_group(&self.cache, competition, stage, group, true).await?;
            let ctx = self
                .engine
                .stage_context(&snapshot.competitions, competition, stage)
                .with_visibility(visibility)
                .with_stores(&snapshot.stores);
            Ok(self.engine.group_standing_detail(&ctx, snapshot.first_group_matches(), self.clock.now()))
        })
        .await
    }

    /// Cross-group wildcard pool of a stage
    pub async fn wildcard_standing(&self, competition: &str, stage: &str) -> Result<Vec<TeamStat>> {
        guarded("wildcard_standing", async {
            let snapshot = StageSnapshot::load_stage(&self.cache, competition, stage, false).await?;
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            Ok(self.engine.wildcard_standing(&ctx, &snapshot.groups, self.clock.now()))
        })
        .await
    }

    /// Group winners and promoted wildcards of a stage
    pub async fn result_summary(&self, competition: &str, stage: &str) -> Result<Vec<TeamStat>> {
        guarded("result_summary", async {
            let snapshot = StageSnapshot::load_stage(&self.cache, competition, stage, false).await?;
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            Ok(self.engine.result_summary(&ctx, &snapshot.groups, self.clock.now()))
        })
        .await
    }

    /// Group winners and the whole wildcard pool of a stage
    pub async fn summary_with_all_wildcards(&self, competition: &str, stage: &str) -> Result<Vec<StandingSection>> {
        guarded("summary_with_all_wildcards", async {
            let snapshot = StageSnapshot::load_stage(&self.cache, competition, stage, false).await?;
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            Ok(self.engine.summary_with_all_wildcards(&ctx, &snapshot.groups, self.clock.now()))
        })
        .await
    }

    /// Standing of every group of a stage; nothing before the competition
    /// table is cached
    pub async fn all_group_standings(&self, competition: &str, stage: &str) -> Result<Vec<StandingSection>> {
        guarded("all_group_standings", async {
            let Some(snapshot) = StageSnapshot::try_load_stage(&self.cache, competition, stage, false).await? else {
                return Ok(Vec::new());
            };
            let ctx = self.engine.stage_context(&snapshot.competitions, competition, stage);
            Ok(self.engine.all_group_standings(&ctx, &snapshot.groups, self.clock.now()))
        })
        .await
    }

    // Listings

    /// Every match of a group
    pub async fn list_matches(&self, competition: &str, stage: &str, group: &str) -> Result<Vec<MatchListing>> {
        guarded("list_matches", self.load_listing(competition, stage, group, None)).await
    }

    /// One team's matches in a group
    pub async fn list_team_matches(
        &self,
        competition: &str,
        stage: &str,
        group: &str,
        team: &str,
        visibility: Visibility,
    ) -> Result<Vec<MatchListing>> {
        guarded("list_team_matches", self.load_listing(competition, stage, group, Some((team, visibility)))).await
    }

    /// Every match of a group in the competition's latest stage
    pub async fn latest_stage_matches(&self, competition: &str, group: &str) -> Result<Option<LatestStageMatches>> {
        guarded("latest_stage_matches", async {
            let Some(stage) = read_competitions(&self.cache)
                .await?
                .and_then(|table| catalog::latest_stage(&table, competition))
            else {
                return Ok(None);
            };
            let matches = self.load_listing(competition, &stage.id, group, None).await?;
            Ok(Some(LatestStageMatches {
                competition: competition.to_string(),
                stage,
                group: group.to_string(),
                matches,
            }))
        })
        .await
    }

    async fn load_listing(
        &self,
        competition: &str,
        stage: &str,
        group: &str,
        team: Option<(&str, Visibility)>,
    ) -> Result<Vec<MatchListing>> {
        let (matches, config, stores) = tokio::try_join!(
            read_group(&self.cache, competition, stage, group),
            read_sheet(&self.cache, keys::CONFIG),
            read_stores(&self.cache),
        )?;
        let (Some(matches), Some(config)) = (matches, config) else {
            return Ok(Vec::new());
        };
        let update_time = sales_update_time(&config);

        Ok(match team {
            Some((team, visibility)) => {
                listing::list_team_matches(&matches, team, visibility, &stores, update_time.as_deref())
            }
            None => listing::list_matches(&matches, &stores, update_time.as_deref()),
        })
    }

    // Catalog

    pub async fn list_competitions(&self) -> Result<Vec<String>> {
        guarded("list_competitions", async {
            Ok(read_competitions(&self.cache).await?.map(|table| catalog::competitions(&table)).unwrap_or_default())
        })
        .await
    }

    pub async fn list_stages(&self, competition: &str) -> Result<Vec<Stage>> {
        guarded("list_stages", async {
            Ok(read_competitions(&self.cache)
                .await?
                .map(|table| catalog::stages(&table, competition))
                .unwrap_or_default())
        })
        .await
    }

    pub async fn list_groups(&self, competition: &str, stage: &str) -> Result<Vec<String>> {
        guarded("list_groups", async {
            Ok(read_competitions(&self.cache)
                .await?
                .map(|table| catalog::groups(&table, competition, stage))
                .unwrap_or_default())
        })
        .await
    }

    /// First and last business date of a stage; `None` when a group has no sheet
    pub async fn day_of_matches(&self, competition: &str, stage: &str) -> Result<Option<MatchWindow>> {
        guarded("day_of_matches", async {
            let groups = read_competitions(&self.cache)
                .await?
                .map(|table| catalog::groups(&table, competition, stage))
                .unwrap_or_default();
            if groups.is_empty() {
                return Ok(None);
            }

            let sheet_keys: Vec<String> =
                groups.iter().map(|group| keys::matchup(competition, stage, group)).collect();
            let sheets =
                futures::future::try_join_all(sheet_keys.iter().map(|key| read_sheet(&self.cache, key))).await?;
            let sheets: Option<Vec<_>> = sheets.into_iter().collect();
            Ok(sheets.map(|sheets| catalog::match_window(&sheets)))
        })
        .await
    }

    pub async fn list_stores(&self) -> Result<Vec<StoreRecord>> {
        guarded("list_stores", read_stores(&self.cache)).await
    }

    pub async fn rules(&self) -> Result<Vec<String>> {
        guarded("rules", async {
            Ok(read_sheet(&self.cache, keys::RULES).await?.map(|sheet| catalog::rules(&sheet)).unwrap_or_default())
        })
        .await
    }

    // Cache maintenance

    /// Replace the cached tables with a workbook
    pub async fn ingest(&self, workbook: &Workbook) -> Result<IngestReport> {
        guarded("ingest", ingest_workbook(&self.cache, workbook)).await
    }

    /// Delete cached keys by name under a prefix; no names flushes everything
    pub async fn clear_cache(&self, names: &[String], prefix: &str) -> Result<usize> {
        guarded("clear_cache", async { Ok(self.cache.clear_matching(names, prefix).await?) }).await
    }
}
