//! # Command Line Interface
//!
//! Query standings from the cache and refresh it from a spreadsheet payload.

use crate::ingest::Workbook;
use crate::service::StandingsService;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use standings_engine::Visibility;
use std::path::PathBuf;

/// Standings CLI for sales competitions
#[derive(Parser)]
#[command(name = "standings")]
#[command(about = "Standings, rewards and wildcards for multi-stage sales competitions")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// A group within a stage
#[derive(Args, Debug, Clone)]
pub struct GroupArgs {
    pub competition: String,
    pub stage: String,
    pub group: String,
}

/// A stage within a competition
#[derive(Args, Debug, Clone)]
pub struct StageArgs {
    pub competition: String,
    pub stage: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Group standing with day-over-day movement
    Standing(GroupArgs),
    /// Group results as of today, without movement
    Results(GroupArgs),
    /// Group standing with match history and team images
    Detail {
        #[command(flatten)]
        group: GroupArgs,
        /// Only count published match rows
        #[arg(long)]
        published_only: bool,
    },
    /// Cross-group wildcard pool
    Wildcard(StageArgs),
    /// Group winners and promoted wildcards
    Summary(StageArgs),
    /// Group winners and the whole wildcard pool
    SummaryAll(StageArgs),
    /// Standing of every group in a stage
    All(StageArgs),
    /// Every match of a group
    Matches(GroupArgs),
    /// Every match of a group in the competition's latest stage
    LatestMatches { competition: String, group: String },
    /// One team's matches in a group
    TeamMatches {
        #[command(flatten)]
        group: GroupArgs,
        team: String,
        /// Only list published match rows
        #[arg(long)]
        published_only: bool,
    },
    /// Competition names
    Competitions,
    /// Stages of a competition
    Stages { competition: String },
    /// Groups of a stage
    Groups(StageArgs),
    /// First and last business date of a stage
    Days(StageArgs),
    /// Store metadata
    Stores,
    /// Competition rules
    Rules,
    /// Replace the cache with a spreadsheet API payload (JSON file)
    Ingest { payload: PathBuf },
    /// Delete cached keys named `{prefix}-{name}*`; no names flushes everything
    Clear {
        names: Vec<String>,
        #[arg(long, default_value = "Matchup")]
        prefix: String,
    },
    /// Print the effective configuration as TOML
    Config,
}

fn visibility(published_only: bool) -> Visibility {
    if published_only {
        Visibility::PublishedOnly
    } else {
        Visibility::All
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("Failed to render output")?);
    Ok(())
}

/// CLI handler
pub struct CliHandler {
    service: StandingsService,
}

impl CliHandler {
    pub fn new(service: StandingsService) -> Self {
        Self { service }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        let service = &self.service;
        match command {
            Commands::Standing(g) => print_json(&service.group_standing(&g.competition, &g.stage, &g.group).await?),
            Commands::Results(g) => print_json(&service.group_results(&g.competition, &g.stage, &g.group).await?),
            Commands::Detail { group: g, published_only } => print_json(
                &service
                    .group_standing_detail(&g.competition, &g.stage, &g.group, visibility(published_only))
                    .await?,
            ),
            Commands::Wildcard(s) => print_json(&service.wildcard_standing(&s.competition, &s.stage).await?),
            Commands::Summary(s) => print_json(&service.result_summary(&s.competition, &s.stage).await?),
            Commands::SummaryAll(s) => {
                print_json(&service.summary_with_all_wildcards(&s.competition, &s.stage).await?)
            }
            Commands::All(s) => print_json(&service.all_group_standings(&s.competition, &s.stage).await?),
            Commands::Matches(g) => print_json(&service.list_matches(&g.competition, &g.stage, &g.group).await?),
            Commands::LatestMatches { competition, group } => {
                print_json(&service.latest_stage_matches(&competition, &group).await?)
            }
            Commands::TeamMatches { group: g, team, published_only } => print_json(
                &service
                    .list_team_matches(&g.competition, &g.stage, &g.group, &team, visibility(published_only))
                    .await?,
            ),
            Commands::Competitions => print_json(&service.list_competitions().await?),
            Commands::Stages { competition } => print_json(&service.list_stages(&competition).await?),
            Commands::Groups(s) => print_json(&service.list_groups(&s.competition, &s.stage).await?),
            Commands::Days(s) => print_json(&service.day_of_matches(&s.competition, &s.stage).await?),
            Commands::Stores => print_json(&service.list_stores().await?),
            Commands::Rules => print_json(&service.rules().await?),
            Commands::Ingest { payload } => {
                let raw = tokio::fs::read_to_string(&payload)
                    .await
                    .with_context(|| format!("Failed to read {}", payload.display()))?;
                let workbook = Workbook::from_sheets_payload(&raw)?;
                print_json(&service.ingest(&workbook).await?)
            }
            Commands::Clear { names, prefix } => print_json(&service.clear_cache(&names, &prefix).await?),
            Commands::Config => {
                anyhow::bail!("The config command does not need a cache connection; run it before connecting")
            }
        }
    }
}
