//! End-to-end tests over an in-memory cache

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::ingest::{CONFIG_SHEET, COMPETITION_SHEET, RULES_SHEET, STORE_SHEET};
use crate::keys;
use crate::service::{FixedClock, StandingsService};
use crate::Workbook;
use chrono::{TimeZone, Utc};
use sheet_cache::{InMemoryStore, SheetCache};
use standings_engine::{PositionChange, Pref, RawRow, RawSheet, StandingsEngine, TeamStat, Visibility};
use std::sync::Arc;

const COMPETITION: &str = "Champion";
const STAGE: &str = "Qualifier";
const GROUP_1: &str = "Group_1_Store";
const GROUP_2: &str = "Group_2_Store";

fn row(cells: &[Option<&str>]) -> RawRow {
    cells.iter().map(|c| c.map(str::to_string)).collect()
}

fn competition_sheet() -> RawSheet {
    let mut stage: RawRow = vec![None; 22];
    let mut set = |i: usize, v: &str| stage[i] = Some(v.to_string());
    set(0, "Champion_Qualifier");
    set(1, COMPETITION);
    set(2, STAGE);
    set(3, "1");
    set(4, "1");
    set(5, "1");
    set(7, "2");
    set(14, "10");
    set(15, "0.5");
    set(16, "1000");
    set(17, "Qualifying round");
    vec![row(&[Some("id"), Some("competition"), Some("stage")]), stage]
}

fn config_sheet() -> RawSheet {
    let mut rows: RawSheet = (0..5).map(|i| row(&[Some("key"), Some(&*i.to_string())])).collect();
    rows.push(row(&[Some("Sales update"), Some("20 Mar 2024 08:00")]));
    rows
}

fn store_sheet() -> RawSheet {
    vec![
        row(&[Some("code"), Some("am"), Some("ssh"), Some("sh"), Some("image")]),
        row(&[Some("A"), Some("Ana"), Some("Budi"), Some("Citra"), Some("https://img.example/a.png")]),
        row(&[Some("B"), Some("Ana"), Some("Budi"), Some("Dewi"), None]),
    ]
}

fn match_sheet(rows: &[(&str, &str, &str, &str, &str, &str)]) -> RawSheet {
    let header = row(&[
        Some("Home"),
        Some("Away"),
        Some("BusDate"),
        Some("Winner"),
        Some("Loser"),
        Some("PointCount"),
        Some("HomeIdrSales"),
        Some("AwayIdrSales"),
        Some("HomeTarget"),
        Some("AwayTarget"),
        Some("HomePercent"),
        Some("AwayPercent"),
        Some("Publish"),
    ]);
    let mut sheet = vec![header];
    for &(home, away, date, winner, points, publish) in rows {
        let loser = if winner == home { away } else { home };
        sheet.push(row(&[
            Some(home),
            Some(away),
            Some(date),
            Some(winner),
            Some(loser),
            Some(points),
            Some("100"),
            Some("100"),
            Some("100"),
            Some("100"),
            Some("100"),
            Some("100"),
            Some(publish),
        ]));
    }
    sheet
}

/// Group 1: A leads B leads C. Group 2: D leads E leads F.
async fn seeded_cache() -> SheetCache {
    let cache = SheetCache::new(Arc::new(InMemoryStore::new()));
    cache.set(keys::COMPETITION, &competition_sheet()).await.unwrap();
    cache.set(keys::CONFIG, &config_sheet()).await.unwrap();
    cache.set(keys::STORE, &store_sheet()).await.unwrap();
    cache
        .set(
            &keys::matchup(COMPETITION, STAGE, GROUP_1),
            &match_sheet(&[
                ("B", "C", "2024-03-17", "B", "1", "1"),
                ("A", "B", "2024-03-18", "A", "3", "1"),
                ("C", "A", "2024-03-19", "A", "3", "0"),
            ]),
        )
        .await
        .unwrap();
    cache
        .set(
            &keys::matchup(COMPETITION, STAGE, GROUP_2),
            &match_sheet(&[
                ("D", "E", "2024-03-18", "D", "3", "1"),
                ("E", "F", "2024-03-19", "E", "2", "1"),
            ]),
        )
        .await
        .unwrap();
    cache
}

fn service(cache: SheetCache) -> StandingsService {
    let engine = StandingsEngine::from_config(&ServiceConfig::default().engine_config()).unwrap();
    // 20:00 on 2024-03-20 at +08:00, so matches up to the 19th count
    let now = Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap();
    StandingsService::new(cache, engine).with_clock(Arc::new(FixedClock(now)))
}

fn names(teams: &[TeamStat]) -> Vec<&str> {
    teams.iter().map(|t| t.team.as_str()).collect()
}

#[tokio::test]
async fn test_group_standing() {
    let service = service(seeded_cache().await);
    let standing = service.group_standing(COMPETITION, STAGE, GROUP_1).await.unwrap();

    assert_eq!(names(&standing), vec!["A", "B", "C"]);
    let a = &standing[0];
    assert_eq!((a.total_point, a.win, a.lose, a.total_matches), (6.0, 2, 0, 2));
    assert_eq!((a.total_reward, a.total_paid), (6000.0, 3000.0));
    assert_eq!(a.pref, Some(Pref::Win));
    assert_eq!(a.position, PositionChange::Delta(0));
    assert_eq!(standing[1].pref, Some(Pref::Wildcard));
    assert_eq!(standing[2].pref, None);
    assert!(standing.iter().all(|t| t.group.is_none()));
}

#[tokio::test]
async fn test_group_results_have_no_movement() {
    let service = service(seeded_cache().await);
    let results = service.group_results(COMPETITION, STAGE, GROUP_2).await.unwrap();

    assert_eq!(names(&results), vec!["D", "E", "F"]);
    assert!(results.iter().all(|t| t.position == PositionChange::Delta(0)));
}

#[tokio::test]
async fn test_detail_respects_visibility() {
    let service = service(seeded_cache().await);

    let all = service.group_standing_detail(COMPETITION, STAGE, GROUP_1, Visibility::All).await.unwrap();
    assert_eq!(all[0].stat.team, "A");
    assert_eq!(all[0].stat.team_img.as_deref(), Some("https://img.example/a.png"));
    assert_eq!(all[0].match_played.len(), 2);
    assert_eq!(all[0].match_played[0].date.as_deref(), Some("2024-03-19"));

    let published =
        service.group_standing_detail(COMPETITION, STAGE, GROUP_1, Visibility::PublishedOnly).await.unwrap();
    let a = published.iter().find(|d| d.stat.team == "A").unwrap();
    assert_eq!(a.stat.total_point, 3.0);
    assert_eq!(a.match_played.len(), 1);
}

#[tokio::test]
async fn test_stage_wildcards_and_summary() {
    let service = service(seeded_cache().await);

    let pool = service.wildcard_standing(COMPETITION, STAGE).await.unwrap();
    assert_eq!(names(&pool), vec!["E", "B"]);
    assert_eq!(pool[0].pref, Some(Pref::LuckyWildcard));
    assert_eq!(pool[0].group.as_deref(), Some(GROUP_2));
    assert_eq!(pool[1].pref, None);

    let summary = service.result_summary(COMPETITION, STAGE).await.unwrap();
    assert_eq!(names(&summary), vec!["A", "D", "E"]);

    let sections = service.summary_with_all_wildcards(COMPETITION, STAGE).await.unwrap();
    assert_eq!(sections[0].name, "groupWinner");
    assert_eq!(names(&sections[0].teams), vec!["A", "D"]);
    assert_eq!(sections[1].name, "wildcard");
    assert_eq!(names(&sections[1].teams), vec!["E", "B"]);

    let breakdown = service.all_group_standings(COMPETITION, STAGE).await.unwrap();
    assert_eq!(breakdown.len(), 2);
    assert!(breakdown[1].teams.iter().all(|t| t.group.as_deref() == Some(GROUP_2)));
}

#[tokio::test]
async fn test_missing_competition_table_is_internal_error() {
    let service = service(SheetCache::new(Arc::new(InMemoryStore::new())));
    let err = service.group_standing(COMPETITION, STAGE, GROUP_1).await.unwrap_err();
    assert!(matches!(err, ServiceError::Internal { operation: "group_standing" }));
}

#[tokio::test]
async fn test_stage_breakdown_before_first_ingest_is_empty() {
    let service = service(SheetCache::new(Arc::new(InMemoryStore::new())));

    assert!(service.all_group_standings(COMPETITION, STAGE).await.unwrap().is_empty());
    let err = service.wildcard_standing(COMPETITION, STAGE).await.unwrap_err();
    assert!(matches!(err, ServiceError::Internal { operation: "wildcard_standing" }));
}

#[tokio::test]
async fn test_missing_matchup_sheet_is_empty() {
    let cache = seeded_cache().await;
    cache.delete(&keys::matchup(COMPETITION, STAGE, GROUP_2)).await.unwrap();
    let service = service(cache);

    assert!(service.group_standing(COMPETITION, STAGE, GROUP_2).await.unwrap().is_empty());
    assert_eq!(service.day_of_matches(COMPETITION, STAGE).await.unwrap(), None);
}

#[tokio::test]
async fn test_listings() {
    let cache = seeded_cache().await;
    let service = service(cache.clone());

    let matches = service.list_matches(COMPETITION, STAGE, GROUP_1).await.unwrap();
    assert_eq!(matches.len(), 3);
    assert_eq!(matches[1].team1_image_url.as_deref(), Some("https://img.example/a.png"));
    assert_eq!(matches[0].sales_update_time.as_deref(), Some("20 Mar 2024 08:00"));

    let team = service.list_team_matches(COMPETITION, STAGE, GROUP_1, "A", Visibility::PublishedOnly).await.unwrap();
    assert_eq!(team.len(), 1);

    let latest = service.latest_stage_matches(COMPETITION, GROUP_2).await.unwrap().unwrap();
    assert_eq!(latest.stage.id, STAGE);
    assert_eq!(latest.matches.len(), 2);

    cache.delete(keys::CONFIG).await.unwrap();
    assert!(service.list_matches(COMPETITION, STAGE, GROUP_1).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_reads() {
    let service = service(seeded_cache().await);

    assert_eq!(service.list_competitions().await.unwrap(), vec![COMPETITION]);
    let stages = service.list_stages(COMPETITION).await.unwrap();
    assert_eq!(stages[0].name.as_deref(), Some("Qualifying round"));
    assert_eq!(service.list_groups(COMPETITION, STAGE).await.unwrap(), vec![GROUP_1, GROUP_2]);

    let window = service.day_of_matches(COMPETITION, STAGE).await.unwrap().unwrap();
    assert_eq!((window.start_date.as_str(), window.end_date.as_str()), ("2024-03-17", "2024-03-19"));

    assert_eq!(service.list_stores().await.unwrap().len(), 2);
    assert!(service.rules().await.unwrap().is_empty());
    assert!(service.latest_stage_matches("Rookie", GROUP_1).await.unwrap().is_none());
}

#[tokio::test]
async fn test_ingest_then_standing() {
    let service = service(SheetCache::new(Arc::new(InMemoryStore::new())));

    let mut workbook = Workbook::default();
    workbook.insert(CONFIG_SHEET, config_sheet());
    workbook.insert(COMPETITION_SHEET, competition_sheet());
    workbook.insert(STORE_SHEET, store_sheet());
    workbook.insert(RULES_SHEET, vec![row(&[Some("Rules")]), row(&[Some("Play fair")])]);
    workbook.insert(
        keys::matchup(COMPETITION, STAGE, GROUP_1),
        match_sheet(&[("A", "B", "2024-03-18", "B", "3", "1")]),
    );

    let report = service.ingest(&workbook).await.unwrap();
    assert_eq!(report.matchup_sheets, 1);
    assert!(report.rules_loaded);

    let standing = service.group_standing(COMPETITION, STAGE, GROUP_1).await.unwrap();
    assert_eq!(names(&standing), vec!["B", "A"]);
    assert_eq!(service.rules().await.unwrap(), vec!["Play fair"]);
}

#[tokio::test]
async fn test_failed_ingest_is_internal_error() {
    let service = service(seeded_cache().await);
    let err = service.ingest(&Workbook::default()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Internal { operation: "ingest" }));
    assert_eq!(service.list_competitions().await.unwrap(), vec![COMPETITION]);
}

#[tokio::test]
async fn test_clear_cache_by_competition() {
    let cache = seeded_cache().await;
    let service = service(cache.clone());

    let cleared = service.clear_cache(&[COMPETITION.to_string()], keys::MATCHUP_PREFIX).await.unwrap();
    assert_eq!(cleared, 2);
    assert!(service.group_standing(COMPETITION, STAGE, GROUP_1).await.unwrap().is_empty());
    assert!(cache.get::<RawSheet>(keys::COMPETITION).await.unwrap().is_some());

    service.clear_cache(&[], keys::MATCHUP_PREFIX).await.unwrap();
    assert!(cache.get::<RawSheet>(keys::COMPETITION).await.unwrap().is_none());
}
