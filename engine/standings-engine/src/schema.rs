//! Typed views over the cached sheets
//!
//! Match sheets are addressed by header name; the competition, store and
//! config sheets are addressed by fixed column positions.

use crate::calendar::parse_business_date;
use crate::error::{Result, StandingsError};
use crate::models::StoreRecord;
use crate::ranking::PrefThresholds;
use crate::reward::RewardTier;
use crate::sheet::{cell, data_rows, filter_null_rows, loose_number, non_blank, Record, RawRow, Table};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Columns every match sheet must carry
pub const REQUIRED_MATCH_COLUMNS: [&str; 10] = [
    "Home",
    "Away",
    "BusDate",
    "Winner",
    "Loser",
    "PointCount",
    "HomeIdrSales",
    "AwayIdrSales",
    "HomeTarget",
    "AwayTarget",
];

/// One row of a matchup sheet. Columns not read here (ids, payout
/// bookkeeping) are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchRecord {
    pub home: Option<String>,
    pub away: Option<String>,
    pub bus_date: Option<String>,
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub point_count: Option<String>,
    pub home_sales: Option<String>,
    pub away_sales: Option<String>,
    pub home_target: Option<String>,
    pub away_target: Option<String>,
    pub home_percent: Option<String>,
    pub away_percent: Option<String>,
    pub publish: Option<String>,
}

impl MatchRecord {
    fn from_record(record: &Record) -> Self {
        let field = |name: &str| record.get(name).map(str::to_string);
        Self {
            home: field("Home"),
            away: field("Away"),
            bus_date: field("BusDate"),
            winner: field("Winner"),
            loser: field("Loser"),
            point_count: field("PointCount"),
            home_sales: field("HomeIdrSales"),
            away_sales: field("AwayIdrSales"),
            home_target: field("HomeTarget"),
            away_target: field("AwayTarget"),
            home_percent: field("HomePercent"),
            away_percent: field("AwayPercent"),
            publish: field("Publish"),
        }
    }

    /// Parsed business date, `None` when absent or unparseable
    pub fn business_date(&self) -> Option<NaiveDate> {
        self.bus_date.as_deref().and_then(parse_business_date)
    }

    /// Points awarded for the match
    pub fn points(&self) -> f64 {
        loose_number(self.point_count.as_deref())
    }

    pub fn is_published(&self) -> bool {
        self.publish.as_deref() == Some("1")
    }

    /// Whether `team` plays home or away in this match
    pub fn involves(&self, team: &str) -> bool {
        self.home.as_deref() == Some(team) || self.away.as_deref() == Some(team)
    }

    pub fn is_winner(&self, team: &str) -> bool {
        self.winner.as_deref() == Some(team)
    }

    pub fn is_loser(&self, team: &str) -> bool {
        self.loser.as_deref() == Some(team)
    }
}

/// Parse a raw matchup sheet. An empty sheet parses to no matches.
pub fn parse_match_sheet(sheet_name: &str, sheet: &[RawRow]) -> Result<Vec<MatchRecord>> {
    let rows = filter_null_rows(sheet);
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let table = Table::from_sheet(&rows);
    if let Some(missing) = REQUIRED_MATCH_COLUMNS.iter().find(|c| !table.has_column(c)) {
        return Err(StandingsError::missing_column(sheet_name, *missing));
    }

    Ok(table.records.iter().map(MatchRecord::from_record).collect())
}

/// Integer count from a sheet cell, fractional counts round up
fn count_threshold(value: f64) -> Option<usize> {
    if value.is_nan() {
        None
    } else if value <= 0.0 {
        Some(0)
    } else if value.is_infinite() {
        Some(usize::MAX)
    } else {
        Some(value.ceil() as usize)
    }
}

/// Parsed row of the competition table
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionRow {
    pub id: Option<String>,
    pub competition: Option<String>,
    pub stage: Option<String>,
    pub winners_per_group: Option<usize>,
    pub wildcards_per_group: Option<usize>,
    pub wildcards_to_next_stage: Option<usize>,
    pub group_count: Option<u32>,
    pub stage_description: Option<String>,
    pub winner_tier: RewardTier,
    pub loser_tier: RewardTier,
}

impl CompetitionRow {
    fn from_row(row: &[Option<String>]) -> Self {
        let number = |index| loose_number(cell(row, index));
        Self {
            id: cell(row, 0).map(str::to_string),
            competition: cell(row, 1).map(str::to_string),
            stage: cell(row, 2).map(str::to_string),
            winners_per_group: count_threshold(number(3)),
            wildcards_per_group: count_threshold(number(4)),
            wildcards_to_next_stage: count_threshold(number(5)),
            group_count: non_blank(row, 7).map(|raw| {
                let count = loose_number(Some(raw));
                if count.is_finite() && count >= 1.0 {
                    count.floor().min(u32::MAX as f64) as u32
                } else {
                    0
                }
            }),
            stage_description: cell(row, 17).map(str::to_string),
            winner_tier: RewardTier {
                point_total: number(14),
                partial_fraction: number(15),
                rate_per_point: number(16),
            },
            loser_tier: RewardTier {
                point_total: number(19),
                partial_fraction: number(20),
                rate_per_point: number(21),
            },
        }
    }

    pub fn thresholds(&self) -> PrefThresholds {
        PrefThresholds {
            winners: self.winners_per_group,
            wildcards: self.wildcards_per_group,
            next_stage_wildcards: self.wildcards_to_next_stage,
        }
    }
}

/// Stage identifier used by the reward columns: `{competition}_{stage}`
pub fn stage_id(competition: &str, stage: &str) -> String {
    format!("{competition}_{stage}")
}

/// The competition configuration table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompetitionTable {
    rows: Vec<CompetitionRow>,
}

impl CompetitionTable {
    /// Parse a raw competition sheet; row 0 is the header
    pub fn from_sheet(sheet: &[RawRow]) -> Self {
        let rows = filter_null_rows(sheet);
        Self { rows: data_rows(&rows).iter().map(|row| CompetitionRow::from_row(row)).collect() }
    }

    pub fn rows(&self) -> &[CompetitionRow] {
        &self.rows
    }

    /// Last row matching competition and stage names
    pub fn find_by_names(&self, competition: &str, stage: &str) -> Option<&CompetitionRow> {
        self.rows.iter().rev().find(|row| {
            row.competition.as_deref() == Some(competition) && row.stage.as_deref() == Some(stage)
        })
    }

    /// Last row whose identifier equals `{competition}_{stage}`
    pub fn find_by_id(&self, competition: &str, stage: &str) -> Option<&CompetitionRow> {
        let id = stage_id(competition, stage);
        self.rows.iter().rev().find(|row| row.id.as_deref() == Some(id.as_str()))
    }

    /// Group thresholds for a stage; unknown stages have none
    pub fn thresholds(&self, competition: &str, stage: &str) -> PrefThresholds {
        self.find_by_names(competition, stage)
            .map(CompetitionRow::thresholds)
            .unwrap_or_default()
    }

    /// Number of groups in a stage; the last matching row with a non-blank
    /// count wins and unknown stages have none
    pub fn group_count(&self, competition: &str, stage: &str) -> u32 {
        let id = stage_id(competition, stage);
        self.rows
            .iter()
            .rev()
            .filter(|row| row.id.as_deref() == Some(id.as_str()))
            .find_map(|row| row.group_count)
            .unwrap_or(0)
    }
}

/// Parse the store sheet; blank owner and image cells are absent
pub fn parse_stores(sheet: &[RawRow]) -> Vec<StoreRecord> {
    let rows = filter_null_rows(sheet);
    data_rows(&rows)
        .iter()
        .map(|row| StoreRecord {
            code: cell(row, 0).map(str::to_string),
            am: non_blank(row, 1).map(str::to_string),
            ssh: non_blank(row, 2).map(str::to_string),
            sh: non_blank(row, 3).map(str::to_string),
            image_url: non_blank(row, 4).map(str::to_string),
        })
        .collect()
}

/// Store lookup by code; later rows shadow earlier ones
#[derive(Debug, Clone, Default)]
pub struct StoreIndex<'a> {
    by_code: HashMap<&'a str, &'a StoreRecord>,
}

impl<'a> StoreIndex<'a> {
    pub fn new(stores: &'a [StoreRecord]) -> Self {
        Self {
            by_code: stores
                .iter()
                .filter_map(|store| store.code.as_deref().map(|code| (code, store)))
                .collect(),
        }
    }

    pub fn get(&self, code: &str) -> Option<&'a StoreRecord> {
        self.by_code.get(code).copied()
    }

    /// Image of a team's store, if any
    pub fn image_url(&self, code: &str) -> Option<String> {
        self.get(code).and_then(|store| store.image_url.clone())
    }
}

/// The "sales updated at" label from the config sheet
pub fn sales_update_time(sheet: &[RawRow]) -> Option<String> {
    let rows = filter_null_rows(sheet);
    rows.get(5).and_then(|row| cell(row, 1)).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::sheet_from;

    const HEADER: [Option<&str>; 11] = [
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
        Some("Publish"),
    ];

    #[test]
    fn test_parse_match_sheet() {
        let sheet = sheet_from(&[
            &HEADER,
            &[None; 11],
            &[
                Some("A"),
                Some("B"),
                Some("2024-03-18"),
                Some("A"),
                Some("B"),
                Some("3"),
                Some("100"),
                Some("80"),
                Some("100"),
                Some("100"),
                Some("1"),
            ],
            &[Some("C"), Some("D")],
        ]);

        let matches = parse_match_sheet("Matchup-X-Y-1", &sheet).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].points(), 3.0);
        assert!(matches[0].is_published());
        assert!(matches[0].involves("B"));
        assert!(matches[0].is_winner("A"));
        assert_eq!(matches[0].business_date(), NaiveDate::from_ymd_opt(2024, 3, 18));

        assert_eq!(matches[1].home.as_deref(), Some("C"));
        assert_eq!(matches[1].bus_date, None);
        assert!(matches[1].points().is_nan());
        assert!(!matches[1].is_published());
    }

    #[test]
    fn test_parse_match_sheet_ignores_extra_columns() {
        let mut header = HEADER.to_vec();
        header.extend([Some("HomeId"), Some("IdrPerPoint"), Some("PartialGiven")]);
        let mut row = vec![Some("A"), Some("B"), Some("2024-03-18"), Some("A"), Some("B"), Some("3")];
        row.extend([Some("100"), Some("80"), Some("100"), Some("100"), Some("1"), Some("7"), Some("500"), Some("0.5")]);
        let sheet = sheet_from(&[header.as_slice(), row.as_slice()]);

        let matches = parse_match_sheet("Matchup-X-Y-1", &sheet).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].home.as_deref(), Some("A"));
        assert_eq!(matches[0].points(), 3.0);
        assert!(matches[0].is_published());
    }

    #[test]
    fn test_parse_match_sheet_missing_column() {
        let sheet = sheet_from(&[&[Some("Home"), Some("Away"), Some("BusDate")], &[Some("A"), Some("B"), None]]);
        let err = parse_match_sheet("Matchup-X-Y-1", &sheet).unwrap_err();
        assert_eq!(err, StandingsError::missing_column("Matchup-X-Y-1", "Winner"));
    }

    #[test]
    fn test_parse_empty_match_sheet() {
        assert!(parse_match_sheet("Matchup-X-Y-1", &[]).unwrap().is_empty());
    }

    fn competition_sheet() -> Vec<RawRow> {
        let mut header = vec![Some("header".to_string()); 22];
        header[0] = Some("id".to_string());
        let mut row = vec![None; 22];
        let mut set = |i: usize, v: &str| row[i] = Some(v.to_string());
        set(0, "X_Y");
        set(1, "X");
        set(2, "Y");
        set(3, "1");
        set(4, "1");
        set(5, "1");
        set(14, "10");
        set(15, "0.5");
        set(16, "1000");
        set(17, "Group stage");
        set(19, "5");
        set(20, "");
        set(21, "abc");

        let mut shadowed = row.clone();
        shadowed[3] = Some("9".to_string());
        shadowed[7] = Some("2".to_string());
        row[7] = Some(String::new());
        vec![header, shadowed, row]
    }

    #[test]
    fn test_competition_table_last_match_wins() {
        let table = CompetitionTable::from_sheet(&competition_sheet());
        assert_eq!(table.rows().len(), 2);

        let thresholds = table.thresholds("X", "Y");
        assert_eq!(thresholds.winners, Some(1));
        assert_eq!(thresholds.wildcards, Some(1));
        assert_eq!(thresholds.next_stage_wildcards, Some(1));
        assert_eq!(table.group_count("X", "Y"), 2);
    }

    #[test]
    fn test_competition_row_reward_columns() {
        let table = CompetitionTable::from_sheet(&competition_sheet());
        let row = table.find_by_id("X", "Y").unwrap();

        assert_eq!(row.winner_tier.point_total, 10.0);
        assert_eq!(row.winner_tier.partial_fraction, 0.5);
        assert_eq!(row.winner_tier.rate_per_point, 1000.0);
        assert_eq!(row.loser_tier.partial_fraction, 0.0);
        assert!(row.loser_tier.rate_per_point.is_nan());
        assert_eq!(row.stage_description.as_deref(), Some("Group stage"));
    }

    #[test]
    fn test_unknown_stage_has_no_thresholds() {
        let table = CompetitionTable::from_sheet(&competition_sheet());
        assert_eq!(table.thresholds("X", "Z"), PrefThresholds::default());
        assert_eq!(table.group_count("X", "Z"), 0);
    }

    #[test]
    fn test_count_threshold() {
        assert_eq!(count_threshold(f64::NAN), None);
        assert_eq!(count_threshold(0.0), Some(0));
        assert_eq!(count_threshold(2.0), Some(2));
        assert_eq!(count_threshold(1.5), Some(2));
    }

    #[test]
    fn test_parse_stores() {
        let sheet = sheet_from(&[
            &[Some("code"), Some("am"), Some("ssh"), Some("sh"), Some("image")],
            &[Some("S001"), Some("Ann"), Some("Bo"), Some("Cy"), Some("")],
            &[Some("S002"), Some("Di"), None, None, Some("https://img/2.png")],
        ]);
        let stores = parse_stores(&sheet);
        assert_eq!(stores.len(), 2);
        assert_eq!(stores[0].image_url, None);
        assert_eq!(stores[0].am.as_deref(), Some("Ann"));
        assert_eq!(stores[1].image_url.as_deref(), Some("https://img/2.png"));
    }

    #[test]
    fn test_parse_stores_blank_owners_are_absent() {
        let sheet = sheet_from(&[
            &[Some("code"), Some("am"), Some("ssh"), Some("sh"), Some("image")],
            &[Some("S001"), Some(""), Some(""), Some(""), Some("")],
        ]);
        let store = &parse_stores(&sheet)[0];
        assert_eq!(store.code.as_deref(), Some("S001"));
        assert_eq!((store.am.as_deref(), store.ssh.as_deref(), store.sh.as_deref()), (None, None, None));
        assert_eq!(store.image_url, None);
    }

    #[test]
    fn test_store_index_last_row_wins() {
        let store = |code: &str, image: Option<&str>| StoreRecord {
            code: Some(code.to_string()),
            am: None,
            ssh: None,
            sh: None,
            image_url: image.map(str::to_string),
        };
        let stores = vec![store("S001", Some("old.png")), store("S002", None), store("S001", Some("new.png"))];
        let index = StoreIndex::new(&stores);

        assert_eq!(index.image_url("S001").as_deref(), Some("new.png"));
        assert_eq!(index.image_url("S002"), None);
        assert!(index.get("S999").is_none());
    }

    #[test]
    fn test_sales_update_time() {
        let sheet = sheet_from(&[
            &[Some("key"), Some("value")],
            &[None, None],
            &[Some("a"), Some("1")],
            &[Some("b"), Some("2")],
            &[Some("c"), Some("3")],
            &[Some("d"), Some("4")],
            &[Some("updated"), Some("19 Mar 2024 08:00")],
        ]);
        assert_eq!(sales_update_time(&sheet).as_deref(), Some("19 Mar 2024 08:00"));
        assert_eq!(sales_update_time(&[]), None);
    }
}
