//! Catalog reads over the competition, store, rules and matchup sheets

use crate::calendar::parse_business_date;
use crate::models::{MatchWindow, Stage};
use crate::schema::CompetitionTable;
use crate::sheet::{cell, data_rows, filter_null_rows, non_blank, RawRow, RawSheet};
use chrono::NaiveDate;
use std::collections::HashSet;

/// Name of the `index`-th group (1-based) of a stage
pub fn group_name(index: u32) -> String {
    format!("Group_{index}_Store")
}

/// Distinct competition names in first-seen order
pub fn competitions(table: &CompetitionTable) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .rows()
        .iter()
        .filter_map(|row| row.competition.as_deref())
        .filter(|name| !name.is_empty() && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Stages of a competition in table order
pub fn stages(table: &CompetitionTable, competition: &str) -> Vec<Stage> {
    table
        .rows()
        .iter()
        .filter(|row| row.competition.as_deref() == Some(competition))
        .filter_map(|row| {
            let id = row.stage.as_deref().filter(|stage| !stage.is_empty())?;
            Some(Stage { id: id.to_string(), name: row.stage_description.clone() })
        })
        .collect()
}

/// The last stage listed for a competition
pub fn latest_stage(table: &CompetitionTable, competition: &str) -> Option<Stage> {
    stages(table, competition).pop()
}

/// Group names of a stage
pub fn groups(table: &CompetitionTable, competition: &str, stage: &str) -> Vec<String> {
    (1..=table.group_count(competition, stage)).map(group_name).collect()
}

/// First and last business date across matchup sheets.
///
/// Dates are read from column 2. Unparseable dates are ignored; when no
/// usable date exists both ends are empty.
pub fn match_window(sheets: &[RawSheet]) -> MatchWindow {
    let sheets: Vec<RawSheet> = sheets.iter().map(|sheet| filter_null_rows(sheet)).collect();
    let mut seen = HashSet::new();
    let dated: Vec<(NaiveDate, &str)> = sheets
        .iter()
        .flat_map(|sheet| data_rows(sheet).iter())
        .filter_map(|row| non_blank(row, 2))
        .filter(|raw| seen.insert(*raw))
        .filter_map(|raw| parse_business_date(raw).map(|date| (date, raw)))
        .collect();

    let start = dated.iter().min_by_key(|(date, _)| *date);
    let end = dated.iter().max_by_key(|(date, _)| *date);
    match (start, end) {
        (Some((_, start)), Some((_, end))) => {
            MatchWindow { start_date: start.to_string(), end_date: end.to_string() }
        }
        _ => MatchWindow::default(),
    }
}

/// Rules text: every non-null cell after the header, row by row
pub fn rules(sheet: &[RawRow]) -> Vec<String> {
    let rows = filter_null_rows(sheet);
    data_rows(&rows)
        .iter()
        .flat_map(|row| (0..row.len()).filter_map(move |i| cell(row, i)))
        .map(str::to_string)
        .collect()
}
