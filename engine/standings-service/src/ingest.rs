//! Workbook ingestion
//!
//! Turns a spreadsheet API grid payload into raw sheets and replaces the
//! cached tables with them. Fetching the payload is up to the caller.

use crate::error::{Result, ServiceError};
use crate::keys;
use serde::{Deserialize, Serialize};
use sheet_cache::SheetCache;
use standings_engine::sheet::{cell, filter_null_rows};
use standings_engine::RawSheet;
use tracing::{error, info};

/// Sheet holding the sales update time
pub const CONFIG_SHEET: &str = "Config";
/// Sheet holding the competition table
pub const COMPETITION_SHEET: &str = "Competition";
/// Sheet holding store metadata
pub const STORE_SHEET: &str = "MasterStore";
/// Sheet holding competition rules
pub const RULES_SHEET: &str = "Rules";

#[derive(Debug, Deserialize)]
struct SpreadsheetPayload {
    #[serde(default)]
    sheets: Vec<SheetPayload>,
}

#[derive(Debug, Deserialize)]
struct SheetPayload {
    properties: SheetProperties,
    #[serde(default)]
    data: Vec<GridData>,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct GridData {
    #[serde(default, rename = "rowData")]
    row_data: Vec<RowData>,
}

#[derive(Debug, Deserialize)]
struct RowData {
    #[serde(default)]
    values: Vec<CellData>,
}

#[derive(Debug, Deserialize)]
struct CellData {
    #[serde(rename = "formattedValue")]
    formatted_value: Option<String>,
}

/// Ordered sheets of a spreadsheet, by title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<(String, RawSheet)>,
}

impl Workbook {
    /// Parse a spreadsheet API payload fetched with grid data.
    ///
    /// Sheets whose title starts with `_` are skipped; cells without a
    /// formatted value are null.
    pub fn from_sheets_payload(payload: &str) -> Result<Self> {
        let payload: SpreadsheetPayload = serde_json::from_str(payload)
            .map_err(|e| ServiceError::ingest(format!("Malformed spreadsheet payload: {e}")))?;

        let mut workbook = Workbook::default();
        for sheet in payload.sheets {
            let title = sheet.properties.title;
            if title.starts_with('_') {
                continue;
            }
            // A sheet may carry several grid blocks; the last one wins
            if let Some(grid) = sheet.data.into_iter().last() {
                let rows = grid
                    .row_data
                    .into_iter()
                    .map(|row| row.values.into_iter().map(|c| c.formatted_value).collect())
                    .collect();
                workbook.insert(title, rows);
            } else {
                workbook.insert(title, Vec::new());
            }
        }
        Ok(workbook)
    }

    /// Add or replace a sheet
    pub fn insert(&mut self, title: impl Into<String>, rows: RawSheet) {
        let title = title.into();
        match self.sheets.iter_mut().find(|(existing, _)| *existing == title) {
            Some((_, existing)) => *existing = rows,
            None => self.sheets.push((title, rows)),
        }
    }

    pub fn sheet(&self, title: &str) -> Option<&RawSheet> {
        self.sheets.iter().find(|(existing, _)| existing == title).map(|(_, rows)| rows)
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(title, _)| title.as_str())
    }

    /// Matchup sheets in workbook order
    pub fn matchup_sheets(&self) -> impl Iterator<Item = (&str, &RawSheet)> {
        self.sheets
            .iter()
            .filter(|(title, _)| title.starts_with(keys::MATCHUP_PREFIX))
            .map(|(title, rows)| (title.as_str(), rows))
    }

    fn require(&self, title: &str) -> Result<&RawSheet> {
        self.sheet(title).ok_or_else(|| ServiceError::ingest(format!("Workbook has no {title} sheet")))
    }
}

/// Outcome of an ingest run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestReport {
    pub matchup_sheets: usize,
    pub rules_loaded: bool,
}

/// Replace every cached table with the workbook's content.
///
/// The workbook is validated before anything is cleared.
pub async fn ingest_workbook(cache: &SheetCache, workbook: &Workbook) -> Result<IngestReport> {
    info!("Ingesting workbook with {} sheets", workbook.sheets.len());

    let config = workbook.require(CONFIG_SHEET)?;
    if config.get(5).and_then(|row| cell(row, 1)).map_or(true, str::is_empty) {
        error!("Sales update time is missing from the config sheet");
        return Err(ServiceError::ingest("Sales update time is missing from the config sheet"));
    }
    let competition = workbook.require(COMPETITION_SHEET)?;
    let store = workbook.require(STORE_SHEET)?;

    cache.flush().await?;

    cache.set(keys::COMPETITION, &filter_null_rows(competition)).await?;
    cache.set(keys::CONFIG, &filter_null_rows(config)).await?;
    cache.set(keys::STORE, &filter_null_rows(store)).await?;

    let rules = workbook.sheet(RULES_SHEET);
    if let Some(rules) = rules {
        cache.set(keys::RULES, &filter_null_rows(rules)).await?;
    }

    let mut matchup_sheets = 0;
    for (title, rows) in workbook.matchup_sheets() {
        cache.set(title, &filter_null_rows(rows)).await?;
        matchup_sheets += 1;
    }

    info!("Finished ingesting workbook: {} matchup sheets", matchup_sheets);
    Ok(IngestReport { matchup_sheets, rules_loaded: rules.is_some() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sheet_cache::InMemoryStore;
    use std::sync::Arc;

    fn sheet(title: &str, rows: Vec<Vec<Option<&str>>>) -> serde_json::Value {
        let row_data: Vec<serde_json::Value> = rows
            .into_iter()
            .map(|row| {
                let values: Vec<serde_json::Value> = row
                    .into_iter()
                    .map(|cell| match cell {
                        Some(value) => json!({ "formattedValue": value }),
                        None => json!({}),
                    })
                    .collect();
                json!({ "values": values })
            })
            .collect();
        json!({ "properties": { "title": title }, "data": [{ "rowData": row_data }] })
    }

    fn payload(with_update_time: bool) -> String {
        let update_time = with_update_time.then_some("19 Mar 2024 08:00");
        let config = vec![
            vec![Some("key"), Some("value")],
            vec![Some("a"), Some("1")],
            vec![Some("b"), Some("2")],
            vec![Some("c"), Some("3")],
            vec![Some("d"), Some("4")],
            vec![Some("Sales update"), update_time],
        ];
        json!({
            "sheets": [
                sheet("Config", config),
                sheet("Competition", vec![vec![Some("id")], vec![None], vec![Some("Champion_Qualifier")]]),
                sheet("MasterStore", vec![vec![Some("code")], vec![Some("S001")]]),
                sheet("_scratch", vec![vec![Some("ignored")]]),
                sheet(
                    "Matchup-Champion-Qualifier-Group_1_Store",
                    vec![vec![Some("Home"), Some("Away")], vec![Some("S001"), None]],
                ),
                { "properties": { "title": "Matchup-Champion-Qualifier-Group_2_Store" } },
            ]
        })
        .to_string()
    }

    #[test]
    fn test_parse_payload() {
        let workbook = Workbook::from_sheets_payload(&payload(true)).unwrap();

        let titles: Vec<&str> = workbook.titles().collect();
        assert_eq!(
            titles,
            vec![
                "Config",
                "Competition",
                "MasterStore",
                "Matchup-Champion-Qualifier-Group_1_Store",
                "Matchup-Champion-Qualifier-Group_2_Store",
            ]
        );

        let matchup = workbook.sheet("Matchup-Champion-Qualifier-Group_1_Store").unwrap();
        assert_eq!(matchup[1], vec![Some("S001".to_string()), None]);
        assert!(workbook.sheet("Matchup-Champion-Qualifier-Group_2_Store").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload() {
        assert!(matches!(Workbook::from_sheets_payload("{\"sheets\": 3}"), Err(ServiceError::Ingest(_))));
    }

    #[tokio::test]
    async fn test_ingest_replaces_cache() {
        let store = Arc::new(InMemoryStore::new());
        let cache = SheetCache::new(store.clone());
        cache.set("stale", &vec![vec![Some("old")]]).await.unwrap();

        let workbook = Workbook::from_sheets_payload(&payload(true)).unwrap();
        let report = ingest_workbook(&cache, &workbook).await.unwrap();

        assert_eq!(report, IngestReport { matchup_sheets: 2, rules_loaded: false });
        assert_eq!(cache.get::<RawSheet>("stale").await.unwrap(), None);

        let competition: RawSheet = cache.get(keys::COMPETITION).await.unwrap().unwrap();
        assert_eq!(competition.len(), 2);
        let matchup: RawSheet = cache.get(&keys::matchup("Champion", "Qualifier", "Group_1_Store")).await.unwrap().unwrap();
        assert_eq!(matchup.len(), 2);
        assert_eq!(store.len().await, 5);
    }

    #[tokio::test]
    async fn test_ingest_requires_sales_update_time() {
        let cache = SheetCache::new(Arc::new(InMemoryStore::new()));
        cache.set("stale", &vec![vec![Some("old")]]).await.unwrap();

        let workbook = Workbook::from_sheets_payload(&payload(false)).unwrap();
        assert!(ingest_workbook(&cache, &workbook).await.is_err());
        // Nothing was cleared
        assert!(cache.get::<RawSheet>("stale").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_ingest_requires_store_sheet() {
        let cache = SheetCache::new(Arc::new(InMemoryStore::new()));
        let mut workbook = Workbook::default();
        workbook.insert(CONFIG_SHEET, vec![vec![Some("x".to_string()), Some("y".to_string())]; 6]);
        workbook.insert(COMPETITION_SHEET, vec![]);

        let err = ingest_workbook(&cache, &workbook).await.unwrap_err();
        assert!(err.to_string().contains("MasterStore"));
    }
}
