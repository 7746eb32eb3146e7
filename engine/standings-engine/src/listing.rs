//! Match listings
//!
//! Listings show every match of a group (no business-date cutoff) joined with
//! store ownership and the latest sales update label.

use crate::models::{MatchListing, StoreRecord, Visibility};
use crate::schema::{MatchRecord, StoreIndex};
use crate::sheet::loose_number;
use std::collections::HashSet;

/// Listing of every match, oldest first
pub fn list_matches(
    matches: &[MatchRecord],
    stores: &[StoreRecord],
    sales_update_time: Option<&str>,
) -> Vec<MatchListing> {
    build_listing(matches, matches.iter(), stores, sales_update_time)
}

/// Listing of one team's visible matches, oldest first
pub fn list_team_matches(
    matches: &[MatchRecord],
    team: &str,
    visibility: Visibility,
    stores: &[StoreRecord],
    sales_update_time: Option<&str>,
) -> Vec<MatchListing> {
    let selected = matches
        .iter()
        .filter(|record| visibility == Visibility::All || record.is_published())
        .filter(|record| record.involves(team));
    build_listing(matches, selected, stores, sales_update_time)
}

fn build_listing<'a>(
    all: &'a [MatchRecord],
    selected: impl Iterator<Item = &'a MatchRecord>,
    stores: &[StoreRecord],
    sales_update_time: Option<&str>,
) -> Vec<MatchListing> {
    let stores = StoreIndex::new(stores);
    let approved: HashSet<(Option<&str>, Option<&str>)> = all
        .iter()
        .filter(|record| record.is_published())
        .map(|record| (record.home.as_deref(), record.away.as_deref()))
        .collect();

    let mut listing: Vec<(Option<_>, MatchListing)> = selected
        .map(|record| {
            let home = record.home.as_deref().and_then(|code| stores.get(code));
            let away = record.away.as_deref().and_then(|code| stores.get(code));
            let entry = MatchListing {
                team1: record.home.clone(),
                team2: record.away.clone(),
                team1_achv: percent(record.home_percent.as_deref()),
                team2_achv: percent(record.away_percent.as_deref()),
                date: record.bus_date.clone().filter(|date| !date.is_empty()),
                am1: home.and_then(|s| s.am.clone()),
                ssh1: home.and_then(|s| s.ssh.clone()),
                sh1: home.and_then(|s| s.sh.clone()),
                am2: away.and_then(|s| s.am.clone()),
                ssh2: away.and_then(|s| s.ssh.clone()),
                sh2: away.and_then(|s| s.sh.clone()),
                team1_image_url: home.and_then(|s| s.image_url.clone()),
                team2_image_url: away.and_then(|s| s.image_url.clone()),
                sales_update_time: sales_update_time.map(str::to_string),
                is_approved: approved.contains(&(record.home.as_deref(), record.away.as_deref())),
            };
            (record.business_date(), entry)
        })
        .collect();

    listing.sort_by_key(|(date, _)| *date);
    listing.into_iter().map(|(_, entry)| entry).collect()
}

/// Achievement percent cell; anything non-numeric shows as 0
fn percent(value: Option<&str>) -> f64 {
    let parsed = loose_number(value);
    if parsed.is_nan() {
        0.0
    } else {
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(home: &str, away: &str, date: Option<&str>, publish: Option<&str>) -> MatchRecord {
        MatchRecord {
            home: Some(home.to_string()),
            away: Some(away.to_string()),
            bus_date: date.map(str::to_string),
            home_percent: Some("87.5".to_string()),
            away_percent: Some("n/a".to_string()),
            publish: publish.map(str::to_string),
            ..Default::default()
        }
    }

    fn stores() -> Vec<StoreRecord> {
        vec![StoreRecord {
            code: Some("A".to_string()),
            am: Some("Ann".to_string()),
            ssh: Some("Bo".to_string()),
            sh: Some("Cy".to_string()),
            image_url: Some("a.png".to_string()),
        }]
    }

    #[test]
    fn test_list_matches_sorted_and_joined() {
        let matches = vec![
            fixture("A", "B", Some("2024-03-19"), Some("1")),
            fixture("C", "A", Some("2024-03-18"), None),
            fixture("B", "C", None, None),
        ];
        let listing = list_matches(&matches, &stores(), Some("19 Mar 08:00"));

        let dates: Vec<Option<&str>> = listing.iter().map(|m| m.date.as_deref()).collect();
        assert_eq!(dates, vec![None, Some("2024-03-18"), Some("2024-03-19")]);

        let first = &listing[2];
        assert_eq!(first.team1.as_deref(), Some("A"));
        assert_eq!(first.am1.as_deref(), Some("Ann"));
        assert_eq!(first.team1_image_url.as_deref(), Some("a.png"));
        assert_eq!(first.am2, None);
        assert_eq!(first.team1_achv, 87.5);
        assert_eq!(first.team2_achv, 0.0);
        assert!(first.is_approved);
        assert_eq!(first.sales_update_time.as_deref(), Some("19 Mar 08:00"));

        assert_eq!(listing[1].ssh2.as_deref(), Some("Bo"));
        assert!(!listing[1].is_approved);
    }

    #[test]
    fn test_approval_follows_home_away_pair() {
        let matches = vec![
            fixture("A", "B", Some("2024-03-18"), None),
            fixture("A", "B", Some("2024-03-19"), Some("1")),
        ];
        let listing = list_matches(&matches, &[], None);
        assert!(listing.iter().all(|m| m.is_approved));
    }

    #[test]
    fn test_list_team_matches() {
        let matches = vec![
            fixture("A", "B", Some("2024-03-19"), Some("1")),
            fixture("C", "A", Some("2024-03-18"), None),
            fixture("B", "C", Some("2024-03-17"), Some("1")),
        ];

        let admin = list_team_matches(&matches, "A", Visibility::All, &stores(), None);
        assert_eq!(admin.len(), 2);
        assert_eq!(admin[0].team1.as_deref(), Some("C"));

        let client = list_team_matches(&matches, "A", Visibility::PublishedOnly, &stores(), None);
        assert_eq!(client.len(), 1);
        assert_eq!(client[0].team2.as_deref(), Some("B"));
    }
}
