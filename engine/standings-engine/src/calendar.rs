//! Business-day calendar
//!
//! Sales for a day are only complete some hours after local midnight, so the
//! standings date lags the wall clock until the cutoff hour.

use crate::config::{CalendarConfig, DEFAULT_CUTOFF_HOUR};
use crate::error::Result;
use crate::schema::MatchRecord;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, Timelike, Utc};
use tracing::info;

/// Resolves which business date standings are computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessCalendar {
    offset: FixedOffset,
    cutoff_hour: u32,
}

impl BusinessCalendar {
    pub fn new(offset: FixedOffset, cutoff_hour: u32) -> Self {
        Self { offset, cutoff_hour }
    }

    /// Build from validated configuration
    pub fn from_config(config: &CalendarConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.offset()?, config.cutoff_hour))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn cutoff_hour(&self) -> u32 {
        self.cutoff_hour
    }

    /// Reference date for "today's" standings at instant `now`.
    ///
    /// The local calendar date only replaces the UTC date once it is ahead of
    /// it and the local hour has reached the cutoff.
    pub fn filter_date(&self, now: DateTime<Utc>) -> NaiveDate {
        let utc_date = now.date_naive();
        let local = now.with_timezone(&self.offset);
        let local_date = local.date_naive();

        let date = if local_date > utc_date && local.hour() >= self.cutoff_hour {
            local_date
        } else {
            utc_date
        };
        info!("Filter date {} (offset {}, UTC time {})", date, self.offset, now);
        date
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        CalendarConfig::default()
            .offset()
            .map(|offset| Self::new(offset, DEFAULT_CUTOFF_HOUR))
            .unwrap_or_else(|_| Self::new(Utc.fix(), DEFAULT_CUTOFF_HOUR))
    }
}

/// The calendar day before `date`
pub fn previous_day(date: NaiveDate) -> NaiveDate {
    date.pred_opt().unwrap_or(date)
}

/// Parse a sheet business date. Unparseable values yield `None`.
pub fn parse_business_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc().date());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").ok().map(|dt| dt.date())
}

/// Matches dated strictly before `reference`; undated rows are excluded
pub fn retain_before<'a>(
    records: impl IntoIterator<Item = &'a MatchRecord>,
    reference: NaiveDate,
) -> Vec<&'a MatchRecord> {
    records
        .into_iter()
        .filter(|record| record.business_date().is_some_and(|date| date < reference))
        .collect()
}
