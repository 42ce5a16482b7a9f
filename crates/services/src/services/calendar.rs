//! Month grids for the admin calendar: date arithmetic and day bucketing, no storage.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

/// Six full weeks, enough to cover any month.
pub const GRID_DAYS: usize = 42;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CalendarDay<T> {
    pub date: NaiveDate,
    /// False for the leading/trailing days borrowed from neighbouring months.
    pub in_month: bool,
    pub events: Vec<T>,
}

/// The 42 days shown for `year`-`month`, starting on the Sunday on or before the 1st.
/// Months whose grid would run past the representable date range are rejected.
pub fn month_grid(year: i32, month: u32) -> Result<Vec<NaiveDate>, CalendarError> {
    let invalid = CalendarError::InvalidMonth { year, month };
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid.clone())?;
    let lead = Days::new(u64::from(first.weekday().num_days_from_sunday()));
    let start = first.checked_sub_days(lead).ok_or(invalid.clone())?;
    let days: Vec<NaiveDate> = start.iter_days().take(GRID_DAYS).collect();
    if days.len() != GRID_DAYS {
        return Err(invalid);
    }
    Ok(days)
}

/// Half-open UTC range `[first grid day, day after last grid day)`.
pub fn grid_bounds(days: &[NaiveDate]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = days.first()?;
    let last = days.last()?;
    let end = last.succ_opt()?;
    Some((
        first.and_hms_opt(0, 0, 0)?.and_utc(),
        end.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

/// Buckets `items` onto the grid by the UTC date of `start_of(item)`. Items falling outside
/// the grid are dropped; each day's items are ordered by start.
pub fn group_by_day<T, F>(days: &[NaiveDate], month: u32, items: Vec<T>, start_of: F) -> Vec<CalendarDay<T>>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    let mut buckets: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
    for item in items {
        buckets.entry(start_of(&item).date_naive()).or_default().push(item);
    }

    days.iter()
        .map(|&date| {
            let mut events = buckets.remove(&date).unwrap_or_default();
            events.sort_by_key(|e| start_of(e));
            CalendarDay {
                date,
                in_month: date.month() == month,
                events,
            }
        })
        .collect()
}
