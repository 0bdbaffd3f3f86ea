//! In-memory aggregation over fetched rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERIES_MONTHS: u32 = 6;
pub const MAX_SERIES_MONTHS: u32 = 24;

/// Count rows grouped by a string key.
pub fn count_by<T, K, F>(rows: &[T], key: F) -> BTreeMap<String, u64>
where
    F: Fn(&T) -> K,
    K: Into<String>,
{
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(key(row).into()).or_insert(0) += 1;
    }
    counts
}

/// Percentage change from `previous` to `current`.
///
/// With no previous activity any current activity counts as 100% growth.
pub fn growth_rate(previous: u64, current: u64) -> f64 {
    if previous == 0 {
        return if current > 0 { 100.0 } else { 0.0 };
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}

/// `YYYY-MM` bucket of a timestamp.
pub fn month_key(at: DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Number of series months, defaulted and clamped to `1..=MAX_SERIES_MONTHS`.
pub fn series_months(requested: Option<u32>) -> u32 {
    requested.unwrap_or(DEFAULT_SERIES_MONTHS).clamp(1, MAX_SERIES_MONTHS)
}

/// The last `months` month keys ending with the month of `now`, oldest first.
pub fn month_window(now: DateTime<Utc>, months: u32) -> Vec<String> {
    let current = now.year() * 12 + now.month0() as i32;
    (0..months as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
        })
        .collect()
}

/// Count for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyCount {
    pub month: String,
    pub count: u64,
}

/// Zero-filled monthly counts for the window ending at `now`.
pub fn monthly_series<I>(timestamps: I, now: DateTime<Utc>, months: u32) -> Vec<MonthlyCount>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let window = month_window(now, months);
    let mut buckets: BTreeMap<String, u64> = window.iter().map(|m| (m.clone(), 0)).collect();
    for at in timestamps {
        if let Some(count) = buckets.get_mut(&month_key(at)) {
            *count += 1;
        }
    }
    window
        .into_iter()
        .map(|month| {
            let count = buckets.get(&month).copied().unwrap_or(0);
            MonthlyCount { month, count }
        })
        .collect()
}

/// This month against last month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Growth {
    pub current: u64,
    pub previous: u64,
    pub rate: f64,
}

impl Growth {
    pub fn new(previous: u64, current: u64) -> Self {
        Self {
            current,
            previous,
            rate: growth_rate(previous, current),
        }
    }
}

/// Month-over-month growth of the rows created at `timestamps`.
pub fn month_over_month<I>(timestamps: I, now: DateTime<Utc>) -> Growth
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let series = monthly_series(timestamps, now, 2);
    Growth::new(series[0].count, series[1].count)
}
