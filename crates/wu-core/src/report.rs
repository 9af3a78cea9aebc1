//! Derived views over the usage table for presentation.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::usage::UsageTable;

/// One domain's time on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainUsage {
    pub domain: String,
    pub seconds: u64,
}

/// One day's time for a given domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyUsage {
    pub date: NaiveDate,
    pub seconds: u64,
}

/// Totals over a window of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesSummary {
    pub total_seconds: u64,
    /// Rounded to the nearest second over every day in the window,
    /// including days with no usage.
    pub daily_average_seconds: u64,
}

/// Every known domain with its time on `date`, most-used first.
///
/// Domains with no time that day are included with 0 and sort last. Ties
/// break alphabetically.
pub fn ranked_for_date(table: &UsageTable, date: NaiveDate) -> Vec<DomainUsage> {
    let mut ranked: Vec<DomainUsage> = table
        .domains()
        .map(|domain| DomainUsage {
            domain: domain.to_string(),
            seconds: table.seconds(domain, date),
        })
        .collect();
    ranked.sort_by(|a, b| b.seconds.cmp(&a.seconds).then_with(|| a.domain.cmp(&b.domain)));
    ranked
}

/// Chronological per-day usage for the `days` days ending at `end`.
///
/// Days without data are filled with 0.
pub fn series(table: &UsageTable, domain: &str, end: NaiveDate, days: u32) -> Vec<DailyUsage> {
    (0..i64::from(days))
        .rev()
        .map(|ago| {
            let date = end - Duration::days(ago);
            DailyUsage {
                date,
                seconds: table.seconds(domain, date),
            }
        })
        .collect()
}

/// Total and per-day average of a series.
pub fn summarize(series: &[DailyUsage]) -> SeriesSummary {
    let total_seconds = series
        .iter()
        .fold(0u64, |acc, day| acc.saturating_add(day.seconds));
    let days = series.len() as u64;
    let daily_average_seconds = if days == 0 {
        0
    } else {
        (total_seconds + days / 2) / days
    };
    SeriesSummary {
        total_seconds,
        daily_average_seconds,
    }
}

/// Formats seconds as `"45s"`, `"12m"` or `"2h 5m"`.
pub fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}
