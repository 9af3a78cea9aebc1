//! The durable per-domain, per-day usage aggregate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Seconds of foreground attention per domain per local calendar day.
///
/// Serializes as `{ "<domain>": { "<YYYY-MM-DD>": <seconds> } }`, the shape
/// stored under [`USAGE_DATA_KEY`](crate::USAGE_DATA_KEY) and returned to the
/// presentation layer. Ordered maps keep serialized output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsageTable(BTreeMap<String, BTreeMap<NaiveDate, u64>>);

impl UsageTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `seconds` to the bucket for `domain` on `date`, creating it if needed.
    ///
    /// Returns the new bucket total. Saturates rather than wrapping, so a
    /// bucket never decreases.
    pub fn add(&mut self, domain: &str, date: NaiveDate, seconds: u64) -> u64 {
        let bucket = self
            .0
            .entry(domain.to_string())
            .or_default()
            .entry(date)
            .or_insert(0);
        *bucket = bucket.saturating_add(seconds);
        *bucket
    }

    /// Seconds recorded for `domain` on `date`, or 0.
    pub fn seconds(&self, domain: &str, date: NaiveDate) -> u64 {
        self.0
            .get(domain)
            .and_then(|days| days.get(&date))
            .copied()
            .unwrap_or(0)
    }

    /// All per-day buckets for a domain.
    pub fn days(&self, domain: &str) -> Option<&BTreeMap<NaiveDate, u64>> {
        self.0.get(domain)
    }

    /// Known domains in lexicographic order.
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Sum over all domains for `date`.
    pub fn total_for_date(&self, date: NaiveDate) -> u64 {
        self.0
            .values()
            .filter_map(|days| days.get(&date))
            .fold(0, |acc, s| acc.saturating_add(*s))
    }

    /// Number of domains with at least one bucket.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
