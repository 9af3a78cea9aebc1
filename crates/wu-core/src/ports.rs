//! Interfaces to the collaborators the accumulator depends on.
//!
//! The windowing system answers tab queries, the persistence store holds the
//! usage table under a single key, and the clock supplies "now" plus the
//! local calendar day of an instant. Adapters implement these traits; tests
//! use the in-memory versions in [`crate::memory`].

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persistence key holding the entire usage table.
pub const USAGE_DATA_KEY: &str = "webUsageData";

/// Name of the periodic checkpoint alarm.
pub const CHECKPOINT_ALARM: &str = "saveData";

/// Default checkpoint cadence (0.25 minutes).
pub const DEFAULT_CHECKPOINT_INTERVAL: Duration = Duration::from_secs(15);

/// Browser-assigned tab identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the windowing system reports about a tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    pub id: TabId,
    /// Current URL, if the browser exposes one.
    pub url: Option<String>,
}

/// Tab query failures.
#[derive(Debug, Error)]
pub enum TabError {
    /// The tab closed between the event and the query.
    #[error("tab {0} not found")]
    NotFound(TabId),
    /// The windowing system could not answer.
    #[error("tab query failed: {0}")]
    Unavailable(String),
}

/// Looks up tab details by id.
pub trait TabQuery {
    fn tab(&self, id: TabId) -> Result<TabInfo, TabError>;
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store rejected the operation.
    #[error("storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The store is not reachable at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable string-keyed map of JSON values.
pub trait UsageStore {
    /// Reads the value stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;

    /// Replaces the value stored under `key`.
    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}

/// Source of wall-clock time.
pub trait Clock {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;

    /// The local calendar day containing `instant`.
    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&Local).date_naive()
    }
}

/// Clock backed by the system time and local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
