//! In-memory collaborators for tests and embedding.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::ports::{Clock, StoreError, TabError, TabId, TabInfo, TabQuery, UsageStore};

/// Key-value store held in a `HashMap`.
///
/// Writes can be made to fail with [`MemoryStore::set_fail_writes`] to
/// simulate an unavailable backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, serde_json::Value>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_value(key: &str, value: serde_json::Value) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value);
        store
    }

    pub const fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes.
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Direct read, bypassing the trait.
    pub fn value(&self, key: &str) -> Option<&serde_json::Value> {
        self.values.get(key)
    }
}

impl UsageStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep a handle while the
/// accumulator owns another. Calendar days are computed in UTC to keep
/// tests independent of the host time zone.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.now.set(instant);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.date_naive()
    }
}

/// Fixed set of tabs keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StaticTabs {
    tabs: HashMap<TabId, TabInfo>,
}

impl StaticTabs {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tab(mut self, id: u64, url: &str) -> Self {
        let id = TabId(id);
        self.tabs.insert(
            id,
            TabInfo {
                id,
                url: Some(url.to_string()),
            },
        );
        self
    }
}

impl TabQuery for StaticTabs {
    fn tab(&self, id: TabId) -> Result<TabInfo, TabError> {
        self.tabs.get(&id).cloned().ok_or(TabError::NotFound(id))
    }
}
