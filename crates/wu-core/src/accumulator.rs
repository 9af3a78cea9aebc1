//! The usage accumulator: turns focus and navigation events into per-day totals.
//!
//! # Algorithm Summary
//!
//! 1. Every focus change or navigation in the active tab commits the open
//!    session (if any) and opens a new one for the newly focused domain.
//! 2. Committing adds the whole elapsed seconds to the calendar day of the
//!    session's *start*, then writes the full table to the store.
//! 3. A periodic checkpoint commits and immediately reopens the same domain,
//!    bounding how much time an unclean shutdown can lose.
//!
//! Handlers never fail. Malformed URLs, vanished tabs and store failures are
//! logged and absorbed; a failed write is retried at the next commit or
//! checkpoint since every write carries the entire table.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{extract_domain, is_trackable_url};
use crate::ports::{Clock, StoreError, SystemClock, TabId, TabQuery, USAGE_DATA_KEY, UsageStore};
use crate::session::Session;
use crate::usage::UsageTable;

/// Accumulator startup errors.
#[derive(Debug, Error)]
pub enum AccumulatorError {
    /// The store could not be read at startup.
    #[error("failed to load usage data: {0}")]
    Load(#[from] StoreError),
}

/// Owns the open session and the usage table.
///
/// All methods take `&mut self`; the caller serializes events, so no
/// locking is needed.
pub struct Accumulator<S, C = SystemClock> {
    store: S,
    clock: C,
    session: Option<Session>,
    usage: UsageTable,
    /// The in-memory table has changes the store has not confirmed.
    dirty: bool,
}

impl<S: UsageStore, C: Clock> Accumulator<S, C> {
    /// Loads the usage table from `store`. No session is open afterwards.
    ///
    /// A missing key yields an empty table. Stored data that does not parse
    /// is logged and replaced by an empty table.
    pub fn initialize(store: S, clock: C) -> Result<Self, AccumulatorError> {
        let usage = match store.get(USAGE_DATA_KEY)? {
            None => UsageTable::new(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
                tracing::warn!(%err, "stored usage data is malformed, starting empty");
                UsageTable::new()
            }),
        };
        tracing::info!(domains = usage.len(), "loaded web usage data");

        Ok(Self {
            store,
            clock,
            session: None,
            usage,
            dirty: false,
        })
    }

    /// A tab gained focus.
    ///
    /// When `url` is `None` the tab is looked up through `tabs`; a failed
    /// lookup counts as "no trackable tab".
    pub fn on_tab_became_active<T>(&mut self, tab_id: TabId, url: Option<&str>, tabs: &T)
    where
        T: TabQuery + ?Sized,
    {
        let now = self.clock.now();
        self.commit_session(now);

        let url = match url {
            Some(url) => Some(url.to_string()),
            None => match tabs.tab(tab_id) {
                Ok(info) => info.url,
                Err(err) => {
                    tracing::debug!(%tab_id, %err, "tab lookup failed, not tracking");
                    None
                }
            },
        };

        match url.as_deref() {
            Some(url) if is_trackable_url(url) => self.open_session(url, now),
            _ => tracing::debug!(%tab_id, "activated tab is not an HTTP page, not tracking"),
        }
    }

    /// A tab finished or progressed loading a URL.
    ///
    /// Only completed loads in the active tab to an HTTP(S) URL change the
    /// attributed domain; everything else is ignored without committing.
    pub fn on_tab_navigated(
        &mut self,
        tab_id: TabId,
        url: &str,
        is_active: bool,
        load_complete: bool,
    ) {
        if !(load_complete && is_active && is_trackable_url(url)) {
            tracing::trace!(%tab_id, is_active, load_complete, "ignoring navigation");
            return;
        }

        tracing::debug!(%tab_id, url, "active tab navigated");
        let now = self.clock.now();
        self.commit_session(now);
        self.open_session(url, now);
    }

    /// Periodic checkpoint: commit and reopen the same domain at "now".
    ///
    /// With no open session this only retries a previously failed write.
    pub fn on_checkpoint_timer(&mut self) {
        let now = self.clock.now();
        match self.session.as_ref().map(|s| s.domain().to_string()) {
            Some(domain) => {
                tracing::trace!(domain, "checkpoint");
                self.commit_session(now);
                self.session = Some(Session::new(domain, now));
            }
            None if self.dirty => {
                tracing::debug!("checkpoint retrying unsaved usage data");
                self.persist();
            }
            None => tracing::trace!("no active tab to track"),
        }
    }

    /// The process is terminating: commit without reopening.
    pub fn on_shutdown(&mut self) {
        tracing::info!("shutting down, saving final time data");
        let now = self.clock.now();
        self.commit_session(now);
        if self.dirty {
            self.persist();
        }
    }

    /// A snapshot of the usage table.
    pub fn query_usage_data(&self) -> UsageTable {
        self.usage.clone()
    }

    /// The open session, if any.
    pub const fn current_session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether the latest table has not yet been written successfully.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn open_session(&mut self, url: &str, now: DateTime<Utc>) {
        let domain = extract_domain(url);
        if domain.is_empty() {
            return;
        }
        tracing::debug!(domain, "tracking domain");
        self.session = Some(Session::new(domain, now));
    }

    /// Closes the open session, crediting its elapsed whole seconds to the
    /// day it started on. Zero or negative intervals leave the table alone.
    fn commit_session(&mut self, end: DateTime<Utc>) {
        let Some(session) = self.session.take() else {
            return;
        };

        let elapsed = match u64::try_from(session.elapsed_seconds(end)) {
            Ok(secs) if secs > 0 => secs,
            _ => {
                tracing::trace!(domain = session.domain(), "discarding empty interval");
                return;
            }
        };

        let day = self.clock.local_date(session.start());
        let total = self.usage.add(session.domain(), day, elapsed);
        tracing::debug!(
            domain = session.domain(),
            %day,
            seconds = elapsed,
            total,
            "recorded usage"
        );
        self.dirty = true;
        self.persist();
    }

    fn persist(&mut self) {
        let value = match serde_json::to_value(&self.usage) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "failed to encode usage data");
                return;
            }
        };

        match self.store.set(USAGE_DATA_KEY, value) {
            Ok(()) => self.dirty = false,
            Err(err) => {
                tracing::warn!(%err, "failed to save usage data, will retry");
                self.dirty = true;
            }
        }
    }
}
