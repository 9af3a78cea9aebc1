//! Browser event adapter.
//!
//! Bridges newline-delimited JSON events from the browser side into the
//! accumulator's per-event methods, and answers `getWebUsageData` requests.
//!
//! ```text
//! {"type":"activated","tab_id":3}
//! {"type":"updated","tab_id":3,"status":"complete","url":"https://example.com/","active":true}
//! {"type":"removed","tab_id":3}
//! {"type":"query","action":"getWebUsageData"}
//! {"type":"suspend"}
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use wu_core::{Accumulator, Clock, TabError, TabId, TabInfo, TabQuery, UsageStore, UsageTable};

/// The only request action the presentation layer may send.
pub const GET_WEB_USAGE_DATA: &str = "getWebUsageData";

/// An event delivered by the browser side.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrowserEvent {
    /// A tab gained focus. The URL is looked up if not supplied.
    Activated {
        tab_id: TabId,
        #[serde(default)]
        url: Option<String>,
    },
    /// A tab's loading state or URL changed. Without `active`, the tab
    /// counts as focused if it was the last one activated.
    Updated {
        tab_id: TabId,
        status: LoadStatus,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        active: Option<bool>,
    },
    /// A tab was closed.
    Removed { tab_id: TabId },
    /// The browser is suspending; commit and stop.
    Suspend,
    /// A presentation-layer request.
    Query { action: String },
}

/// Tab loading state reported with `updated` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Complete,
}

/// Response to a `getWebUsageData` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageResponse {
    pub web_usage_data: UsageTable,
}

/// What the event loop should do after an event.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Respond(UsageResponse),
    Shutdown,
}

/// Last known state of every open tab, built from the event stream.
///
/// Answers the accumulator's tab queries for `activated` events that arrive
/// without a URL, and remembers which tab has focus.
#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: HashMap<TabId, TabInfo>,
    focused: Option<TabId>,
}

impl TabRegistry {
    fn record(&mut self, id: TabId, url: Option<&str>) {
        let entry = self
            .tabs
            .entry(id)
            .or_insert(TabInfo { id, url: None });
        if let Some(url) = url {
            entry.url = Some(url.to_string());
        }
    }

    fn activate(&mut self, id: TabId, url: Option<&str>) {
        self.focused = Some(id);
        self.record(id, url);
    }

    fn update(&mut self, id: TabId, url: Option<&str>, active: Option<bool>) {
        self.record(id, url);
        match active {
            Some(true) => self.focused = Some(id),
            Some(false) if self.focused == Some(id) => self.focused = None,
            _ => {}
        }
    }

    fn remove(&mut self, id: TabId) {
        self.tabs.remove(&id);
        if self.focused == Some(id) {
            self.focused = None;
        }
    }

    /// The tab that last gained focus, if it is still open.
    pub const fn focused(&self) -> Option<TabId> {
        self.focused
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl TabQuery for TabRegistry {
    fn tab(&self, id: TabId) -> Result<TabInfo, TabError> {
        self.tabs.get(&id).cloned().ok_or(TabError::NotFound(id))
    }
}

/// Routes one event to the accumulator.
pub fn dispatch<S, C>(
    acc: &mut Accumulator<S, C>,
    tabs: &mut TabRegistry,
    event: BrowserEvent,
) -> Outcome
where
    S: UsageStore,
    C: Clock,
{
    match event {
        BrowserEvent::Activated { tab_id, url } => {
            tracing::debug!(%tab_id, "tab activated");
            tabs.activate(tab_id, url.as_deref());
            acc.on_tab_became_active(tab_id, url.as_deref(), &*tabs);
            Outcome::Continue
        }
        BrowserEvent::Updated {
            tab_id,
            status,
            url,
            active,
        } => {
            tabs.update(tab_id, url.as_deref(), active);
            let is_active = tabs.focused() == Some(tab_id);
            // `complete` often arrives without the URL that `loading` carried
            let url = url.or_else(|| tabs.tab(tab_id).ok().and_then(|tab| tab.url));
            if let Some(url) = url {
                acc.on_tab_navigated(tab_id, &url, is_active, status == LoadStatus::Complete);
            }
            Outcome::Continue
        }
        BrowserEvent::Removed { tab_id } => {
            tabs.remove(tab_id);
            Outcome::Continue
        }
        BrowserEvent::Suspend => {
            acc.on_shutdown();
            Outcome::Shutdown
        }
        BrowserEvent::Query { action } if action == GET_WEB_USAGE_DATA => {
            Outcome::Respond(UsageResponse {
                web_usage_data: acc.query_usage_data(),
            })
        }
        BrowserEvent::Query { action } => {
            tracing::warn!(action, "ignoring unknown request");
            Outcome::Continue
        }
    }
}
