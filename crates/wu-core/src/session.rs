//! The currently attributed attention span.

use chrono::{DateTime, Utc};

/// The domain currently receiving time, and since when.
///
/// Sessions live only in memory. At most one is open at a time, owned by the
/// [`Accumulator`](crate::Accumulator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    domain: String,
    start: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(domain: impl Into<String>, start: DateTime<Utc>) -> Self {
        Self {
            domain: domain.into(),
            start,
        }
    }

    /// The domain being attributed.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// When this domain became active.
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Whole seconds between the start and `end`, truncated.
    ///
    /// Negative when `end` precedes the start (clock skew).
    pub fn elapsed_seconds(&self, end: DateTime<Utc>) -> i64 {
        (end - self.start).num_seconds()
    }
}
