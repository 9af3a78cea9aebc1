//! Core domain logic for the web usage tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Domain extraction: turning tab URLs into trackable hostnames
//! - Accumulation: attributing foreground time to domains per calendar day
//! - Reporting: ranked and per-day views over the usage table

mod accumulator;
pub mod domain;
pub mod memory;
pub mod ports;
pub mod report;
mod session;
mod usage;

pub use accumulator::{Accumulator, AccumulatorError};
pub use domain::{extract_domain, is_trackable_url};
pub use ports::{
    CHECKPOINT_ALARM, Clock, DEFAULT_CHECKPOINT_INTERVAL, StoreError, SystemClock, TabError,
    TabId, TabInfo, TabQuery, USAGE_DATA_KEY, UsageStore,
};
pub use session::Session;
pub use usage::UsageTable;
