//! CLI subcommand implementations.

pub mod query;
pub mod report;
pub mod run;
pub mod status;

use anyhow::{Context, Result};
use wu_core::{Accumulator, SystemClock, UsageTable};
use wu_db::Database;

use crate::Config;

/// Opens the database and returns a snapshot of the stored usage table.
fn load_usage(config: &Config) -> Result<UsageTable> {
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let acc = Accumulator::initialize(db, SystemClock).context("failed to load usage data")?;
    Ok(acc.query_usage_data())
}
