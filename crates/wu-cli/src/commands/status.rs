//! Status command for showing where data lives and today's totals.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use wu_core::report::format_seconds;
use wu_core::{Accumulator, SystemClock, USAGE_DATA_KEY};
use wu_db::Database;

use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    render(writer, config, Local::now().date_naive())
}

fn render<W: Write>(writer: &mut W, config: &Config, today: NaiveDate) -> Result<()> {
    let db = Database::open(&config.database_path)
        .with_context(|| format!("failed to open {}", config.database_path.display()))?;
    let last_saved = db.updated_at(USAGE_DATA_KEY)?;
    let usage = Accumulator::initialize(db, SystemClock)
        .context("failed to load usage data")?
        .query_usage_data();

    writeln!(writer, "Web usage tracker status")?;
    writeln!(writer, "Database: {}", config.database_path.display())?;
    writeln!(
        writer,
        "Checkpoint interval: {}s",
        config.checkpoint_interval().as_secs()
    )?;

    let Some(last_saved) = last_saved else {
        writeln!(writer, "No usage recorded.")?;
        return Ok(());
    };

    writeln!(writer, "Last saved: {last_saved}")?;
    writeln!(writer, "Domains tracked: {}", usage.len())?;
    writeln!(
        writer,
        "Today ({today}): {}",
        format_seconds(usage.total_for_date(today))
    )?;

    Ok(())
}
