//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Per-domain web usage tracker.
///
/// Consumes browser tab focus and navigation events, attributes foreground
/// time to website domains per calendar day, and reports the totals.
#[derive(Debug, Parser)]
#[command(name = "wu", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track usage from browser events (JSON lines) until suspend or EOF.
    Run {
        /// Read events from a file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Show time per domain for a day, or one domain over several days.
    Report {
        /// Day to report on (YYYY-MM-DD, default today).
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Report a single domain day by day instead.
        #[arg(long)]
        domain: Option<String>,

        /// Number of days in a per-domain report, ending at --date.
        #[arg(long, default_value_t = 7, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: u32,

        /// Include known domains with no time on the day.
        #[arg(long, conflicts_with = "domain")]
        all: bool,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the full usage table as a `getWebUsageData` response.
    Query,

    /// Show database location and today's totals.
    Status,
}
