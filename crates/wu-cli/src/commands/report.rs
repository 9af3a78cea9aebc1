//! Report command for viewing recorded usage.
//!
//! `wu report` lists every domain with time on a day (default today), most
//! used first; `--all` also lists known domains with no time that day.
//! `wu report --domain D --days N` shows one domain day by day
//! with its total and daily average.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

use wu_core::UsageTable;
use wu_core::report::{
    DailyUsage, DomainUsage, SeriesSummary, format_seconds, ranked_for_date, series, summarize,
};

use crate::Config;

/// What to report on.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub date: Option<NaiveDate>,
    pub domain: Option<String>,
    pub days: u32,
    pub all: bool,
    pub json: bool,
}

/// Domains with time on a single day.
#[derive(Debug, Serialize)]
pub struct DayReport {
    pub date: NaiveDate,
    pub domains: Vec<DomainUsage>,
    pub total_seconds: u64,
}

/// One domain over a window of days.
#[derive(Debug, Serialize)]
pub struct DomainReport {
    pub domain: String,
    pub end_date: NaiveDate,
    pub days: Vec<DailyUsage>,
    #[serde(flatten)]
    pub summary: SeriesSummary,
}

/// Builds the per-day report. Domains with no time that day are omitted
/// unless `include_idle` is set.
pub fn day_report(table: &UsageTable, date: NaiveDate, include_idle: bool) -> DayReport {
    let domains: Vec<_> = ranked_for_date(table, date)
        .into_iter()
        .filter(|usage| include_idle || usage.seconds > 0)
        .collect();
    DayReport {
        date,
        total_seconds: table.total_for_date(date),
        domains,
    }
}

/// Builds the per-domain report for `days` days ending at `end_date`.
pub fn domain_report(
    table: &UsageTable,
    domain: &str,
    end_date: NaiveDate,
    days: u32,
) -> DomainReport {
    let domain = normalize_domain_arg(domain);
    let days = series(table, &domain, end_date, days);
    DomainReport {
        summary: summarize(&days),
        domain,
        end_date,
        days,
    }
}

/// Accepts `WWW.Example.com` as well as `example.com`.
fn normalize_domain_arg(domain: &str) -> String {
    let domain = domain.trim().to_ascii_lowercase();
    match domain.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => domain,
    }
}

pub fn format_day_report(report: &DayReport) -> String {
    let mut output = String::new();
    writeln!(output, "WEB USAGE: {}", report.date).unwrap();
    writeln!(output).unwrap();

    if report.domains.is_empty() {
        writeln!(output, "No usage recorded.").unwrap();
        return output;
    }

    let width = report
        .domains
        .iter()
        .map(|usage| usage.domain.len())
        .max()
        .unwrap_or(0);
    for usage in &report.domains {
        writeln!(
            output,
            "  {:<width$}  {}",
            usage.domain,
            format_seconds(usage.seconds)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Total: {}", format_seconds(report.total_seconds)).unwrap();
    output
}

pub fn format_domain_report(report: &DomainReport) -> String {
    let mut output = String::new();
    let day_word = if report.days.len() == 1 { "day" } else { "days" };
    writeln!(
        output,
        "WEB USAGE: {} ({} {day_word} ending {})",
        report.domain,
        report.days.len(),
        report.end_date
    )
    .unwrap();
    writeln!(output).unwrap();

    for day in &report.days {
        writeln!(output, "  {}  {}", day.date, format_seconds(day.seconds)).unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "Total:         {}", format_seconds(report.summary.total_seconds)).unwrap();
    writeln!(
        output,
        "Daily average: {}",
        format_seconds(report.summary.daily_average_seconds)
    )
    .unwrap();
    output
}

pub fn run<W: Write>(writer: &mut W, config: &Config, options: &ReportOptions) -> Result<()> {
    let table = super::load_usage(config)?;
    let date = options
        .date
        .unwrap_or_else(|| Local::now().date_naive());
    render(writer, &table, date, options)
}

fn render<W: Write>(
    writer: &mut W,
    table: &UsageTable,
    date: NaiveDate,
    options: &ReportOptions,
) -> Result<()> {
    let output = match (&options.domain, options.json) {
        (Some(domain), json) => {
            let report = domain_report(table, domain, date, options.days);
            if json {
                serde_json::to_string_pretty(&report)? + "\n"
            } else {
                format_domain_report(&report)
            }
        }
        (None, true) => {
            serde_json::to_string_pretty(&day_report(table, date, options.all))? + "\n"
        }
        (None, false) => format_day_report(&day_report(table, date, options.all)),
    };
    writer.write_all(output.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sample() -> UsageTable {
        let mut table = UsageTable::new();
        table.add("github.com", date("2025-01-15"), 3_900);
        table.add("news.ycombinator.com", date("2025-01-15"), 720);
        table.add("example.com", date("2025-01-15"), 45);
        table.add("example.com", date("2025-01-14"), 1_000);
        table.add("docs.rs", date("2025-01-10"), 600);
        table
    }

    fn options(domain: Option<&str>, days: u32, json: bool) -> ReportOptions {
        ReportOptions {
            date: Some(date("2025-01-15")),
            domain: domain.map(String::from),
            days,
            all: false,
            json,
        }
    }

    fn render_to_string(table: &UsageTable, options: &ReportOptions) -> String {
        let mut output = Vec::new();
        render(&mut output, table, date("2025-01-15"), options).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_day_report_ranks_domains() {
        let output = render_to_string(&sample(), &options(None, 7, false));
        assert_snapshot!(output, @r"
        WEB USAGE: 2025-01-15

          github.com            1h 5m
          news.ycombinator.com  12m
          example.com           45s

        Total: 1h 17m
        ");
    }

    #[test]
    fn test_day_report_all_includes_idle_domains() {
        let options = ReportOptions {
            all: true,
            ..options(None, 7, false)
        };
        let output = render_to_string(&sample(), &options);
        assert_snapshot!(output, @r"
        WEB USAGE: 2025-01-15

          github.com            1h 5m
          news.ycombinator.com  12m
          example.com           45s
          docs.rs               0s

        Total: 1h 17m
        ");
    }

    #[test]
    fn test_day_report_empty() {
        let output = render_to_string(&UsageTable::new(), &options(None, 7, false));
        assert_snapshot!(output, @r"
        WEB USAGE: 2025-01-15

        No usage recorded.
        ");
    }

    #[test]
    fn test_domain_report_series() {
        let output = render_to_string(&sample(), &options(Some("WWW.Example.com"), 3, false));
        assert_snapshot!(output, @r"
        WEB USAGE: example.com (3 days ending 2025-01-15)

          2025-01-13  0s
          2025-01-14  16m
          2025-01-15  45s

        Total:         17m
        Daily average: 5m
        ");
    }

    #[test]
    fn test_day_report_json() {
        let output = render_to_string(&sample(), &options(None, 7, true));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "date": "2025-01-15",
                "domains": [
                    {"domain": "github.com", "seconds": 3900},
                    {"domain": "news.ycombinator.com", "seconds": 720},
                    {"domain": "example.com", "seconds": 45}
                ],
                "total_seconds": 4665
            })
        );
    }

    #[test]
    fn test_domain_report_json_flattens_summary() {
        let output = render_to_string(&sample(), &options(Some("docs.rs"), 7, true));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["domain"], "docs.rs");
        assert_eq!(value["days"].as_array().unwrap().len(), 7);
        assert_eq!(value["days"][1], serde_json::json!({"date": "2025-01-10", "seconds": 600}));
        assert_eq!(value["total_seconds"], 600);
        assert_eq!(value["daily_average_seconds"], 86);
    }
}
