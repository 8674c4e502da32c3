use std::io::{self, Write};

use ratechart_core::labels::{date_from_label, date_to_label, requests_label};
use ratechart_core::{FetchStats, HealthState, HealthStatus};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::{ChartReport, CurrencyRow, Report};
use crate::error::CliError;

const DATE_WIDTH: usize = 12;
const VALUE_WIDTH: usize = 12;

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    render_to(&mut out, report, format, pretty)?;
    out.flush()?;
    Ok(())
}

pub fn render_to(
    out: &mut impl Write,
    report: &Report,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match (report, format) {
        (Report::Done, _) => {}
        (Report::Dates(dates), OutputFormat::Json) => write_json(out, dates, pretty)?,
        (Report::Currencies(rows), OutputFormat::Json) => write_json(out, rows, pretty)?,
        (Report::Chart(chart), OutputFormat::Json) => write_json(out, chart, pretty)?,
        (Report::Dates(dates), OutputFormat::Table) => {
            for day in dates {
                writeln!(out, "{day}")?;
            }
        }
        (Report::Currencies(rows), OutputFormat::Table) => currencies_table(out, rows)?,
        (Report::Chart(chart), OutputFormat::Table) => chart_table(out, chart)?,
    }
    Ok(())
}

pub fn render_stats(
    out: &mut impl Write,
    stats: &FetchStats,
    label: &str,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => write_json(out, stats, pretty),
        OutputFormat::Table => {
            writeln!(out, "{}", stats_line(stats, label))?;
            Ok(())
        }
    }
}

fn write_json<T: Serialize + ?Sized>(
    out: &mut impl Write,
    value: &T,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{payload}")?;
    Ok(())
}

fn currencies_table(out: &mut impl Write, rows: &[CurrencyRow]) -> io::Result<()> {
    for row in rows {
        writeln!(out, "{:<5}{}", row.code, row.label)?;
    }
    Ok(())
}

fn chart_table(out: &mut impl Write, report: &ChartReport) -> io::Result<()> {
    writeln!(out, "{} ({})", report.title, report.source)?;
    if let (Some(first), Some(last)) = (report.chart.labels.first(), report.chart.labels.last()) {
        writeln!(
            out,
            "{}: {first}  {}: {last}",
            date_from_label(report.locale),
            date_to_label(report.locale)
        )?;
    }

    let columns = report
        .chart
        .datasets
        .iter()
        .filter(|dataset| !dataset.is_placeholder())
        .collect::<Vec<_>>();

    let mut header = format!("{:<DATE_WIDTH$}", "date");
    for dataset in &columns {
        header.push_str(&format!("{:>VALUE_WIDTH$}", dataset.label));
    }
    writeln!(out, "{}", header.trim_end())?;

    for (index, day) in report.chart.labels.iter().enumerate() {
        let mut line = format!("{:<DATE_WIDTH$}", day.to_string());
        for dataset in &columns {
            let cell = dataset
                .data
                .get(index)
                .copied()
                .flatten()
                .map_or_else(|| String::from("-"), |value| format!("{value:.4}"));
            line.push_str(&format!("{cell:>VALUE_WIDTH$}"));
        }
        writeln!(out, "{}", line.trim_end())?;
    }

    writeln!(
        out,
        "{}",
        stats_line(&report.stats, requests_label(report.locale))
    )?;
    for failure in &report.failures {
        writeln!(out, "failed {}: {}", failure.currency, failure.message)?;
    }
    if let Some(line) = health_line(&report.health) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

fn health_line(health: &HealthStatus) -> Option<String> {
    let state = match health.state {
        HealthState::Healthy => return None,
        HealthState::Degraded => "degraded",
        HealthState::Unhealthy => "unhealthy",
    };
    Some(format!(
        "source {state}: {} consecutive failed day(s)",
        health.consecutive_failures
    ))
}

fn stats_line(stats: &FetchStats, label: &str) -> String {
    format!(
        "{label}: {} (succeeded {}, failed {}, discarded {}, in flight {})",
        stats.sent,
        stats.succeeded,
        stats.failed,
        stats.discarded,
        stats.in_flight()
    )
}
