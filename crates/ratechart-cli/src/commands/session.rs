//! Line-oriented stand-in for the interactive viewer.
//!
//! Each stdin line is one user interaction. Fetch completions are applied as
//! they arrive, interleaved with input, so a range change while fetches are
//! still running behaves like it does in the viewer.

use std::io::Write;

use ratechart_core::{CalendarDay, Currency, FetchOutcome, OutcomeKind, Selection};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::{OutputFormat, RangeArgs};
use crate::error::CliError;
use crate::output;

use super::{chart_report, Context, Report};

const HELP: &str = "commands: toggle <EUR|USD|CNY>, range <FROM> <TO>, refresh, show, stats, wait, help, quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Toggle(Currency),
    Range(CalendarDay, CalendarDay),
    Refresh,
    Show,
    Stats,
    Wait,
    Help,
    Quit,
    Blank,
}

fn parse_command(line: &str) -> Result<SessionCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(SessionCommand::Blank);
    };
    let args = words.collect::<Vec<_>>();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("toggle", [code]) => {
            SessionCommand::Toggle(Currency::parse(code).map_err(|error| error.to_string())?)
        }
        ("range", [from, to]) => SessionCommand::Range(
            CalendarDay::parse(from).map_err(|error| error.to_string())?,
            CalendarDay::parse(to).map_err(|error| error.to_string())?,
        ),
        ("refresh", []) => SessionCommand::Refresh,
        ("show", []) => SessionCommand::Show,
        ("stats", []) => SessionCommand::Stats,
        ("wait", []) => SessionCommand::Wait,
        ("help", []) => SessionCommand::Help,
        ("quit" | "exit", []) => SessionCommand::Quit,
        _ => return Err(format!("unrecognized command '{}'; {HELP}", line.trim())),
    };
    Ok(command)
}

enum Event {
    Line(Option<String>),
    Completion(Option<FetchOutcome>),
}

pub async fn run(
    args: &RangeArgs,
    context: &Context,
    format: OutputFormat,
    pretty: bool,
) -> Result<Report, CliError> {
    let (start, end) = context.range(args)?;
    let initial = Selection::new(start, end, []);
    initial.validate(context.today)?;

    let mut orchestrator = context.orchestrator();
    orchestrator.on_selection_changed(initial);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprintln!("{HELP}");

    loop {
        let event = tokio::select! {
            line = lines.next_line() => Event::Line(line?),
            outcome = orchestrator.next_completion(), if orchestrator.in_flight() > 0 => {
                Event::Completion(outcome)
            }
        };

        let line = match event {
            Event::Completion(Some(outcome)) => {
                report_outcome(&outcome);
                continue;
            }
            Event::Completion(None) => continue,
            Event::Line(None) => {
                orchestrator.settle().await;
                show(&orchestrator, context, format, pretty).await?;
                break;
            }
            Event::Line(Some(line)) => line,
        };

        match parse_command(&line) {
            Ok(SessionCommand::Toggle(currency)) => {
                orchestrator.toggle_currency(currency);
            }
            Ok(SessionCommand::Range(start, end)) => {
                let next = orchestrator.selection().with_range(start, end);
                match next.validate(context.today) {
                    Ok(()) => {
                        orchestrator.on_selection_changed(next);
                    }
                    Err(error) => eprintln!("error: {error}"),
                }
            }
            Ok(SessionCommand::Refresh) => {
                orchestrator.refresh();
            }
            Ok(SessionCommand::Show) => show(&orchestrator, context, format, pretty).await?,
            Ok(SessionCommand::Stats) => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                output::render_stats(
                    &mut out,
                    &orchestrator.store().stats(),
                    ratechart_core::labels::requests_label(context.locale),
                    format,
                    pretty,
                )?;
                out.flush()?;
            }
            Ok(SessionCommand::Wait) => {
                for outcome in orchestrator.settle().await {
                    report_outcome(&outcome);
                }
            }
            Ok(SessionCommand::Help) => eprintln!("{HELP}"),
            Ok(SessionCommand::Quit) => break,
            Ok(SessionCommand::Blank) => {}
            Err(message) => eprintln!("error: {message}"),
        }
    }

    Ok(Report::Done)
}

async fn show(
    orchestrator: &ratechart_core::RateFetchOrchestrator,
    context: &Context,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let report = chart_report(orchestrator, context).await;
    output::render(&Report::Chart(report), format, pretty)
}

fn report_outcome(outcome: &FetchOutcome) {
    match &outcome.kind {
        OutcomeKind::Loaded { points } => {
            eprintln!("loaded {} ({points} points)", outcome.currency);
        }
        OutcomeKind::Failed { message } => {
            eprintln!("failed {}: {message}", outcome.currency);
        }
        OutcomeKind::Stale => {
            log::debug!(
                "dropped {} result of generation {}",
                outcome.currency,
                outcome.generation
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_commands() {
        assert_eq!(
            parse_command("toggle usd"),
            Ok(SessionCommand::Toggle(Currency::Usd))
        );
        assert_eq!(
            parse_command("  range 2024-01-01 2024-01-03 "),
            Ok(SessionCommand::Range(
                CalendarDay::parse("2024-01-01").expect("valid day"),
                CalendarDay::parse("2024-01-03").expect("valid day"),
            ))
        );
        assert_eq!(parse_command("SHOW"), Ok(SessionCommand::Show));
        assert_eq!(parse_command("refresh"), Ok(SessionCommand::Refresh));
        assert_eq!(parse_command("exit"), Ok(SessionCommand::Quit));
        assert_eq!(parse_command("   "), Ok(SessionCommand::Blank));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_command("toggle gbp").is_err());
        assert!(parse_command("range 2024-01-01").is_err());
        assert!(parse_command("range 2024-13-01 2024-01-02").is_err());
        assert!(parse_command("fly").is_err());
        assert!(parse_command("refresh now").is_err());
    }
}
