use ratechart_core::{Currency, HealthState, Selection};

use crate::cli::ChartArgs;
use crate::error::CliError;

use super::{chart_report, Context, Report};

pub async fn run(args: &ChartArgs, context: &Context) -> Result<Report, CliError> {
    let (start, end) = context.range(&args.range)?;
    let currencies = args
        .currencies
        .iter()
        .map(|raw| Currency::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let selection = Selection::new(start, end, currencies);
    selection.validate(context.today)?;

    let mut orchestrator = context.orchestrator();
    orchestrator.on_selection_changed(selection);
    let outcomes = orchestrator.settle().await;
    log::info!("chart settled after {} completion(s)", outcomes.len());

    let report = chart_report(&orchestrator, context).await;
    if report.health.state != HealthState::Healthy {
        log::warn!(
            "source {} is {:?} after {} failed day(s)",
            report.source,
            report.health.state,
            report.health.consecutive_failures
        );
    }
    Ok(Report::Chart(report))
}
