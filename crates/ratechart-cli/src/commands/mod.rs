mod chart;
mod currencies;
mod dates;
mod session;

use std::sync::Arc;
use std::time::Duration;

use ratechart_core::{
    CacheMode, CalendarDay, CbrAdapter, CbrConfig, ChartData, DateSequence, FetchStats,
    HealthStatus, Locale, OrchestratorConfig, ProviderId, RateFetchOrchestrator, RateSource, Selection, SyntheticSource,
};
use serde::Serialize;

use crate::cli::{Cli, Command, RangeArgs};
use crate::error::CliError;

/// Everything a command needs that is derived from the global flags.
pub struct Context {
    pub today: CalendarDay,
    pub locale: Locale,
    pub source: Arc<dyn RateSource>,
    pub config: OrchestratorConfig,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let locale = cli.lang.parse::<Locale>()?;
        let provider = cli.source.parse::<ProviderId>()?;
        let source: Arc<dyn RateSource> = match provider {
            ProviderId::Cbr => {
                let mut config = CbrConfig::from_env();
                config.timeout_ms = cli.timeout_ms;
                if cli.no_cache {
                    config.cache_mode = CacheMode::Bypass;
                }
                Arc::new(CbrAdapter::new(config))
            }
            ProviderId::Synthetic => Arc::new(SyntheticSource::new()),
        };
        let config = OrchestratorConfig {
            fetch_timeout: cli.fetch_timeout_ms.map(Duration::from_millis),
            ..OrchestratorConfig::default()
        };

        Ok(Self {
            today: CalendarDay::today(),
            locale,
            source,
            config,
        })
    }

    pub fn orchestrator(&self) -> RateFetchOrchestrator {
        RateFetchOrchestrator::new(Arc::clone(&self.source), self.config, self.today)
    }

    /// Range from flags, falling back to the default trailing range ending today.
    pub fn range(&self, args: &RangeArgs) -> Result<(CalendarDay, CalendarDay), CliError> {
        let default = Selection::trailing(self.today, self.config.default_trailing_days);
        let start = match &args.from {
            Some(raw) => CalendarDay::parse(raw)?,
            None => default.start,
        };
        let end = match &args.to {
            Some(raw) => CalendarDay::parse(raw)?,
            None => default.end,
        };
        Ok((start, end))
    }
}

#[derive(Debug, Serialize)]
pub struct CurrencyRow {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub currency: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChartReport {
    pub title: &'static str,
    pub source: ProviderId,
    pub chart: ChartData,
    pub stats: FetchStats,
    pub health: HealthStatus,
    pub failures: Vec<FailureRow>,
    #[serde(skip)]
    pub locale: Locale,
}

/// Output of a one-shot command, rendered by [`crate::output`].
#[derive(Debug)]
pub enum Report {
    Dates(DateSequence),
    Currencies(Vec<CurrencyRow>),
    Chart(ChartReport),
    /// The session already wrote its own output.
    Done,
}

impl Report {
    pub fn failed_fetches(&self) -> usize {
        match self {
            Self::Chart(report) => report.failures.len(),
            _ => 0,
        }
    }
}

pub async fn run(cli: &Cli) -> Result<Report, CliError> {
    let context = Context::from_cli(cli)?;

    match &cli.command {
        Command::Dates(args) => dates::run(args, &context),
        Command::Currencies => Ok(currencies::run(&context)),
        Command::Chart(args) => chart::run(args, &context).await,
        Command::Session(args) => session::run(args, &context, cli.format, cli.pretty).await,
    }
}

/// Snapshot of an orchestrator's chart, stats, failures and source health.
pub async fn chart_report(orchestrator: &RateFetchOrchestrator, context: &Context) -> ChartReport {
    let health = context.source.health().await;
    let store = orchestrator.store();
    ChartReport {
        title: ratechart_core::labels::chart_title(context.locale),
        source: context.source.id(),
        chart: orchestrator.chart().localized(context.locale),
        stats: store.stats(),
        health,
        failures: store
            .failures()
            .into_iter()
            .map(|(currency, message)| FailureRow {
                currency: currency.code().to_owned(),
                message: message.to_owned(),
            })
            .collect(),
        locale: context.locale,
    }
}
