//! Drives fetches for the current selection and folds their results into the store.
//!
//! The orchestrator is the single writer of [`RateStore`]: fetches run as
//! spawned tasks and may finish in any order, but their completions are
//! applied one at a time by whoever awaits [`RateFetchOrchestrator::next_completion`].

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::task::JoinSet;

use crate::chart::{project, ChartData};
use crate::data_source::{RateSource, RatesRequest, SourceError};
use crate::store::{Action, Applied, RateStore};
use crate::{CalendarDay, Currency, RateSeries, Selection, DEFAULT_TRAILING_DAYS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Abort fetches of a superseded selection instead of letting them finish.
    pub cancel_stale: bool,
    /// Per-fetch deadline; `None` waits for the source indefinitely.
    pub fetch_timeout: Option<Duration>,
    pub default_trailing_days: i64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            cancel_stale: true,
            fetch_timeout: None,
            default_trailing_days: DEFAULT_TRAILING_DAYS,
        }
    }
}

/// Result of one spawned fetch, before it is applied.
#[derive(Debug)]
pub struct FetchCompletion {
    pub currency: Currency,
    pub generation: u64,
    pub result: Result<RateSeries, SourceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OutcomeKind {
    /// Number of points the source returned.
    Loaded { points: usize },
    Failed { message: String },
    /// Belonged to a superseded generation and was dropped.
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub currency: Currency,
    pub generation: u64,
    pub kind: OutcomeKind,
}

pub struct RateFetchOrchestrator {
    config: OrchestratorConfig,
    source: Arc<dyn RateSource>,
    store: RateStore,
    tasks: JoinSet<FetchCompletion>,
    tickets: Vec<(Currency, u64)>,
}

impl RateFetchOrchestrator {
    /// Starts with the default trailing range ending `today` and nothing selected.
    /// No fetch is issued until the selection changes.
    pub fn new(source: Arc<dyn RateSource>, config: OrchestratorConfig, today: CalendarDay) -> Self {
        let selection = Selection::trailing(today, config.default_trailing_days);
        Self {
            config,
            source,
            store: RateStore::new(selection),
            tasks: JoinSet::new(),
            tickets: Vec::new(),
        }
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    pub fn selection(&self) -> &Selection {
        self.store.selection()
    }

    /// Fetches issued and not yet applied or cancelled.
    pub fn in_flight(&self) -> usize {
        self.tickets.len()
    }

    /// Publishes `selection`, starts a new generation and issues one fetch per
    /// selected currency over the whole active range. Returns the generation.
    pub fn on_selection_changed(&mut self, selection: Selection) -> u64 {
        if self.config.cancel_stale {
            self.cancel_in_flight();
        }

        self.store.apply(Action::SelectionChanged { selection });
        let generation = self.store.generation();
        let selection = self.store.selection().clone();
        info!(
            "selection changed: generation={generation} range={}..={} days={} currencies={:?}",
            selection.start,
            selection.end,
            self.store.dates().len(),
            selection.currencies
        );

        let Some((start, end)) = self.store.dates().bounds() else {
            debug!("empty date range, no fetch issued for generation {generation}");
            return generation;
        };

        for currency in selection.currencies {
            match RatesRequest::new(currency, start, end) {
                Ok(request) => self.spawn_fetch(request, generation),
                Err(err) => warn!("cannot build request for {currency}: {err}"),
            }
        }
        generation
    }

    /// Adds `currency` if absent, removes it otherwise; history of a removed
    /// currency stays in the table.
    pub fn toggle_currency(&mut self, currency: Currency) -> u64 {
        let next = self.store.selection().toggled(currency);
        self.on_selection_changed(next)
    }

    pub fn set_range(&mut self, start: CalendarDay, end: CalendarDay) -> u64 {
        let next = self.store.selection().with_range(start, end);
        self.on_selection_changed(next)
    }

    /// Re-issues fetches for the current selection.
    pub fn refresh(&mut self) -> u64 {
        let current = self.store.selection().clone();
        self.on_selection_changed(current)
    }

    /// Waits for the next fetch to finish and applies it. `None` once nothing
    /// is in flight. Cancel-safe: a completion is only taken off the set
    /// together with being applied.
    pub async fn next_completion(&mut self) -> Option<FetchOutcome> {
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(completion) => return Some(self.apply_completion(completion)),
                Err(err) if err.is_cancelled() => continue,
                Err(err) => error!("fetch task panicked: {err}"),
            }
        }
        self.release_orphaned_tickets();
        None
    }

    /// Drains every in-flight fetch, returning the outcomes in completion order.
    pub async fn settle(&mut self) -> Vec<FetchOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Folds one completion into the store.
    pub fn apply_completion(&mut self, completion: FetchCompletion) -> FetchOutcome {
        let FetchCompletion {
            currency,
            generation,
            result,
        } = completion;
        if let Some(index) = self
            .tickets
            .iter()
            .position(|ticket| *ticket == (currency, generation))
        {
            self.tickets.swap_remove(index);
        }

        let (action, kind) = match result {
            Ok(series) => {
                let points = series.points.len();
                debug!("{currency} fetch (generation {generation}) returned {points} points");
                (
                    Action::FetchSucceeded {
                        currency,
                        generation,
                        points: series.points,
                    },
                    OutcomeKind::Loaded { points },
                )
            }
            Err(err) => {
                let message = err.to_string();
                (
                    Action::FetchFailed {
                        currency,
                        generation,
                        message: message.clone(),
                    },
                    OutcomeKind::Failed { message },
                )
            }
        };

        let kind = match self.store.apply(action) {
            Applied::Stale => {
                debug!(
                    "discarding {currency} result of generation {generation}, current is {}",
                    self.store.generation()
                );
                OutcomeKind::Stale
            }
            Applied::Accepted => {
                if let OutcomeKind::Failed { message } = &kind {
                    warn!("{currency} fetch failed: {message}");
                }
                kind
            }
        };

        FetchOutcome {
            currency,
            generation,
            kind,
        }
    }

    /// Chart of the current selection over the active range.
    pub fn chart(&self) -> ChartData {
        project(
            self.store.dates(),
            &self.store.selection().currencies,
            self.store.table(),
        )
    }

    fn spawn_fetch(&mut self, request: RatesRequest, generation: u64) {
        let source = Arc::clone(&self.source);
        let timeout = self.config.fetch_timeout;
        let currency = request.currency;

        self.store.apply(Action::FetchIssued {
            currency,
            generation,
        });
        self.tickets.push((currency, generation));
        debug!(
            "fetching {currency} {}..={} from {} (generation {generation})",
            request.start,
            request.end,
            source.id()
        );

        self.tasks.spawn(async move {
            let result = match timeout {
                Some(limit) => match tokio::time::timeout(limit, source.rates(request)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceError::timed_out(format!(
                        "no answer for {currency} within {} ms",
                        limit.as_millis()
                    ))),
                },
                None => source.rates(request).await,
            };
            FetchCompletion {
                currency,
                generation,
                result,
            }
        });
    }

    fn cancel_in_flight(&mut self) {
        if self.tickets.is_empty() {
            return;
        }
        // Dropping the set aborts every task still in it.
        drop(std::mem::take(&mut self.tasks));
        for (currency, generation) in std::mem::take(&mut self.tickets) {
            debug!("cancelling {currency} fetch of generation {generation}");
            self.store.apply(Action::FetchCancelled {
                currency,
                generation,
            });
        }
    }

    /// Tickets left after the set drained belong to tasks that panicked.
    fn release_orphaned_tickets(&mut self) {
        for (currency, generation) in std::mem::take(&mut self.tickets) {
            self.store.apply(Action::FetchCancelled {
                currency,
                generation,
            });
        }
    }
}

impl std::fmt::Debug for RateFetchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateFetchOrchestrator")
            .field("config", &self.config)
            .field("source", &self.source.id())
            .field("store", &self.store)
            .field("tickets", &self.tickets)
            .finish_non_exhaustive()
    }
}
