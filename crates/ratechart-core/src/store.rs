//! Session state and the reducer that mutates it.
//!
//! [`RateStore`] is a plain value owned by whoever drives the session; every
//! change goes through [`RateStore::apply`], so state transitions can be
//! tested without a runtime or a data source.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{CalendarDay, Currency, DateSequence, RatePoint, Selection};

/// Per-currency rate history; one point per day, upserted by fetch results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SeriesTable {
    series: BTreeMap<Currency, BTreeMap<CalendarDay, RatePoint>>,
}

impl SeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `point`, replacing any point of the same currency and day.
    pub fn upsert(&mut self, currency: Currency, point: RatePoint) {
        self.series
            .entry(currency)
            .or_default()
            .insert(point.date(), point);
    }

    pub fn point(&self, currency: Currency, day: CalendarDay) -> Option<&RatePoint> {
        self.series.get(&currency)?.get(&day)
    }

    pub fn value(&self, currency: Currency, day: CalendarDay) -> Option<f64> {
        self.point(currency, day)?.value()
    }

    /// Points of `currency` in calendar order.
    pub fn points(&self, currency: Currency) -> Vec<RatePoint> {
        self.series
            .get(&currency)
            .map(|days| days.values().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, currency: Currency) -> usize {
        self.series.get(&currency).map_or(0, BTreeMap::len)
    }
}

/// Fetch counters. `sent` counts issued requests; every request ends up in
/// exactly one of `succeeded`, `failed` or `discarded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FetchStats {
    pub sent: u64,
    pub succeeded: u64,
    pub failed: u64,
    /// Cancelled, or completed for a superseded selection.
    pub discarded: u64,
}

impl FetchStats {
    /// Requests that came back, whatever the outcome.
    pub const fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }

    pub const fn in_flight(&self) -> u64 {
        self.sent
            .saturating_sub(self.succeeded)
            .saturating_sub(self.failed)
            .saturating_sub(self.discarded)
    }
}

/// Where the latest fetch of a currency stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchStatus {
    Pending { generation: u64 },
    Loaded,
    Failed { message: String },
}

/// Every state transition the session knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// New range or currency set; rebuilds the date sequence and starts a generation.
    SelectionChanged { selection: Selection },
    FetchIssued { currency: Currency, generation: u64 },
    FetchSucceeded {
        currency: Currency,
        generation: u64,
        points: Vec<RatePoint>,
    },
    FetchFailed {
        currency: Currency,
        generation: u64,
        message: String,
    },
    FetchCancelled { currency: Currency, generation: u64 },
}

/// What [`RateStore::apply`] did with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Accepted,
    /// A completion for an older generation; counted as discarded, no data written.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateStore {
    selection: Selection,
    dates: DateSequence,
    table: SeriesTable,
    stats: FetchStats,
    status: BTreeMap<Currency, FetchStatus>,
    generation: u64,
}

impl RateStore {
    pub fn new(selection: Selection) -> Self {
        Self {
            dates: selection.dates(),
            selection,
            table: SeriesTable::new(),
            stats: FetchStats::default(),
            status: BTreeMap::new(),
            generation: 0,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Active date sequence, always rebuilt in full from the selection.
    pub fn dates(&self) -> &DateSequence {
        &self.dates
    }

    pub fn table(&self) -> &SeriesTable {
        &self.table
    }

    pub const fn stats(&self) -> FetchStats {
        self.stats
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn status(&self, currency: Currency) -> Option<&FetchStatus> {
        self.status.get(&currency)
    }

    /// Selected currencies whose latest fetch failed, with the error message.
    pub fn failures(&self) -> Vec<(Currency, &str)> {
        self.selection
            .currencies
            .iter()
            .filter_map(|currency| match self.status.get(currency) {
                Some(FetchStatus::Failed { message }) => Some((*currency, message.as_str())),
                _ => None,
            })
            .collect()
    }

    pub fn apply(&mut self, action: Action) -> Applied {
        match action {
            Action::SelectionChanged { selection } => {
                self.dates = selection.dates();
                self.selection = selection;
                self.generation += 1;
                Applied::Accepted
            }
            Action::FetchIssued {
                currency,
                generation,
            } => {
                self.stats.sent += 1;
                self.status
                    .insert(currency, FetchStatus::Pending { generation });
                Applied::Accepted
            }
            Action::FetchSucceeded {
                currency,
                generation,
                points,
            } => {
                if generation != self.generation {
                    self.stats.discarded += 1;
                    return Applied::Stale;
                }
                let returned = points
                    .into_iter()
                    .filter(|point| self.dates.contains(point.date()))
                    .map(|point| (point.date(), point))
                    .collect::<BTreeMap<_, _>>();
                self.mark_active_range(currency, |day| returned.get(&day).copied());
                self.stats.succeeded += 1;
                self.status.insert(currency, FetchStatus::Loaded);
                Applied::Accepted
            }
            Action::FetchFailed {
                currency,
                generation,
                message,
            } => {
                if generation != self.generation {
                    self.stats.discarded += 1;
                    return Applied::Stale;
                }
                self.mark_active_range(currency, |_| None);
                self.stats.failed += 1;
                self.status.insert(currency, FetchStatus::Failed { message });
                Applied::Accepted
            }
            Action::FetchCancelled { .. } => {
                self.stats.discarded += 1;
                Applied::Accepted
            }
        }
    }

    /// Overwrite every active date of `currency`: the point `found` returns,
    /// or an absent point where it returns none.
    fn mark_active_range(
        &mut self,
        currency: Currency,
        found: impl Fn(CalendarDay) -> Option<RatePoint>,
    ) {
        for day in &self.dates {
            let point = found(*day).unwrap_or_else(|| RatePoint::absent(*day));
            self.table.upsert(currency, point);
        }
    }
}
