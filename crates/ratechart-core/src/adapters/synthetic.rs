use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::data_source::{HealthStatus, RateSource, RatesRequest, SourceError};
use crate::{CalendarDay, Currency, ProviderId, RatePoint, RateSeries, BASE_CURRENCY};

/// Deterministic offline source: a seeded walk around a per-currency anchor.
///
/// The same `(currency, day)` always yields the same value, so tests and demo
/// sessions are reproducible without network access.
#[derive(Debug, Clone, Default)]
pub struct SyntheticSource {
    latency: Duration,
    failing: BTreeSet<Currency>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every answer, to exercise overlapping fetches.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make requests for `currency` fail as if the upstream were down.
    pub fn failing_for(mut self, currency: Currency) -> Self {
        self.failing.insert(currency);
        self
    }

    pub fn rate_on(currency: Currency, day: CalendarDay) -> f64 {
        let anchor = match currency {
            Currency::Eur => 98.0,
            Currency::Usd => 90.0,
            Currency::Cny => 12.5,
        };
        let seed = (day.date().to_julian_day() as u64)
            .wrapping_mul(31)
            .wrapping_add(currency as u64);
        let drift = fastrand::Rng::with_seed(seed).f64() * 2.0 - 1.0;
        let value = anchor * (1.0 + drift * 0.015);
        (value * 10_000.0).round() / 10_000.0
    }
}

impl RateSource for SyntheticSource {
    fn id(&self) -> ProviderId {
        ProviderId::Synthetic
    }

    fn rates<'a>(
        &'a self,
        req: RatesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RateSeries, SourceError>> + Send + 'a>> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            if self.failing.contains(&req.currency) {
                return Err(SourceError::unavailable(format!(
                    "synthetic source configured to fail for {}",
                    req.currency
                )));
            }

            let points = req
                .days()
                .iter()
                .map(|day| RatePoint::new(*day, Self::rate_on(req.currency, *day)))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|error| SourceError::internal(error.to_string()))?;

            Ok(RateSeries::new(req.currency, BASE_CURRENCY, points))
        })
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move { HealthStatus::healthy() })
    }
}
