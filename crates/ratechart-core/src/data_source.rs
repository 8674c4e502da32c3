//! Rate source trait and request/response types.
//!
//! A [`RateSource`] answers one question: the rates of a currency against
//! [`BASE_CURRENCY`](crate::BASE_CURRENCY) over an inclusive range of days.
//! The orchestrator issues one [`RatesRequest`] per selected currency and
//! always passes the active range, so a source can scope its response.
//!
//! # Example
//!
//! ```rust,ignore
//! use ratechart_core::{CalendarDay, Currency, RateSource, RatesRequest, SyntheticSource};
//!
//! async fn first_rate(source: &SyntheticSource) -> Option<f64> {
//!     let start = CalendarDay::parse("2024-01-01").ok()?;
//!     let end = CalendarDay::parse("2024-01-03").ok()?;
//!     let request = RatesRequest::new(Currency::Usd, start, end).ok()?;
//!     let series = source.rates(request).await.ok()?;
//!     series.points.first().and_then(|point| point.value())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{expand, CalendarDay, Currency, DateSequence, ProviderId, RateSeries};

/// Health state reported by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Runtime source health snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub consecutive_failures: u32,
}

impl HealthStatus {
    pub const fn healthy() -> Self {
        Self {
            state: HealthState::Healthy,
            consecutive_failures: 0,
        }
    }

    /// Degraded after one failure in a row, unhealthy from `unhealthy_after` on.
    pub const fn from_failures(consecutive_failures: u32, unhealthy_after: u32) -> Self {
        let state = if consecutive_failures == 0 {
            HealthState::Healthy
        } else if consecutive_failures < unhealthy_after {
            HealthState::Degraded
        } else {
            HealthState::Unhealthy
        };
        Self {
            state,
            consecutive_failures,
        }
    }
}

/// Source-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    InvalidResponse,
    TimedOut,
    Internal,
}

/// Structured source error carried into fetch status and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timed_out(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::TimedOut,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::InvalidResponse => "source.invalid_response",
            SourceErrorKind::TimedOut => "source.timed_out",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Rates of one currency over an inclusive range of days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatesRequest {
    pub currency: Currency,
    pub start: CalendarDay,
    pub end: CalendarDay,
}

impl RatesRequest {
    pub fn new(currency: Currency, start: CalendarDay, end: CalendarDay) -> Result<Self, SourceError> {
        if start > end {
            return Err(SourceError::invalid_request(format!(
                "rates request range is inverted: {start} > {end}"
            )));
        }
        Ok(Self {
            currency,
            start,
            end,
        })
    }

    /// Every day the request covers.
    pub fn days(&self) -> DateSequence {
        expand(self.start, self.end)
    }
}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`: the orchestrator shares one source
/// between concurrently running fetch tasks.
pub trait RateSource: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches rates for `req.currency` covering `req.start..=req.end`.
    ///
    /// Days without a published rate may be missing from the returned points.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the upstream is unreachable, rejects the
    /// request, or answers with a payload that cannot be normalized.
    fn rates<'a>(
        &'a self,
        req: RatesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RateSeries, SourceError>> + Send + 'a>>;

    /// Returns the current health of this source.
    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>>;
}
