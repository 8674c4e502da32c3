//! # Ratechart Core
//!
//! Domain types, state and fetch orchestration for the ratechart exchange-rate
//! history viewer.
//!
//! ## Overview
//!
//! A session holds a [`Selection`] (a date range plus the currencies to chart).
//! Every change of the selection goes through [`RateFetchOrchestrator`], which
//!
//! - expands the range into calendar days ([`expand`]),
//! - issues one [`RateSource::rates`] call per selected currency,
//! - folds completions into the [`RateStore`] one at a time,
//! - and projects the stored series into chart data ([`project`]).
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Rate sources (CBR daily archive, synthetic) |
//! | [`cache`] | Per-day TTL cache for upstream answers |
//! | [`chart`] | Chart projection in the chart.js data shape |
//! | [`data_source`] | Source trait, requests and structured source errors |
//! | [`domain`] | Currencies, calendar days, date ranges, rate points, selections |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`labels`] | English and Russian display labels |
//! | [`orchestrator`] | Fetch orchestration and cancellation |
//! | [`retry`] | Retry and backoff policy |
//! | [`source`] | Provider identifiers |
//! | [`store`] | Session state and its reducer |
//! | [`throttling`] | Request pacing |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ratechart_core::{CalendarDay, Currency, OrchestratorConfig, RateFetchOrchestrator, SyntheticSource};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = RateFetchOrchestrator::new(
//!         Arc::new(SyntheticSource::new()),
//!         OrchestratorConfig::default(),
//!         CalendarDay::today(),
//!     );
//!     session.toggle_currency(Currency::Usd);
//!     session.settle().await;
//!
//!     println!("{}", session.chart().to_json(true)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cache;
pub mod chart;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod labels;
pub mod orchestrator;
pub mod retry;
pub mod source;
pub mod store;
pub mod throttling;

// Adapter implementations
pub use adapters::{CbrAdapter, CbrConfig, SyntheticSource, CBR_URL_ENV, DEFAULT_CBR_URL};

// Caching
pub use cache::{CacheMode, DayCache};

// Chart projection
pub use chart::{project, series_style, ChartData, Dataset, SeriesStyle, PLACEHOLDER_STYLE};

// Data source trait and types
pub use data_source::{
    HealthState, HealthStatus, RateSource, RatesRequest, SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    expand, expand_datetimes, CalendarDay, Currency, DateSequence, RatePoint, RateSeries,
    Selection, BASE_CURRENCY, DEFAULT_TRAILING_DAYS,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};

pub use labels::Locale;

// Orchestration
pub use orchestrator::{
    FetchCompletion, FetchOutcome, OrchestratorConfig, OutcomeKind, RateFetchOrchestrator,
};

pub use retry::{Backoff, RetryConfig};

pub use source::ProviderId;

// State
pub use store::{Action, Applied, FetchStats, FetchStatus, RateStore, SeriesTable};

pub use throttling::RequestThrottle;
