use std::collections::{BTreeMap, HashMap};
use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::{CacheMode, DayCache};
use crate::data_source::{HealthStatus, RateSource, RatesRequest, SourceError};
use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, ReqwestHttpClient};
use crate::retry::RetryConfig;
use crate::throttling::RequestThrottle;
use crate::{CalendarDay, Currency, ProviderId, RatePoint, RateSeries, BASE_CURRENCY};

pub const DEFAULT_CBR_URL: &str = "https://www.cbr-xml-daily.ru";
pub const CBR_URL_ENV: &str = "RATECHART_CBR_URL";

const UNHEALTHY_AFTER_FAILURES: u32 = 3;

/// Tuning of the Central Bank of Russia adapter.
#[derive(Debug, Clone)]
pub struct CbrConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
    pub quota_window: Duration,
    pub quota_limit: u32,
    /// Archive days never change once published; today's entry may still be missing.
    pub cache_ttl: Duration,
    pub cache_mode: CacheMode,
}

impl Default for CbrConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_CBR_URL),
            timeout_ms: 5_000,
            retry: RetryConfig::default(),
            quota_window: Duration::from_secs(1),
            quota_limit: 5,
            cache_ttl: Duration::from_secs(600),
            cache_mode: CacheMode::Use,
        }
    }
}

impl CbrConfig {
    /// Defaults, with the base URL taken from `RATECHART_CBR_URL` when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(url) = env::var(CBR_URL_ENV).ok().filter(|url| !url.trim().is_empty()) {
            config.base_url = url;
        }
        config
    }
}

/// Rates of one archive day for the currencies this crate charts.
type DailyRates = BTreeMap<Currency, f64>;

/// Adapter for the CBR daily JSON archive.
///
/// The archive publishes one document per business day at
/// `{base_url}/archive/YYYY/MM/DD/daily_json.js`; days without a publication
/// answer 404 and simply produce no point.
#[derive(Clone)]
pub struct CbrAdapter {
    config: CbrConfig,
    http_client: Arc<dyn HttpClient>,
    cache: DayCache<Option<DailyRates>>,
    throttle: RequestThrottle,
    consecutive_failures: Arc<AtomicU32>,
}

impl Default for CbrAdapter {
    fn default() -> Self {
        Self::new(CbrConfig::default())
    }
}

impl CbrAdapter {
    pub fn new(config: CbrConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    pub fn with_http_client(config: CbrConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let cache = if config.cache_mode.writes() {
            DayCache::new(config.cache_ttl)
        } else {
            DayCache::disabled()
        };
        let throttle = RequestThrottle::new(config.quota_window, config.quota_limit);
        Self {
            config,
            http_client,
            cache,
            throttle,
            consecutive_failures: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn archive_url(&self, day: CalendarDay) -> String {
        let date = day.date();
        format!(
            "{}/archive/{:04}/{:02}/{:02}/daily_json.js",
            self.config.base_url.trim_end_matches('/'),
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    async fn daily_rates(&self, day: CalendarDay) -> Result<Option<DailyRates>, SourceError> {
        if self.config.cache_mode.reads() {
            if let Some(hit) = self.cache.get(day).await {
                log::trace!("cbr cache hit for {day}");
                return Ok(hit);
            }
        }

        let rates = self.fetch_day_with_retry(day).await;
        self.record_day(&rates);
        let rates = rates?;
        if self.config.cache_mode.writes() {
            self.cache.put(day, rates.clone()).await;
        }
        Ok(rates)
    }

    async fn fetch_day_with_retry(&self, day: CalendarDay) -> Result<Option<DailyRates>, SourceError> {
        let retry = &self.config.retry;
        let url = self.archive_url(day);
        let mut attempt = 0;

        loop {
            if !self.throttle.try_acquire() {
                log::trace!("cbr quota exhausted, waiting before {day}");
                self.throttle.acquire().await;
            }
            let request = HttpRequest::get(url.as_str())
                .with_header("accept", "application/json")
                .with_timeout_ms(self.config.timeout_ms);

            let error = match self.http_client.execute(request).await {
                Ok(response) if response.status == 404 => {
                    log::debug!("cbr has no publication for {day}");
                    return Ok(None);
                }
                Ok(response) if response.is_success() => {
                    return parse_daily(&response.body).map(Some);
                }
                Ok(response) => {
                    let error = status_error(response.status);
                    if !error.retryable() || !retry.should_retry_status(response.status) {
                        return Err(error);
                    }
                    error
                }
                Err(transport) => {
                    let error = transport_error(&transport);
                    if !error.retryable() || !retry.should_retry_error(&transport) {
                        return Err(error);
                    }
                    error
                }
            };

            if !retry.allows_retry(attempt) {
                return Err(error);
            }
            let delay = retry.delay_for_attempt(attempt);
            log::debug!(
                "cbr request for {day} failed ({error}); retry {} in {delay:?}",
                attempt + 1
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn fetch_series(&self, req: RatesRequest) -> Result<RateSeries, SourceError> {
        let expired = self.cache.clear_expired().await;
        if expired > 0 {
            log::trace!("cbr cache dropped {expired} expired day(s)");
        }
        let mut points = Vec::new();
        for day in &req.days() {
            let Some(rates) = self.daily_rates(*day).await? else {
                continue;
            };
            if let Some(value) = rates.get(&req.currency) {
                let point = RatePoint::new(*day, *value)
                    .map_err(|error| SourceError::invalid_response(error.to_string()))?;
                points.push(point);
            }
        }

        Ok(RateSeries::new(req.currency, BASE_CURRENCY, points))
    }

    /// Counts consecutive archive days that could not be fetched; a day that
    /// answers, with or without a publication, resets the count.
    fn record_day<T>(&self, outcome: &Result<T, SourceError>) {
        if outcome.is_ok() {
            self.consecutive_failures.store(0, Ordering::Relaxed);
        } else {
            self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl RateSource for CbrAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Cbr
    }

    fn rates<'a>(
        &'a self,
        req: RatesRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RateSeries, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_series(req))
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = HealthStatus> + Send + 'a>> {
        Box::pin(async move {
            HealthStatus::from_failures(
                self.consecutive_failures.load(Ordering::Relaxed),
                UNHEALTHY_AFTER_FAILURES,
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct CbrDailyPayload {
    #[serde(rename = "Valute")]
    valute: HashMap<String, CbrValutePayload>,
}

#[derive(Debug, Deserialize)]
struct CbrValutePayload {
    #[serde(rename = "Nominal")]
    nominal: f64,
    #[serde(rename = "Value")]
    value: f64,
}

/// Rates per unit: the archive quotes some currencies per 10 or 100 units.
fn parse_daily(body: &str) -> Result<DailyRates, SourceError> {
    let payload: CbrDailyPayload = serde_json::from_str(body)
        .map_err(|e| SourceError::invalid_response(format!("failed to parse cbr daily: {e}")))?;

    let mut rates = DailyRates::new();
    for currency in Currency::ALL {
        let Some(valute) = payload.valute.get(currency.code()) else {
            continue;
        };
        if valute.nominal <= 0.0 {
            return Err(SourceError::invalid_response(format!(
                "cbr nominal for {currency} must be positive"
            )));
        }
        rates.insert(currency, valute.value / valute.nominal);
    }
    Ok(rates)
}

fn status_error(status: u16) -> SourceError {
    match status {
        429 => SourceError::rate_limited("cbr rate limited the request (status 429)"),
        408 => SourceError::timed_out("cbr timed out the request (status 408)"),
        400..=499 => SourceError::invalid_request(format!("cbr rejected the request (status {status})")),
        _ => SourceError::unavailable(format!("cbr returned status {status}")),
    }
}

fn transport_error(error: &HttpError) -> SourceError {
    match error.kind() {
        HttpErrorKind::Timeout => {
            SourceError::timed_out(format!("cbr request timed out: {}", error.message()))
        }
        HttpErrorKind::Connect | HttpErrorKind::Other => {
            SourceError::unavailable(format!("cbr transport error: {}", error.message()))
        }
        HttpErrorKind::Body => {
            SourceError::invalid_response(format!("cbr body unreadable: {}", error.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::{HealthState, SourceErrorKind};
    use crate::http_client::HttpResponse;
    use std::sync::Mutex;

    const DAILY: &str = r#"{
        "Date": "2024-01-10T11:30:00+03:00",
        "Valute": {
            "USD": {"CharCode": "USD", "Nominal": 1, "Value": 89.6883},
            "EUR": {"CharCode": "EUR", "Nominal": 1, "Value": 98.0},
            "CNY": {"CharCode": "CNY", "Nominal": 10, "Value": 125.0}
        }
    }"#;

    /// Replays scripted answers in order and records request URLs.
    struct ScriptedHttpClient {
        script: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedHttpClient {
        fn new(mut script: Vec<Result<HttpResponse, HttpError>>) -> Self {
            script.reverse();
            Self {
                script: Mutex::new(script),
                urls: Mutex::new(Vec::new()),
            }
        }

        fn urls(&self) -> Vec<String> {
            self.urls.lock().expect("urls lock").clone()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.urls.lock().expect("urls lock").push(request.url);
            let next = self
                .script
                .lock()
                .expect("script lock")
                .pop()
                .unwrap_or_else(|| Ok(HttpResponse::new(404, "Not found")));
            Box::pin(async move { next })
        }
    }

    fn config() -> CbrConfig {
        CbrConfig {
            base_url: String::from("https://cbr.test/"),
            retry: RetryConfig::fixed(Duration::from_millis(1), 2),
            quota_limit: 1_000,
            ..CbrConfig::default()
        }
    }

    fn day(raw: &str) -> CalendarDay {
        CalendarDay::parse(raw).expect("valid day")
    }

    fn request(currency: Currency, start: &str, end: &str) -> RatesRequest {
        RatesRequest::new(currency, day(start), day(end)).expect("valid request")
    }

    #[test]
    fn archive_url_is_zero_padded() {
        let adapter = CbrAdapter::with_http_client(config(), Arc::new(ScriptedHttpClient::new(vec![])));
        assert_eq!(
            adapter.archive_url(day("2024-01-09")),
            "https://cbr.test/archive/2024/01/09/daily_json.js"
        );
    }

    #[test]
    fn parse_daily_scales_by_nominal() {
        let body = DAILY.to_owned();
        let rates = parse_daily(&body).expect("valid payload");
        assert_eq!(rates.get(&Currency::Usd), Some(&89.6883));
        assert_eq!(rates.get(&Currency::Cny), Some(&12.5));
    }

    #[test]
    fn parse_daily_rejects_garbage() {
        let err = parse_daily("<html>").expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn missing_publications_become_gaps() {
        let body = DAILY.to_owned();
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::ok_json(body.clone())),
            Ok(HttpResponse::new(404, "Not found")),
            Ok(HttpResponse::ok_json(body)),
        ]));
        let adapter = CbrAdapter::with_http_client(config(), client.clone());

        let series = adapter
            .rates(request(Currency::Usd, "2024-01-05", "2024-01-07"))
            .await
            .expect("rates should load");

        let dates: Vec<String> = series.points.iter().map(|p| p.date().identifier()).collect();
        assert_eq!(dates, vec!["2024-01-05", "2024-01-07"]);
        assert_eq!(series.base, "RUB");
        assert_eq!(client.urls().len(), 3);
    }

    #[tokio::test]
    async fn transient_status_is_retried() {
        let body = DAILY.to_owned();
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(503, "busy")),
            Ok(HttpResponse::ok_json(body)),
        ]));
        let adapter = CbrAdapter::with_http_client(config(), client.clone());

        let series = adapter
            .rates(request(Currency::Eur, "2024-01-10", "2024-01-10"))
            .await
            .expect("second attempt should succeed");

        assert_eq!(series.points.len(), 1);
        assert_eq!(client.urls().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_retries_surface_error_and_degrade_health() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Err(HttpError::timeout("slow")),
            Err(HttpError::timeout("slow")),
            Err(HttpError::timeout("slow")),
        ]));
        let adapter = CbrAdapter::with_http_client(config(), client.clone());

        let err = adapter
            .rates(request(Currency::Usd, "2024-01-10", "2024-01-10"))
            .await
            .expect_err("all attempts fail");

        assert_eq!(err.kind(), SourceErrorKind::TimedOut);
        assert_eq!(client.urls().len(), 3);
        assert_eq!(adapter.health().await.state, HealthState::Degraded);
    }

    #[tokio::test]
    async fn rejected_requests_are_not_retried_even_when_status_is_listed() {
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(400, "bad date")),
            Ok(HttpResponse::new(400, "bad date")),
        ]));
        let mut config = config();
        config.retry.retry_on_status.push(400);
        let adapter = CbrAdapter::with_http_client(config, client.clone());

        let err = adapter
            .rates(request(Currency::Usd, "2024-01-10", "2024-01-10"))
            .await
            .expect_err("400 is final");

        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert!(!err.retryable());
        assert_eq!(client.urls().len(), 1);
    }

    #[tokio::test]
    async fn health_counts_failed_days_and_a_loaded_day_resets_it() {
        let body = DAILY.to_owned();
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::new(500, "down")),
            Ok(HttpResponse::new(500, "down")),
            Ok(HttpResponse::ok_json(body)),
            Ok(HttpResponse::new(500, "down")),
        ]));
        let config = CbrConfig {
            retry: RetryConfig::no_retry(),
            ..config()
        };
        let adapter = CbrAdapter::with_http_client(config, client.clone());

        for raw in ["2024-01-08", "2024-01-09"] {
            adapter
                .rates(request(Currency::Usd, raw, raw))
                .await
                .expect_err("day fails");
        }
        assert_eq!(adapter.health().await.consecutive_failures, 2);

        adapter
            .rates(request(Currency::Usd, "2024-01-10", "2024-01-11"))
            .await
            .expect_err("second day fails");

        let health = adapter.health().await;
        assert_eq!(health.consecutive_failures, 1);
        assert_eq!(health.state, HealthState::Degraded);
        assert_eq!(client.urls().len(), 4);
    }

    #[tokio::test]
    async fn expired_days_are_swept_before_a_new_series() {
        let body = DAILY.to_owned();
        let client = Arc::new(ScriptedHttpClient::new(vec![
            Ok(HttpResponse::ok_json(body.clone())),
            Ok(HttpResponse::ok_json(body)),
        ]));
        let config = CbrConfig {
            cache_ttl: Duration::from_millis(20),
            ..config()
        };
        let adapter = CbrAdapter::with_http_client(config, client.clone());

        adapter
            .rates(request(Currency::Usd, "2024-01-09", "2024-01-09"))
            .await
            .expect("first day loads");
        tokio::time::sleep(Duration::from_millis(40)).await;
        adapter
            .rates(request(Currency::Usd, "2024-01-10", "2024-01-10"))
            .await
            .expect("second day loads");

        assert_eq!(adapter.cache.len().await, 1);
        assert!(adapter.cache.get(day("2024-01-09")).await.is_none());
    }

    #[tokio::test]
    async fn repeated_days_are_served_from_cache() {
        let body = DAILY.to_owned();
        let client = Arc::new(ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(body))]));
        let adapter = CbrAdapter::with_http_client(config(), client.clone());

        let usd = adapter
            .rates(request(Currency::Usd, "2024-01-10", "2024-01-10"))
            .await
            .expect("usd loads");
        let cny = adapter
            .rates(request(Currency::Cny, "2024-01-10", "2024-01-10"))
            .await
            .expect("cny loads from cache");

        assert_eq!(usd.points[0].value(), Some(89.6883));
        assert_eq!(cny.points[0].value(), Some(12.5));
        assert_eq!(client.urls().len(), 1);
    }
}
