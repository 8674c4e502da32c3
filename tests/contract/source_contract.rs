use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use ratechart_core::{
    CalendarDay, CbrAdapter, CbrConfig, Currency, HealthState, HttpClient, HttpError, HttpRequest,
    HttpResponse, ProviderId, RateSource, RatesRequest, RetryConfig, SourceErrorKind,
    SyntheticSource, BASE_CURRENCY,
};

/// Answers every archive URL with the same daily document, except weekends (404).
struct ArchiveHttpClient;

impl HttpClient for ArchiveHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            // .../archive/2024/01/06/daily_json.js and .../07/... are a weekend
            if request.url.contains("/2024/01/06/") || request.url.contains("/2024/01/07/") {
                return Ok(HttpResponse::new(404, "Not found"));
            }
            Ok(HttpResponse::ok_json(
                r#"{"Valute":{
                    "USD":{"Nominal":1,"Value":90.0},
                    "EUR":{"Nominal":1,"Value":99.0},
                    "CNY":{"Nominal":10,"Value":126.0}}}"#,
            ))
        })
    }
}

struct SourceCase {
    id: ProviderId,
    source: Arc<dyn RateSource>,
    /// Whether every requested day is expected to carry a value.
    dense: bool,
}

fn source_cases() -> Vec<SourceCase> {
    let cbr_config = CbrConfig {
        base_url: String::from("https://cbr.test"),
        retry: RetryConfig::fixed(Duration::from_millis(1), 1),
        quota_limit: 1_000,
        ..CbrConfig::default()
    };
    vec![
        SourceCase {
            id: ProviderId::Synthetic,
            source: Arc::new(SyntheticSource::new()),
            dense: true,
        },
        SourceCase {
            id: ProviderId::Cbr,
            source: Arc::new(CbrAdapter::with_http_client(
                cbr_config,
                Arc::new(ArchiveHttpClient),
            )),
            dense: false,
        },
    ]
}

fn day(raw: &str) -> CalendarDay {
    CalendarDay::parse(raw).expect("valid day")
}

#[tokio::test]
async fn every_source_scopes_points_to_the_requested_range() {
    let request =
        RatesRequest::new(Currency::Usd, day("2024-01-04"), day("2024-01-08")).expect("valid");

    for case in source_cases() {
        assert_eq!(case.source.id(), case.id);
        let series = case
            .source
            .rates(request)
            .await
            .unwrap_or_else(|error| panic!("source '{}' failed: {error}", case.id));

        assert_eq!(series.currency, Currency::Usd, "source '{}': currency", case.id);
        assert_eq!(series.base, BASE_CURRENCY, "source '{}': base", case.id);
        assert!(
            series
                .points
                .iter()
                .all(|point| point.date() >= request.start && point.date() <= request.end),
            "source '{}': points outside the range",
            case.id
        );
        assert!(
            series.points.windows(2).all(|pair| pair[0].date() < pair[1].date()),
            "source '{}': points must be strictly increasing",
            case.id
        );
        assert!(
            series
                .points
                .iter()
                .all(|point| point.value().is_some_and(|value| value > 0.0)),
            "source '{}': returned points carry positive values",
            case.id
        );
        if case.dense {
            assert_eq!(series.points.len(), 5, "source '{}': one point per day", case.id);
        } else {
            assert_eq!(series.points.len(), 3, "source '{}': weekend skipped", case.id);
        }
    }
}

#[tokio::test]
async fn cbr_scales_nominal_and_reports_healthy() {
    let case = source_cases()
        .into_iter()
        .find(|case| case.id == ProviderId::Cbr)
        .expect("cbr case");
    let request =
        RatesRequest::new(Currency::Cny, day("2024-01-05"), day("2024-01-05")).expect("valid");

    let series = case.source.rates(request).await.expect("cbr answers");

    assert_eq!(series.points.len(), 1);
    assert_eq!(series.points[0].value(), Some(12.6));
    assert_eq!(case.source.health().await.state, HealthState::Healthy);
}

#[test]
fn inverted_request_is_rejected_before_reaching_a_source() {
    let error = RatesRequest::new(Currency::Eur, day("2024-01-08"), day("2024-01-04"))
        .expect_err("inverted range");
    assert_eq!(error.kind(), SourceErrorKind::InvalidRequest);
    assert_eq!(error.code(), "source.invalid_request");
}
