//! End-to-end tests against a real local HTTP server

use ratefetch::{
    Error, HttpClient, HttpClientConfig, Limiter, LimiterConfig, RequestConfig, StatusAction,
};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn limiter_caps_dispatch_starts_per_window() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/data"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let limiter = Limiter::new(LimiterConfig::builder().rps(2).build());
    let url = format!("{}/api/data", mock_server.uri());

    let started = Instant::now();
    let fetches = (0..3).map(|_| limiter.fetch(&url, RequestConfig::new()));
    let responses = futures::future::join_all(fetches).await;

    for response in responses {
        assert_eq!(response.unwrap().status(), 200);
    }
    // The third request waits for the 1-second window to roll over.
    assert!(started.elapsed() >= Duration::from_millis(900));
    assert!(started.elapsed() < Duration::from_millis(2500));
}

#[tokio::test]
async fn retry_after_hook_reads_response_header() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after-ms", "400")
                .set_body_string("Rate limited"),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/limited"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let limiter = Limiter::new(
        LimiterConfig::builder()
            .rps(10)
            .retry_after(|response| {
                let ms = response
                    .headers()
                    .get("retry-after-ms")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000);
                Duration::from_millis(ms)
            })
            .on_status(429, |_| StatusAction::Retry)
            .build(),
    );

    let started = Instant::now();
    let response = limiter
        .fetch(
            format!("{}/api/limited", mock_server.uri()),
            RequestConfig::new().attempts(2),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= Duration::from_millis(350));
}

#[tokio::test]
async fn timeout_feeds_retry_path() {
    let mock_server = MockServer::start().await;

    // First attempt stalls past the deadline; the retry answers fast.
    Mock::given(method("GET"))
        .and(path("/api/slow-then-fast"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/slow-then-fast"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let limiter = Limiter::new(LimiterConfig::builder().rps(10).build());
    let response = limiter
        .fetch(
            format!("{}/api/slow-then-fast", mock_server.uri()),
            RequestConfig::new()
                .timeout(Duration::from_millis(200))
                .attempts(2),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn client_facade_end_to_end() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/unstable"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/unstable"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let client = HttpClient::with_config(
        HttpClientConfig::builder()
            .base_url(mock_server.uri())
            .limiter(
                LimiterConfig::builder()
                    .rps(20)
                    .on_status(503, |_| StatusAction::Retry)
                    .build(),
            )
            .build(),
    );

    let response = client
        .get("/api/unstable", RequestConfig::new().attempts(3))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let parsed: ratefetch::parse::Parsed<serde_json::Value> =
        ratefetch::parse::json(response).await.unwrap();
    assert_eq!(parsed.data["ok"], true);
}

#[tokio::test]
async fn one_off_fetch_helper() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let response = ratefetch::fetch(
        format!("{}/ping", mock_server.uri()),
        RequestConfig::new().timeout(Duration::from_secs(5)),
    )
    .await
    .unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn scheduler_isolates_failures_and_keeps_draining() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let limiter = Limiter::new(LimiterConfig::builder().rps(50).build());

    // An unroutable target fails its entity without crashing the loop.
    let bad = limiter.fetch("http://127.0.0.1:9/unroutable", RequestConfig::new());
    let good = limiter.fetch(format!("{}/api/ok", mock_server.uri()), RequestConfig::new());
    let (bad, good) = futures::future::join(bad, good).await;

    assert!(matches!(bad.unwrap_err(), Error::Http(_)));
    assert_eq!(good.unwrap().status(), 200);
}
