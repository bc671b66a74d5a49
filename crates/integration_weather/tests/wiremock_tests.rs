//! Integration tests for weather service using wiremock
//!
//! These tests verify the weather client's behavior against a mock HTTP server,
//! ensuring proper handling of various response scenarios.

use std::time::Duration;

use domain::search::ForecastValue;
use domain::value_objects::ProxyTemplate;
use integration_weather::{OpenMeteoClient, WeatherClient, WeatherConfig, WeatherError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Sample Open-Meteo hourly response with `hours` entries
fn sample_hourly_response(hours: usize) -> serde_json::Value {
    let time: Vec<String> = (0..hours)
        .map(|h| format!("2024-06-{:02}T{:02}:00", 1 + h / 24, h % 24))
        .collect();
    let probability: Vec<u32> = (0..hours).map(|h| u32::try_from(h % 5).unwrap() * 10).collect();
    let precipitation: Vec<f64> = (0..hours).map(|h| if h % 5 == 4 { 0.4 } else { 0.0 }).collect();

    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "generationtime_ms": 0.05,
        "utc_offset_seconds": 7200,
        "timezone": "Europe/Berlin",
        "timezone_abbreviation": "CEST",
        "elevation": 38.0,
        "hourly_units": {
            "time": "iso8601",
            "precipitation_probability": "%",
            "precipitation": "mm"
        },
        "hourly": {
            "time": time,
            "precipitation_probability": probability,
            "precipitation": precipitation
        }
    })
}

/// Create a test client configured to use the mock server
///
/// # Panics
///
/// Panics if the client cannot be created (should not happen in tests).
fn create_test_client(mock_server: &MockServer) -> OpenMeteoClient {
    let config = WeatherConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
        ..Default::default()
    };
    #[allow(clippy::expect_used)]
    OpenMeteoClient::new(config).expect("Failed to create client")
}

/// Setup a mock for the /forecast endpoint with the given response
async fn setup_forecast_mock(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_get_hourly_success() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(sample_hourly_response(24)),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 1).await;

    let forecast = tokio_test::assert_ok!(result);
    assert_eq!(forecast.hours.len(), 24);
    assert_eq!(forecast.timezone.as_deref(), Some("Europe/Berlin"));
    assert_eq!(
        forecast.hours[3].precipitation_probability,
        ForecastValue::Number(30.0)
    );
    assert_eq!(forecast.hours[4].precipitation.coerce(), Some(0.4));
    assert!(forecast.hours[0].time.is_some());
}

#[tokio::test]
async fn test_get_hourly_keeps_nulls_and_strings() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "latitude": 0.0,
        "longitude": 0.0,
        "hourly": {
            "time": ["2024-06-01T00:00", "2024-06-01T01:00"],
            "precipitation_probability": ["15", null],
            "precipitation": [0.0, "n/a"]
        }
    });
    setup_forecast_mock(&mock_server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = create_test_client(&mock_server);
    let forecast = client.get_hourly(0.0, 0.0, 1).await.unwrap();

    assert_eq!(forecast.hours[0].precipitation_probability.coerce(), Some(15.0));
    assert!(forecast.hours[1].precipitation_probability.is_missing());
    assert_eq!(forecast.hours[1].precipitation, ForecastValue::from("n/a"));
}

#[tokio::test]
async fn test_health_check_success() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(sample_hourly_response(24)),
    )
    .await;

    let client = create_test_client(&mock_server);
    let is_healthy = client.is_healthy().await;

    assert!(is_healthy, "Expected health check to succeed");
}

// ============================================================================
// Error handling scenarios
// ============================================================================

#[tokio::test]
async fn test_server_error_returns_service_unavailable() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 1).await;

    assert!(
        matches!(result, Err(WeatherError::ServiceUnavailable(_))),
        "Expected ServiceUnavailable, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_error() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(429).set_body_string("Rate limit exceeded"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 1).await;

    assert!(
        matches!(result, Err(WeatherError::RateLimitExceeded)),
        "Expected RateLimitExceeded, got: {result:?}"
    );
}

#[tokio::test]
async fn test_bad_request_reports_api_reason() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": true,
            "reason": "Latitude must be in range of -90 to 90°."
        })),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 1).await;

    match result {
        Err(WeatherError::RequestFailed(reason)) => assert!(reason.contains("Latitude")),
        other => panic!("Expected RequestFailed, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_string("not valid json"),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 1).await;

    assert!(
        matches!(result, Err(WeatherError::ParseError(_))),
        "Expected ParseError, got: {result:?}"
    );
}

#[tokio::test]
async fn test_missing_hourly_block_is_parse_error() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"latitude": 1.0, "longitude": 2.0})),
    )
    .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(1.0, 2.0, 1).await;

    assert!(
        matches!(result, Err(WeatherError::ParseError(ref msg)) if msg.contains("hourly")),
        "Expected ParseError, got: {result:?}"
    );
}

#[tokio::test]
async fn test_non_list_hourly_field_is_parse_error() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!({
        "latitude": 0.0,
        "longitude": 0.0,
        "hourly": {
            "time": ["2024-06-01T00:00"],
            "precipitation_probability": {"value": 10},
            "precipitation": [0.0]
        }
    });
    setup_forecast_mock(&mock_server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(0.0, 0.0, 1).await;

    assert!(matches!(result, Err(WeatherError::ParseError(_))));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(sample_hourly_response(24))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = WeatherConfig {
        base_url: mock_server.uri(),
        timeout_secs: 1,
        ..Default::default()
    };
    let client = OpenMeteoClient::new(config).unwrap();
    let result = client.get_hourly(52.52, 13.405, 1).await;

    assert!(
        matches!(result, Err(WeatherError::Timeout)),
        "Expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_health_check_fails_on_server_error() {
    let mock_server = MockServer::start().await;

    setup_forecast_mock(
        &mock_server,
        ResponseTemplate::new(500).set_body_string("Internal Server Error"),
    )
    .await;

    let client = create_test_client(&mock_server);
    assert!(!client.is_healthy().await, "Expected health check to fail");
}

// ============================================================================
// Input validation scenarios
// ============================================================================

#[tokio::test]
async fn test_invalid_coordinates_never_hit_the_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(91.0, 13.405, 1).await;
    assert!(matches!(result, Err(WeatherError::InvalidCoordinates)));

    let result = client.get_hourly(52.52, 181.0, 1).await;
    assert!(matches!(result, Err(WeatherError::InvalidCoordinates)));
}

// ============================================================================
// Query parameter verification
// ============================================================================

#[tokio::test]
async fn test_request_contains_correct_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.405"))
        .and(query_param("hourly", "precipitation_probability,precipitation"))
        .and(query_param("forecast_days", "2"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_hourly_response(48)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_hourly(52.52, 13.405, 2).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
    assert_eq!(result.unwrap().hours.len(), 48);
}

#[tokio::test]
async fn test_requests_are_routed_through_proxy() {
    let mock_server = MockServer::start().await;
    let upstream = "https://api.open-meteo.com/v1/forecast";

    Mock::given(method("GET"))
        .and(path("/fetch"))
        .and(move |request: &wiremock::Request| {
            request
                .url
                .query_pairs()
                .any(|(key, value)| key == "url" && value.starts_with(upstream))
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_hourly_response(24)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let template = format!("{}/fetch?url={{url}}", mock_server.uri());
    let config = WeatherConfig {
        proxy_template: Some(ProxyTemplate::parse(template).unwrap()),
        timeout_secs: 5,
        ..Default::default()
    };
    let client = OpenMeteoClient::new(config).unwrap();

    let result = client.get_hourly(52.52, 13.405, 1).await;
    assert!(result.is_ok(), "Expected success, got: {result:?}");
}
