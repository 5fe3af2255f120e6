//! Integration tests for coordinate lookup, the OpenWeather provider and the
//! full report pipeline against mock HTTP servers.

use std::{fs, time::Duration};

use weather_core::{
    CoordinateResolver, Coordinates, JsonFileWeatherStorage, OpenWeatherProvider,
    PlainFileWeatherStorage, WeatherCategory, WeatherError, WeatherProvider, WeatherStorage,
    config::CoordinatesConfig, report_weather,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn liman_weather_response() -> serde_json::Value {
    serde_json::json!({
        "coord": {"lon": 48.8, "lat": 37.5974},
        "main": {"temp": 22.6, "feels_like": 22.1, "humidity": 40},
        "weather": [{"id": 800, "main": "Clear", "description": "ясно"}],
        "sys": {"country": "UA", "sunrise": 1700000000, "sunset": 1700030000},
        "name": "Liman"
    })
}

fn resolver(server: &MockServer, round: bool) -> CoordinateResolver {
    let config = CoordinatesConfig {
        url: format!("{}/json", server.uri()),
        round,
    };
    CoordinateResolver::new(config, Duration::from_secs(5)).expect("Failed to create resolver")
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    let template = format!(
        "{}/data/2.5/weather?lat={{lat}}&lon={{lon}}&appid={{api_key}}&units=metric",
        server.uri()
    );
    OpenWeatherProvider::new("TEST_KEY".into(), template, Duration::from_secs(5))
        .expect("Failed to create provider")
}

async fn mount_geolocation(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_weather(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(response)
        .mount(server)
        .await;
}

// =============================================================================
// Coordinate Resolver
// =============================================================================

#[tokio::test]
async fn resolves_coordinates_without_rounding() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Liman",
            "loc": "37.5974,48.8"
        })),
    )
    .await;

    let coords = resolver(&server, false).resolve().await.expect("should resolve");
    assert_eq!(coords, Coordinates::new(37.5974, 48.8));
}

#[tokio::test]
async fn resolves_coordinates_with_rounding() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"loc": "37.5974,48.8321"})),
    )
    .await;

    let coords = resolver(&server, true).resolve().await.expect("should resolve");
    assert_eq!(coords, Coordinates::new(37.6, 48.8));
}

#[tokio::test]
async fn geolocation_without_loc_fails() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"city": "Liman"})),
    )
    .await;

    let err = resolver(&server, true).resolve().await.unwrap_err();
    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
}

#[tokio::test]
async fn geolocation_invalid_json_fails() {
    let server = MockServer::start().await;
    mount_geolocation(&server, ResponseTemplate::new(200).set_body_string("<html>oops")).await;

    let err = resolver(&server, false).resolve().await.unwrap_err();
    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
}

#[tokio::test]
async fn geolocation_http_error_fails() {
    let server = MockServer::start().await;
    mount_geolocation(&server, ResponseTemplate::new(503)).await;

    let err = resolver(&server, false).resolve().await.unwrap_err();
    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
}

#[tokio::test]
async fn geolocation_unreachable_host_fails() {
    let config = CoordinatesConfig {
        url: "http://127.0.0.1:9/json".to_string(),
        round: false,
    };
    let resolver = CoordinateResolver::new(config, Duration::from_secs(2)).unwrap();

    let err = resolver.resolve().await.unwrap_err();
    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
}

#[tokio::test]
async fn geolocation_timeout_fails() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({"loc": "1,2"}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = CoordinatesConfig {
        url: format!("{}/json", server.uri()),
        round: false,
    };
    let resolver = CoordinateResolver::new(config, Duration::from_millis(200)).unwrap();

    let err = resolver.resolve().await.unwrap_err();
    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
}

// =============================================================================
// OpenWeather Provider
// =============================================================================

#[tokio::test]
async fn fetches_weather_for_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "37.5974"))
        .and(query_param("lon", "48.8"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(liman_weather_response()))
        .expect(1)
        .mount(&server)
        .await;

    let weather = provider(&server)
        .get_weather(Coordinates::new(37.5974, 48.8))
        .await
        .expect("should fetch weather");

    assert_eq!(weather.temperature, 23);
    assert_eq!(weather.category, WeatherCategory::Clear);
    assert_eq!(weather.city, "Liman");
}

#[tokio::test]
async fn cloudy_code_is_not_mistaken_for_clear() {
    let server = MockServer::start().await;
    let mut body = liman_weather_response();
    body["weather"][0]["id"] = serde_json::json!(801);
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let weather = provider(&server).get_weather(Coordinates::new(1.0, 2.0)).await.unwrap();
    assert_eq!(weather.category, WeatherCategory::Clouds);
}

#[tokio::test]
async fn weather_unauthorized_fails() {
    let server = MockServer::start().await;
    mount_weather(
        &server,
        ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "cod": 401,
            "message": "Invalid API key."
        })),
    )
    .await;

    let err = provider(&server).get_weather(Coordinates::new(1.0, 2.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::WeatherFetchFailed(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn weather_empty_conditions_fail() {
    let server = MockServer::start().await;
    let mut body = liman_weather_response();
    body["weather"] = serde_json::json!([]);
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(body)).await;

    let err = provider(&server).get_weather(Coordinates::new(1.0, 2.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::WeatherFetchFailed(_)));
}

#[tokio::test]
async fn weather_invalid_json_fails() {
    let server = MockServer::start().await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_string("not json")).await;

    let err = provider(&server).get_weather(Coordinates::new(1.0, 2.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::WeatherFetchFailed(_)));
}

// =============================================================================
// Full pipeline
// =============================================================================

#[tokio::test]
async fn report_formats_and_records_weather() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"loc": "37.5974,48.8"})),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "37.5974"))
        .and(query_param("lon", "48.8"))
        .respond_with(ResponseTemplate::new(200).set_body_json(liman_weather_response()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileWeatherStorage::new(dir.path().join("history.json")).unwrap();

    let report = report_weather(
        &resolver(&server, false),
        &provider(&server),
        Some(&storage as &dyn WeatherStorage),
    )
    .await
    .expect("pipeline should succeed");

    assert_eq!(report.weather.temperature, 23);
    assert_eq!(report.weather.category, WeatherCategory::Clear);
    assert_eq!(report.weather.city, "Liman");
    assert!(report.formatted.starts_with("Liman, температура 23 °C, Ясно"));
    assert_eq!(report.formatted.lines().count(), 3);

    let records = storage.records().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].weather, report.formatted);
}

#[tokio::test]
async fn report_without_storage_writes_nothing() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"loc": "37.5974,48.8"})),
    )
    .await;
    mount_weather(&server, ResponseTemplate::new(200).set_body_json(liman_weather_response())).await;

    let report = report_weather(&resolver(&server, true), &provider(&server), None)
        .await
        .unwrap();
    assert!(report.formatted.starts_with("Liman"));
}

#[tokio::test]
async fn failed_weather_fetch_leaves_history_untouched() {
    let server = MockServer::start().await;
    mount_geolocation(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({"loc": "37.5974,48.8"})),
    )
    .await;
    mount_weather(&server, ResponseTemplate::new(500)).await;

    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("history.txt");
    let storage = PlainFileWeatherStorage::new(&history);

    let err = report_weather(
        &resolver(&server, false),
        &provider(&server),
        Some(&storage as &dyn WeatherStorage),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WeatherError::WeatherFetchFailed(_)));
    assert!(!history.exists());
}

#[tokio::test]
async fn failed_geolocation_skips_weather_request() {
    let server = MockServer::start().await;
    mount_geolocation(&server, ResponseTemplate::new(200).set_body_string("{}")).await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(liman_weather_response()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let storage = JsonFileWeatherStorage::new(&path).unwrap();

    let err = report_weather(
        &resolver(&server, false),
        &provider(&server),
        Some(&storage as &dyn WeatherStorage),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, WeatherError::CoordinateResolutionFailed(_)));
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}
