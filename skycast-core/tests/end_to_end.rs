use serde_json::json;
use skycast_core::{
    SearchOutcome, Session, StateStore, Theme, WeatherClient, WeatherError,
    provider::gemini::GeminiBackend,
};
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const ENDPOINT: &str = "/v1beta/models/gemini-test:generateContent";

fn gemini_reply(weather: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": weather.to_string() }] },
            "finishReason": "STOP"
        }]
    })
}

fn london_rain() -> serde_json::Value {
    json!({
        "city": "London",
        "country": "United Kingdom",
        "temperature": 9,
        "condition": "Rain",
        "aqi": 35,
        "isDay": true,
        "localTime": "10:15",
        "tips": ["Umbrella", "Boots", "Tea"],
        "musicMood": "Jazz",
        "forecast": [
            {"day": "Mon", "temp": 9, "condition": "Rain"},
            {"day": "Tue", "temp": 10, "condition": "Rain"},
            {"day": "Wed", "temp": 12, "condition": "Clouds"},
            {"day": "Thu", "temp": 13, "condition": "Clear"},
            {"day": "Fri", "temp": 11, "condition": "Clouds"}
        ]
    })
}

fn session_for(server: &MockServer, dir: &tempfile::TempDir, timeout: Duration) -> Session {
    let backend = GeminiBackend::new("KEY")
        .with_model("gemini-test")
        .with_base_url(server.uri());
    let client = WeatherClient::new(Box::new(backend)).with_timeout(timeout);
    Session::new(client, StateStore::new(dir.path().join("state.json")))
}

#[tokio::test]
async fn search_through_gemini_updates_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(london_rain())))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_for(&server, &dir, Duration::from_secs(15));

    let outcome = session.search("London").await.expect("success");

    assert_eq!(outcome, SearchOutcome::Updated(Theme::Rain));
    assert_eq!(session.history(), ["London"]);

    let record = session.current().expect("record");
    assert_eq!(record.forecast.len(), 5);
    assert_eq!(record.feels_like, None);
}

#[tokio::test]
async fn slow_backend_times_out_without_state_change() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(london_rain()))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_for(&server, &dir, Duration::from_millis(200));

    let err = session.search("London").await.unwrap_err();

    assert_eq!(err, WeatherError::timeout("London"));
    assert!(session.current().is_none());
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn backend_error_surfaces_as_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut session = session_for(&server, &dir, Duration::from_secs(15));

    let err = session.search("Springfield").await.unwrap_err();

    assert!(err.to_string().contains("\"Springfield\""));
    assert!(err.detail().is_some_and(|d| d.contains("500")));
}
