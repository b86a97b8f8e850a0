use serde_json::json;
use std::sync::Arc;
use weather_core::{
    CITY_KEY, KeyValueStore, MemoryStore, SearchAndDisplayController, WeatherApiClient,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn forecast_for(city: &str, temp_c: f64) -> serde_json::Value {
    json!({
        "location": {"name": city, "region": "", "country": "France"},
        "current": {"temp_c": temp_c, "condition": {"text": "Clear"},
                    "wind_kph": 5.0, "humidity": 60},
        "forecast": {"forecastday": [
            {"date": "2024-05-07", "day": {"avgtemp_c": temp_c, "condition": {"text": "Clear"}},
             "astro": {"sunrise": "06:27 AM"}}
        ]}
    })
}

async fn mount_forecast(server: &MockServer, city: &str, temp_c: f64) {
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", city))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_for(city, temp_c)))
        .mount(server)
        .await;
}

/// Startup with a remembered city, then a search and a selection, end to end over HTTP.
#[tokio::test]
async fn remembered_city_then_search_and_select() {
    let server = MockServer::start().await;
    mount_forecast(&server, "Paris", 14.0).await;
    mount_forecast(&server, "Lyon", 18.0).await;

    Mock::given(method("GET"))
        .and(path("/search.json"))
        .and(query_param("q", "Lyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 7, "name": "Lyon", "region": "Rhone-Alpes", "country": "France",
             "lat": 45.75, "lon": 4.85, "url": "lyon-rhone-alpes-france"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = Arc::new(WeatherApiClient::with_base_url("TEST_KEY".into(), server.uri()));
    let store = Arc::new(MemoryStore::with_entry(CITY_KEY, "Paris"));
    let ctrl = SearchAndDisplayController::new(client, store.clone());

    ctrl.mount().await;
    let state = ctrl.state();
    assert!(!state.loading);
    assert_eq!(state.weather.as_ref().map(|w| w.location.name.as_str()), Some("Paris"));

    ctrl.toggle_search();
    ctrl.handle_search("Lyo").await;
    assert_eq!(ctrl.state().candidates.len(), 1);

    assert!(ctrl.select_candidate(0).await);
    let state = ctrl.state();
    assert!(!state.loading);
    assert!(!state.show_search);
    assert_eq!(state.weather.as_ref().map(|w| w.current.temp_c), Some(18.0));
    assert_eq!(store.get_data(CITY_KEY).await.as_deref(), Some("Lyon"));
}

/// A dead API leaves the screen empty but not stuck loading.
#[tokio::test]
async fn unreachable_api_does_not_leave_screen_loading() {
    let client = Arc::new(WeatherApiClient::with_base_url("TEST_KEY".into(), "http://127.0.0.1:1"));
    let ctrl = SearchAndDisplayController::new(client, Arc::new(MemoryStore::new()));

    ctrl.mount().await;

    let state = ctrl.state();
    assert!(!state.loading);
    assert!(state.weather.is_none());
}
