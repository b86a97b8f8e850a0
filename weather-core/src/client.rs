use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::model::{LocationCandidate, WeatherPayload};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

/// Number of forecast days requested from the API.
const FORECAST_DAYS: &str = "7";

/// The only failure the fetch layer reports. The variants exist for log detail;
/// callers treat all of them as "no data this round".
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {endpoint} failed")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("failed to parse {endpoint} response")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Where forecasts and location candidates come from.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_forecast(&self, city: &str) -> Result<WeatherPayload, FetchError>;

    async fn fetch_location(&self, city: &str) -> Result<Vec<LocationCandidate>, FetchError>;
}

/// Client for the WeatherAPI.com `forecast.json` and `search.json` endpoints.
#[derive(Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl Debug for WeatherApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherApiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http: Client::new() }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Shared GET helper. Every failure is logged here and returned as a
    /// [`FetchError`]; nothing is retried.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let url = format!("{}/{}", self.base_url, endpoint);

        let result = self.request(&url, endpoint, params).await;
        if let Err(err) = &result {
            match std::error::Error::source(err) {
                Some(cause) => warn!(error = %err, cause = %cause, "weather fetch failed"),
                None => warn!(error = %err, "weather fetch failed"),
            }
        }
        result
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        endpoint: &'static str,
        params: &[(&str, &str)],
    ) -> Result<T, FetchError> {
        let res = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|source| transport(endpoint, source))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| transport(endpoint, source))?;

        if !status.is_success() {
            return Err(FetchError::Status { endpoint, status, body: truncate_body(&body) });
        }

        debug!(endpoint, bytes = body.len(), "weather fetch succeeded");
        serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherSource for WeatherApiClient {
    #[instrument(skip(self))]
    async fn fetch_forecast(&self, city: &str) -> Result<WeatherPayload, FetchError> {
        self.get_json(
            "forecast.json",
            &[("q", city), ("days", FORECAST_DAYS), ("aqi", "no"), ("alerts", "no")],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_location(&self, city: &str) -> Result<Vec<LocationCandidate>, FetchError> {
        self.get_json("search.json", &[("q", city)]).await
    }
}

/// The request URL carries the API key, so it is stripped before the error
/// can reach a log line or an error chain.
fn transport(endpoint: &'static str, source: reqwest::Error) -> FetchError {
    FetchError::Transport { endpoint, source: source.without_url() }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let client = WeatherApiClient::with_base_url("KEY".into(), "http://localhost:1234/v1/");
        assert_eq!(client.base_url(), "http://localhost:1234/v1");
    }

    #[test]
    fn default_base_url_points_at_weatherapi() {
        let client = WeatherApiClient::new("KEY".into());
        assert_eq!(client.base_url(), "https://api.weatherapi.com/v1");
    }

    #[test]
    fn debug_output_hides_api_key() {
        let client = WeatherApiClient::new("SECRET_KEY".into());
        assert!(!format!("{client:?}").contains("SECRET_KEY"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
