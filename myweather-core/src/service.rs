use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::{
    Config,
    executor::HttpStatusError,
    model::{CurrentResponse, ForecastResponse},
};

/// Upper bound on forecast days accepted by WeatherAPI.com.
pub const MAX_FORECAST_DAYS: u8 = 14;

/// A source of weather data.
///
/// Implementations report a non-2xx answer as [`HttpStatusError`] so the
/// request executor can tell it apart from transport failures.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn current(&self, city: &str, language: &str) -> Result<CurrentResponse>;

    async fn forecast(&self, city: &str, days: u8, language: &str) -> Result<ForecastResponse>;
}

/// HTTP client for the WeatherAPI.com REST API.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiClient {
    pub fn new(api_key: String, base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { api_key, base_url, http }
    }

    /// Build a client from config, with its timeout applied.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_owned();
        let http = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::new(api_key, config.base_url.clone(), http))
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%url, "sending WeatherAPI request");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to WeatherAPI ({endpoint})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read WeatherAPI {endpoint} response body"))?;

        if !status.is_success() {
            return Err(HttpStatusError::new(status.as_u16(), body))
                .with_context(|| format!("WeatherAPI {endpoint} request failed"));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse WeatherAPI {endpoint} JSON"))
    }
}

#[async_trait]
impl WeatherService for WeatherApiClient {
    async fn current(&self, city: &str, language: &str) -> Result<CurrentResponse> {
        self.get_json("current.json", &[("q", city), ("lang", language)]).await
    }

    async fn forecast(&self, city: &str, days: u8, language: &str) -> Result<ForecastResponse> {
        let days = days.clamp(1, MAX_FORECAST_DAYS).to_string();
        self.get_json("forecast.json", &[("q", city), ("days", days.as_str()), ("lang", language)])
            .await
    }
}
