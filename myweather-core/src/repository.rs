use tokio_util::sync::CancellationToken;

use crate::{
    Config,
    executor::{Cancelled, ErrorCodec, ExecutionResult, JsonCodec, RequestExecutor},
    model::{CurrentResponse, ForecastResponse},
    service::{WeatherApiClient, WeatherService},
    view::{CurrentSummary, WeatherOverview},
};

/// Loads weather data for a city, one request per call.
#[derive(Debug)]
pub struct WeatherRepository<C = JsonCodec> {
    service: Box<dyn WeatherService>,
    executor: RequestExecutor<C>,
    language: String,
    cancel: CancellationToken,
}

impl WeatherRepository {
    /// Repository backed by WeatherAPI.com as described by `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = WeatherApiClient::from_config(config)?;
        Ok(Self::new(Box::new(client), RequestExecutor::new(JsonCodec), config.language.clone()))
    }
}

impl<C: ErrorCodec> WeatherRepository<C> {
    pub fn new(service: Box<dyn WeatherService>, executor: RequestExecutor<C>, language: String) -> Self {
        Self { service, executor, language, cancel: CancellationToken::new() }
    }

    /// Use `cancel` to abort in-flight requests.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub async fn load_current(&self, city: &str) -> Result<ExecutionResult<CurrentResponse>, Cancelled> {
        tracing::info!(city, "loading current weather");
        self.executor
            .run_cancellable(&self.cancel, self.service.current(city, &self.language))
            .await
    }

    pub async fn load_forecast(&self, city: &str, days: u8) -> Result<ExecutionResult<ForecastResponse>, Cancelled> {
        tracing::info!(city, days, "loading forecast");
        self.executor
            .run_cancellable(&self.cancel, self.service.forecast(city, days, &self.language))
            .await
    }

    pub async fn load_summary(&self, city: &str) -> Result<ExecutionResult<CurrentSummary>, Cancelled> {
        Ok(self.load_current(city).await?.map(|res| CurrentSummary::from(&res)))
    }

    pub async fn load_overview(&self, city: &str, days: u8) -> Result<ExecutionResult<WeatherOverview>, Cancelled> {
        Ok(self.load_forecast(city, days).await?.map(|res| WeatherOverview::from(&res)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{FaultKind, HttpStatusError, StructuredError};
    use crate::service::tests::CURRENT_JSON;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct FakeService {
        calls: Arc<Mutex<Vec<String>>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl WeatherService for FakeService {
        async fn current(&self, city: &str, language: &str) -> Result<CurrentResponse> {
            self.calls.lock().unwrap().push(format!("current {city} {language}"));
            if let Some(status) = self.fail_with {
                return Err(HttpStatusError::new(status, r#"{"message":"No matching location found.","error_code":"1006"}"#).into());
            }
            Ok(serde_json::from_str(CURRENT_JSON)?)
        }

        async fn forecast(&self, city: &str, days: u8, _language: &str) -> Result<ForecastResponse> {
            self.calls.lock().unwrap().push(format!("forecast {city} {days}"));
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionAborted, "aborted").into())
        }
    }

    fn repo(service: FakeService) -> WeatherRepository {
        WeatherRepository::new(Box::new(service), RequestExecutor::new(JsonCodec), "ru".into())
    }

    #[tokio::test]
    async fn summary_is_mapped_from_current() {
        let result = repo(FakeService::default()).load_summary("London").await.unwrap();

        let summary = result.data().unwrap();
        assert_eq!(summary.location_name, "London, United Kingdom");
        assert_eq!(summary.condition, "Partly cloudy");
        assert_eq!(summary.wind_speed_mps, Some(2.0));
    }

    #[tokio::test]
    async fn server_error_flows_through() {
        let result = repo(FakeService { fail_with: Some(400), ..Default::default() })
            .load_current("Atlantis")
            .await
            .unwrap();

        assert_eq!(
            result,
            ExecutionResult::ExpectedError(StructuredError::new("No matching location found.", "1006"))
        );
    }

    #[tokio::test]
    async fn transport_failure_flows_through() {
        let result = repo(FakeService::default()).load_overview("Paris", 3).await.unwrap();
        assert_eq!(result, ExecutionResult::UnexpectedFailure(FaultKind::Io));
    }

    #[tokio::test]
    async fn configured_language_is_passed_to_service() {
        let service = FakeService::default();
        let calls = service.calls.clone();

        let r = repo(service);
        let _ = r.load_current("Omsk").await;
        let _ = r.load_forecast("Omsk", 5).await;

        assert_eq!(r.language(), "ru");
        assert_eq!(*calls.lock().unwrap(), vec!["current Omsk ru".to_string(), "forecast Omsk 5".to_string()]);
    }

    #[tokio::test]
    async fn cancelled_repository_does_not_call_service() {
        let service = FakeService::default();
        let calls = service.calls.clone();
        let token = CancellationToken::new();
        token.cancel();

        let r = repo(service).with_cancellation(token);
        assert_eq!(r.load_current("Omsk").await, Err(Cancelled));
        assert!(calls.lock().unwrap().is_empty());
    }
}
