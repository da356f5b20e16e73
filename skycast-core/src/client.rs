use chrono::Utc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::{
    error::WeatherError,
    model::{WeatherPayload, WeatherRecord},
    provider::WeatherBackend,
    request::WeatherPrompt,
};

/// How long a lookup may take before the caller stops waiting.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Turns a location into a [`WeatherRecord`] with one backend call.
///
/// Stateless apart from its backend: no caching, no retry.
#[derive(Debug)]
pub struct WeatherClient {
    backend: Box<dyn WeatherBackend>,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(backend: Box<dyn WeatherBackend>) -> Self {
        Self {
            backend,
            timeout: REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch current weather and forecast for a city or coordinate string.
    ///
    /// When the timeout elapses the in-flight call is dropped and
    /// [`WeatherError::Timeout`] is returned; nothing from that call is ever
    /// observed afterwards.
    #[instrument(skip(self), fields(timeout_secs = self.timeout.as_secs()))]
    pub async fn fetch(&self, location: &str) -> Result<WeatherRecord, WeatherError> {
        let prompt = WeatherPrompt::build(location)?;
        let location = prompt.location.as_str();

        let raw = match tokio::time::timeout(self.timeout, self.backend.generate(&prompt)).await
        {
            Err(_) => {
                warn!(location, "weather request timed out");
                return Err(WeatherError::timeout(location));
            }
            Ok(Err(e)) => {
                warn!(location, error = %format!("{e:#}"), "weather request failed");
                return Err(WeatherError::fetch(location, format!("{e:#}")));
            }
            Ok(Ok(raw)) => raw,
        };

        let payload: WeatherPayload = serde_json::from_str(raw.trim()).map_err(|e| {
            warn!(location, error = %e, "weather response did not match schema");
            WeatherError::fetch(location, format!("Failed to parse weather JSON: {e}"))
        })?;

        let record = payload.into_record(Utc::now());
        for anomaly in record.anomalies() {
            warn!(location, %anomaly, "accepting questionable weather value");
        }

        info!(
            location,
            city = %record.city,
            condition = %record.condition,
            "weather received"
        );
        Ok(record)
    }
}
