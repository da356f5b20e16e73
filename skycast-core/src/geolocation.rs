use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};
use tracing::warn;

use crate::error::WeatherError;

pub const DEFAULT_IP_LOOKUP_URL: &str = "http://ip-api.com/json";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::GeolocationDenied(format!(
                "coordinates out of range: {latitude}, {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Location string understood by the request builder.
    pub fn to_query(&self) -> String {
        format!("coordinates {}, {}", self.latitude, self.longitude)
    }
}

/// Source of the user's current position.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<Coordinates, WeatherError>;
}

/// Position supplied up front, e.g. from command-line flags.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinates);

#[async_trait]
impl Geolocator for FixedLocation {
    async fn locate(&self) -> Result<Coordinates, WeatherError> {
        Ok(self.0)
    }
}

/// Approximate position from the public IP address.
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self::with_url(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn with_url(url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        Self {
            url: url.into(),
            http,
        }
    }

    async fn lookup(&self) -> anyhow::Result<Coordinates> {
        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("Failed to reach IP geolocation service")?
            .error_for_status()
            .context("IP geolocation service returned an error")?;

        let parsed: IpLookupResponse = res
            .json()
            .await
            .context("Failed to parse IP geolocation response")?;

        if parsed.status != "success" {
            return Err(anyhow!(
                "IP geolocation failed: {}",
                parsed.message.as_deref().unwrap_or(&parsed.status)
            ));
        }

        match (parsed.lat, parsed.lon) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map_err(anyhow::Error::from),
            _ => Err(anyhow!("IP geolocation response had no coordinates")),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, WeatherError> {
        self.lookup().await.map_err(|e| {
            let reason = format!("{e:#}");
            warn!(error = %reason, "geolocation unavailable");
            WeatherError::GeolocationDenied(reason)
        })
    }
}
