use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::theme::{self, Theme};

/// One day of the short-range forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastEntry {
    pub day: String,
    #[serde(rename = "temp")]
    pub temperature: f64,
    pub condition: String,
}

/// JSON document returned by the generative backend.
///
/// Fields the request schema marks as required are plain values, so a
/// response missing one of them fails to parse. Everything else is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPayload {
    pub city: String,
    pub country: String,
    pub temperature: f64,
    pub condition: String,
    pub forecast: Vec<ForecastEntry>,
    pub aqi: f64,
    pub is_day: bool,
    pub local_time: String,
    pub tips: Vec<String>,
    pub music_mood: String,

    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub aqi_status: Option<String>,
    #[serde(default)]
    pub sunrise: Option<String>,
    #[serde(default)]
    pub sunset: Option<String>,
}

impl WeatherPayload {
    /// Stamp the payload with the local retrieval time.
    pub fn into_record(self, last_updated: DateTime<Utc>) -> WeatherRecord {
        WeatherRecord {
            city: self.city,
            country: self.country,
            temperature: self.temperature,
            feels_like: self.feels_like,
            high: self.high,
            low: self.low,
            condition: self.condition,
            description: self.description,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            aqi: self.aqi,
            aqi_status: self.aqi_status,
            sunrise: self.sunrise,
            sunset: self.sunset,
            local_time: self.local_time,
            is_day: self.is_day,
            tips: self.tips,
            music_mood: self.music_mood,
            forecast: self.forecast,
            last_updated,
        }
    }
}

/// A successful lookup. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub city: String,
    pub country: String,
    /// Degrees Celsius.
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub condition: String,
    pub description: Option<String>,
    /// Percent.
    pub humidity: Option<f64>,
    /// km/h.
    pub wind_speed: Option<f64>,
    pub aqi: f64,
    pub aqi_status: Option<String>,
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub local_time: String,
    pub is_day: bool,
    pub tips: Vec<String>,
    pub music_mood: String,
    pub forecast: Vec<ForecastEntry>,
    /// Set by the client when the response arrived.
    pub last_updated: DateTime<Utc>,
}

impl WeatherRecord {
    pub fn theme(&self) -> Theme {
        theme::resolve(&self.condition, self.is_day)
    }

    pub fn aqi_band(&self) -> AqiBand {
        AqiBand::from_aqi(self.aqi)
    }

    /// Short plain-text line for read-aloud.
    pub fn spoken_summary(&self) -> String {
        let mut text = format!(
            "Weather in {}: {}, {} degrees.",
            self.city,
            self.condition,
            self.temperature.round()
        );
        if let Some(tip) = self.tips.first() {
            text.push(' ');
            text.push_str(tip);
        }
        text
    }

    /// Values outside what the request asked for. These are reported, not
    /// rejected: the backend is trusted for ranges and formats.
    pub fn anomalies(&self) -> Vec<String> {
        let mut found = Vec::new();

        if self.forecast.len() != 5 {
            found.push(format!("expected 5 forecast days, got {}", self.forecast.len()));
        }
        if self.tips.len() != 3 {
            found.push(format!("expected 3 tips, got {}", self.tips.len()));
        }
        if let Some(h) = self.humidity {
            if !(0.0..=100.0).contains(&h) {
                found.push(format!("humidity {h} outside 0..=100"));
            }
        }
        if let Some(w) = self.wind_speed {
            if w < 0.0 {
                found.push(format!("negative wind speed {w}"));
            }
        }
        if !(1.0..=500.0).contains(&self.aqi) {
            found.push(format!("aqi {} outside 1..=500", self.aqi));
        }

        found
    }
}

/// Coarse air quality bucket used for colouring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AqiBand {
    Good,
    Moderate,
    Unhealthy,
    Hazardous,
}

impl AqiBand {
    pub fn from_aqi(aqi: f64) -> Self {
        if aqi < 50.0 {
            AqiBand::Good
        } else if aqi < 100.0 {
            AqiBand::Moderate
        } else if aqi < 150.0 {
            AqiBand::Unhealthy
        } else {
            AqiBand::Hazardous
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AqiBand::Good => "good",
            AqiBand::Moderate => "moderate",
            AqiBand::Unhealthy => "unhealthy",
            AqiBand::Hazardous => "hazardous",
        }
    }
}
