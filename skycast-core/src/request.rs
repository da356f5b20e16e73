//! Prompt and output schema sent to the generative backend.

use serde_json::{Value, json};

use crate::error::WeatherError;

/// Fields the backend must return for a response to be usable.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "city",
    "country",
    "temperature",
    "condition",
    "forecast",
    "aqi",
    "isDay",
    "localTime",
    "tips",
    "musicMood",
];

/// Number of forecast days requested.
pub const FORECAST_DAYS: usize = 5;

/// Number of tips requested.
pub const TIP_COUNT: usize = 3;

/// A fully built weather request: instruction text plus output schema.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPrompt {
    pub location: String,
    pub instruction: String,
    pub schema: Value,
}

impl WeatherPrompt {
    /// Build the request for a city name or a `coordinates <lat>, <lon>` string.
    pub fn build(location: &str) -> Result<Self, WeatherError> {
        let location = location.trim();
        if location.is_empty() {
            return Err(WeatherError::EmptyQuery);
        }

        Ok(Self {
            location: location.to_string(),
            instruction: instruction(location),
            schema: response_schema(),
        })
    }
}

fn instruction(location: &str) -> String {
    format!(
        "Act as an expert meteorologist. Get the current weather and a {FORECAST_DAYS}-day forecast for {location}.\n\
         Return ONLY a valid JSON object.\n\
         \n\
         Fields to include:\n\
         - city, country\n\
         - temperature (Celsius)\n\
         - condition (One word: Clear, Clouds, Rain, Snow, or Storm)\n\
         - description (Short poetic description)\n\
         - high, low (Int)\n\
         - humidity (%), windSpeed (km/h), feelsLike\n\
         - sunrise, sunset (HH:mm format)\n\
         - aqi (1 to 500 scale)\n\
         - aqiStatus (e.g., \"Good\", \"Fair\", \"Polluted\")\n\
         - localTime (HH:mm)\n\
         - isDay (Boolean)\n\
         - tips (Array of {TIP_COUNT} strings)\n\
         - musicMood (A genre)\n\
         - forecast (Array of {FORECAST_DAYS} objects: {{day: string, temp: number, condition: string}})"
    )
}

/// Output schema in the backend's schema dialect.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "city": { "type": "STRING" },
            "country": { "type": "STRING" },
            "temperature": { "type": "NUMBER" },
            "condition": { "type": "STRING" },
            "description": { "type": "STRING" },
            "high": { "type": "NUMBER" },
            "low": { "type": "NUMBER" },
            "humidity": { "type": "NUMBER" },
            "windSpeed": { "type": "NUMBER" },
            "feelsLike": { "type": "NUMBER" },
            "sunrise": { "type": "STRING" },
            "sunset": { "type": "STRING" },
            "aqi": { "type": "NUMBER" },
            "aqiStatus": { "type": "STRING" },
            "localTime": { "type": "STRING" },
            "isDay": { "type": "BOOLEAN" },
            "musicMood": { "type": "STRING" },
            "tips": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "minItems": TIP_COUNT,
                "maxItems": TIP_COUNT
            },
            "forecast": {
                "type": "ARRAY",
                "minItems": FORECAST_DAYS,
                "maxItems": FORECAST_DAYS,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "day": { "type": "STRING" },
                        "temp": { "type": "NUMBER" },
                        "condition": { "type": "STRING" }
                    },
                    "required": ["day", "temp", "condition"]
                }
            }
        },
        "required": REQUIRED_FIELDS
    })
}
