use thiserror::Error;

/// Every failure a weather lookup can surface to the user.
///
/// `Display` is the user-facing message. None of these are fatal: the caller
/// may retry or fall back to another location.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeatherError {
    #[error("Please enter a city name.")]
    EmptyQuery,

    #[error(
        "Unable to reach the atmosphere in \"{location}\". Please check your connection or city name."
    )]
    Fetch { location: String, detail: String },

    #[error("The request for \"{location}\" is taking too long. Please try again.")]
    Timeout { location: String },

    #[error("Location access denied.")]
    GeolocationDenied(String),
}

impl WeatherError {
    /// Wrap a transport or parse failure for `location`, keeping only its text.
    pub fn fetch(location: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::Fetch {
            location: location.into(),
            detail: cause.to_string(),
        }
    }

    pub fn timeout(location: impl Into<String>) -> Self {
        Self::Timeout {
            location: location.into(),
        }
    }

    /// Underlying cause, for logs only.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Fetch { detail, .. } => Some(detail),
            Self::GeolocationDenied(reason) => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_message_names_location_and_hides_cause() {
        let err = WeatherError::fetch("Atlantis", "dns error: no such host");
        let msg = err.to_string();

        assert!(msg.contains("\"Atlantis\""));
        assert!(!msg.contains("dns error"));
        assert_eq!(err.detail(), Some("dns error: no such host"));
    }

    #[test]
    fn timeout_message_is_distinct() {
        let msg = WeatherError::timeout("Oslo").to_string();
        assert!(msg.contains("taking too long"));
        assert_ne!(msg, WeatherError::fetch("Oslo", "x").to_string());
    }
}
