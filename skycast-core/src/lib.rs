//! Core library for the `skycast` weather client.
//!
//! This crate defines:
//! - The prompt and output schema sent to a generative backend
//! - The weather client: one backend call, a timeout guard, typed parsing
//! - Theme derivation from condition text
//! - Search history and the session context that owns it
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod client;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod history;
pub mod model;
pub mod provider;
pub mod request;
pub mod session;
pub mod theme;

pub use client::{REQUEST_TIMEOUT, WeatherClient};
pub use config::{Config, GeminiConfig};
pub use error::WeatherError;
pub use geolocation::{Coordinates, FixedLocation, Geolocator, IpGeolocator};
pub use history::{SearchHistory, StateStore};
pub use model::{AqiBand, ForecastEntry, WeatherRecord};
pub use provider::{WeatherBackend, backend_from_config};
pub use request::WeatherPrompt;
pub use session::{SearchOutcome, SearchTicket, Session};
pub use theme::Theme;
