use crate::{Config, provider::gemini::GeminiBackend, request::WeatherPrompt};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod gemini;

/// Transport to a generative language model that answers weather prompts.
///
/// Implementations return the raw JSON text of the answer; parsing and
/// timeouts belong to [`crate::WeatherClient`].
#[async_trait]
pub trait WeatherBackend: Send + Sync + Debug {
    async fn generate(&self, prompt: &WeatherPrompt) -> anyhow::Result<String>;
}

/// Construct the Gemini backend from config.
pub fn backend_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherBackend>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No Gemini API key configured.\n\
             Hint: run `skycast configure` or set {}.",
            crate::config::API_KEY_ENV
        )
    })?;

    let mut backend = GeminiBackend::new(api_key).with_model(config.model());
    if let Some(base_url) = config.base_url() {
        backend = backend.with_base_url(base_url);
    }

    Ok(Box::new(backend))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, GeminiConfig};

    #[test]
    fn backend_from_config_errors_when_missing_api_key() {
        if std::env::var(crate::config::API_KEY_ENV).is_ok() {
            return;
        }
        let cfg = Config::default();
        let err = backend_from_config(&cfg).unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("No Gemini API key configured"));
        assert!(msg.contains("Hint: run `skycast configure`"));
    }

    #[test]
    fn backend_from_config_works_when_key_present() {
        let cfg = Config {
            gemini: Some(GeminiConfig {
                api_key: "KEY".to_string(),
                model: None,
                base_url: Some("http://127.0.0.1:9".to_string()),
            }),
            ..Config::default()
        };

        assert!(backend_from_config(&cfg).is_ok());
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let short = "short body";
        assert_eq!(truncate_body(short), short);

        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
    }
}
