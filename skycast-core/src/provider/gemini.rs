use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::request::WeatherPrompt;

use super::{WeatherBackend, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Google Gemini `generateContent` with a JSON response schema.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    api_key: String,
    model: String,
    base_url: String,
    http: Client,
}

impl GeminiBackend {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<GmContent<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct GmContent<'a> {
    role: &'static str,
    parts: Vec<GmPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GmPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
}

impl<'a> GenerateRequest<'a> {
    fn from_prompt(prompt: &'a WeatherPrompt) -> Self {
        Self {
            contents: vec![GmContent {
                role: "user",
                parts: vec![GmPart {
                    text: &prompt.instruction,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &prompt.schema,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<GmCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GmPromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmCandidate {
    #[serde(default)]
    content: Option<GmCandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GmCandidateContent {
    #[serde(default)]
    parts: Vec<GmResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GmResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Result<String> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(anyhow!("Gemini blocked the prompt: {reason}"));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Gemini response contained no candidates"))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(anyhow!(
                "Gemini response contained no text (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl WeatherBackend for GeminiBackend {
    async fn generate(&self, prompt: &WeatherPrompt) -> Result<String> {
        debug!(model = %self.model, location = %prompt.location, "sending generateContent");

        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&GenerateRequest::from_prompt(prompt))
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Gemini response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Gemini request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse Gemini response JSON")?;

        parsed.into_text()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    const ENDPOINT: &str = "/v1beta/models/test-model:generateContent";

    fn backend(server: &MockServer) -> GeminiBackend {
        GeminiBackend::new("TEST_KEY")
            .with_model("test-model")
            .with_base_url(server.uri())
    }

    fn candidate_with_text(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn returns_candidate_text_and_sends_schema() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .and(header("x-goog-api-key", "TEST_KEY"))
            .and(body_partial_json(json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "OBJECT" }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_with_text(
                r#"{"city":"London"}"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let prompt = WeatherPrompt::build("London").expect("non-empty");
        let text = backend(&server).generate(&prompt).await.expect("success");

        assert_eq!(text, r#"{"city":"London"}"#);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let prompt = WeatherPrompt::build("London").expect("non-empty");
        let err = backend(&server).generate(&prompt).await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("403"), "{msg}");
        assert!(msg.contains("API key not valid"), "{msg}");
    }

    #[tokio::test]
    async fn blocked_prompt_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let prompt = WeatherPrompt::build("London").expect("non-empty");
        let err = backend(&server).generate(&prompt).await.unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_text_is_an_error() {
        let resp: GenerateResponse =
            serde_json::from_value(candidate_with_text("  ")).expect("valid shape");
        let err = resp.into_text().unwrap_err();
        assert!(err.to_string().contains("finish reason: STOP"));
    }

    #[test]
    fn parts_are_concatenated() {
        let resp: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] } }]
        }))
        .expect("valid shape");
        assert_eq!(resp.into_text().expect("text"), "{\"a\":1}");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let b = GeminiBackend::new("k")
            .with_model("m")
            .with_base_url("http://localhost:1234/");
        assert_eq!(
            b.endpoint(),
            "http://localhost:1234/v1beta/models/m:generateContent"
        );
    }
}
