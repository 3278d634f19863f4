//! Gemini `generateContent` client.

use super::{GenerationOptions, Generator};
use crate::error::{DataCommitError, Result};
use crate::openai::{http_client, DEFAULT_TIMEOUT_SECS};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

/// Default REST endpoint for the Gemini API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Generator backed by the Gemini REST API.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        Ok(Self {
            client: http_client(Duration::from_secs(DEFAULT_TIMEOUT_SECS))?,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a generator using the key from `GEMINI_API_KEY`.
    pub fn from_env(model: &str) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DataCommitError::Config(format!("{} is not set", API_KEY_ENV)))?;
        Self::new(&api_key, model)
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl Generator for GeminiGenerator {
    #[instrument(skip(self, prompt, options), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str, options: &GenerationOptions) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: options.temperature,
                top_p: options.top_p,
                thinking_config: options
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataCommitError::Generation(format!(
                "Gemini API returned {}: {}",
                status, body
            )));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        let text = parsed
            .text()
            .ok_or_else(|| DataCommitError::Generation("Empty response from Gemini".to_string()))?;

        debug!("Generated {} characters", text.len());
        Ok(text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(text: &str) -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]}
            }]
        })
    }

    #[tokio::test]
    async fn test_request_shape() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "secret"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "Soru?"}]}],
                "generationConfig": {
                    "temperature": 0.5,
                    "thinkingConfig": {"thinkingBudget": 0}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Cevap")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new("secret", "gemini-test")
            .unwrap()
            .with_base_url(&server.uri());

        let text = generator
            .generate("Soru?", &GenerationOptions::default())
            .await
            .unwrap();
        assert_eq!(text, "Cevap");
    }

    #[tokio::test]
    async fn test_top_p_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "generationConfig": {"temperature": 0.25, "topP": 0.5}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new("k", "m").unwrap().with_base_url(&server.uri());
        let options = GenerationOptions {
            temperature: 0.25,
            top_p: Some(0.5),
            thinking_budget: None,
        };

        assert_eq!(generator.generate("x", &options).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new("k", "m").unwrap().with_base_url(&server.uri());
        let err = generator
            .generate("x", &GenerationOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, DataCommitError::Generation(_)));
        assert!(err.to_string().contains("quota"));
    }

    #[tokio::test]
    async fn test_empty_candidates_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let generator = GeminiGenerator::new("k", "m").unwrap().with_base_url(&server.uri());
        assert!(generator
            .generate("x", &GenerationOptions::default())
            .await
            .is_err());
    }

    #[test]
    fn test_multi_part_text_is_joined() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "a"}, {"text": "b"}]}}]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("ab"));
    }
}
