//! LLM Client: the single point of entry for all Gemini API calls in the planner.
//!
//! ARCHITECTURAL RULE: No other module may call the provider directly.
//! Callers depend on the `ChatModel` trait; `GeminiClient` is the production backend.
//!
//! Model: gemini-1.5-pro (hardcoded, do not make configurable to prevent drift)
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub mod prompts;

pub use prompts::{Prompt, Role};

/// The model used for all LLM calls in the planner.
pub const MODEL: &str = "gemini-1.5-pro";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Displays as e.g. `401 Unauthorized: API key not valid`.
    #[error("{status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no API credential configured (set GOOGLE_API_KEY)")]
    MissingCredential,

    #[error("prompt blocked by provider: {0}")]
    Blocked(String),
}

/// A hosted chat model that answers a two-message prompt with free text.
///
/// `Ok(None)` means the provider answered but produced no text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<Option<String>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

impl<'a> GenerateContentRequest<'a> {
    fn from_prompt(prompt: &'a Prompt) -> Self {
        let mut system_parts = Vec::new();
        let mut contents = Vec::new();
        for message in prompt.messages() {
            match message.role {
                Role::System => system_parts.push(GeminiPart {
                    text: message.content,
                }),
                Role::User => contents.push(GeminiContent {
                    role: Some("user"),
                    parts: vec![GeminiPart {
                        text: message.content,
                    }],
                }),
            }
        }
        Self {
            system_instruction: GeminiContent {
                role: None,
                parts: system_parts,
            },
            contents,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    /// Returns `None` when there is no candidate or the text is blank.
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn block_reason(&self) -> Option<&str> {
        if !self.candidates.is_empty() {
            return None;
        }
        self.prompt_feedback.as_ref()?.block_reason.as_deref()
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// Gemini `generateContent` client. Single attempt per call, no retries.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Self::new(
            config.google_api_key.clone(),
            config.gemini_api_base.clone(),
            config.llm_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            MODEL
        )
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(&self, prompt: &Prompt) -> Result<GenerateContentResponse, LlmError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(LlmError::MissingCredential)?;

        let request_body = GenerateContentRequest::from_prompt(prompt);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Prefer the provider's own error message when the body is parseable
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api { status, message });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(parsed)
    }
}

#[async_trait]
impl ChatModel for GeminiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<Option<String>, LlmError> {
        let response = self.call(prompt).await?;
        if let Some(reason) = response.block_reason() {
            return Err(LlmError::Blocked(reason.to_string()));
        }
        let text = response.text();
        if text.is_none() {
            let finish_reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.as_deref())
                .unwrap_or("none");
            debug!("LLM returned no text (finish_reason={finish_reason})");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const ENDPOINT: &str = "/v1beta/models/gemini-1.5-pro:generateContent";

    fn client_for(server: &MockServer, key: Option<&str>) -> GeminiClient {
        GeminiClient::new(
            key.map(str::to_string),
            server.base_url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn sample_prompt() -> Prompt {
        Prompt::new("You are a travel assistant.", "Plan a trip from Pune to Goa.")
    }

    #[test]
    fn test_request_puts_system_in_system_instruction() {
        let prompt = sample_prompt();
        let body = serde_json::to_value(GenerateContentRequest::from_prompt(&prompt)).unwrap();
        assert_eq!(
            body,
            json!({
                "systemInstruction": {"parts": [{"text": "You are a travel assistant."}]},
                "contents": [{"role": "user", "parts": [{"text": "Plan a trip from Pune to Goa."}]}]
            })
        );
    }

    #[test]
    fn test_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "## Train\n"}, {"text": "8 hours"}]}},
                {"content": {"role": "model", "parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("## Train\n8 hours"));
    }

    #[test]
    fn test_text_is_none_for_blank_output() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [{"text": "  \n"}]}, "finishReason": "STOP"}]
        }))
        .unwrap();
        assert!(response.text().is_none());
    }

    #[tokio::test]
    async fn test_complete_returns_model_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(ENDPOINT)
                    .header("x-goog-api-key", "test-key")
                    .json_body_partial(
                        r#"{"contents": [{"role": "user", "parts": [{"text": "Plan a trip from Pune to Goa."}]}]}"#,
                    );
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {"role": "model", "parts": [{"text": "Take the overnight bus."}]},
                        "finishReason": "STOP"
                    }],
                    "usageMetadata": {"promptTokenCount": 40, "candidatesTokenCount": 6}
                }));
            })
            .await;

        let client = client_for(&server, Some("test-key"));
        let text = client.complete(&sample_prompt()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(text.as_deref(), Some("Take the overnight bus."));
    }

    #[tokio::test]
    async fn test_complete_maps_error_status_and_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(401).json_body(json!({
                    "error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}
                }));
            })
            .await;

        let client = client_for(&server, Some("bad-key"));
        let err = client.complete(&sample_prompt()).await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status, .. } if status == StatusCode::UNAUTHORIZED));
        assert_eq!(err.to_string(), "401 Unauthorized: API key not valid");
    }

    #[tokio::test]
    async fn test_complete_keeps_raw_body_when_error_is_unparseable() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(503).body("upstream overloaded");
            })
            .await;

        let client = client_for(&server, Some("test-key"));
        let err = client.complete(&sample_prompt()).await.unwrap_err();

        assert_eq!(err.to_string(), "503 Service Unavailable: upstream overloaded");
    }

    #[tokio::test]
    async fn test_complete_returns_none_without_candidates() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200).json_body(json!({"candidates": []}));
            })
            .await;

        let client = client_for(&server, Some("test-key"));
        assert!(client.complete(&sample_prompt()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_complete_reports_blocked_prompt() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200)
                    .json_body(json!({"promptFeedback": {"blockReason": "SAFETY"}}));
            })
            .await;

        let client = client_for(&server, Some("test-key"));
        let err = client.complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::Blocked(ref reason) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200).json_body(json!({"candidates": []}));
            })
            .await;

        let client = client_for(&server, None);
        let err = client.complete(&sample_prompt()).await.unwrap_err();

        assert!(matches!(err, LlmError::MissingCredential));
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_timeout_surfaces_as_http_error_and_failed_suggestion() {
        use crate::planner::fetcher::{SuggestionFetcher, FETCH_ERROR_PREFIX};
        use crate::planner::models::TripRequest;
        use chrono::NaiveDate;
        use std::sync::Arc;

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(ENDPOINT);
                then.status(200)
                    .delay(Duration::from_secs(2))
                    .json_body(json!({"candidates": []}));
            })
            .await;

        let client = GeminiClient::new(
            Some("test-key".to_string()),
            server.base_url(),
            Duration::from_millis(100),
        )
        .unwrap();

        let err = client.complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(ref e) if e.is_timeout()));

        let fetcher = SuggestionFetcher::new(Arc::new(client));
        let request = TripRequest {
            origin: "Pune".to_string(),
            destination: "Goa".to_string(),
            travel_date: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        };
        let suggestion = fetcher.fetch(&request).await;

        assert_eq!(suggestion.kind(), "failed");
        assert!(suggestion.into_text().starts_with(FETCH_ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_unreachable_provider_surfaces_as_http_error() {
        // Reserve a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = GeminiClient::new(
            Some("test-key".to_string()),
            format!("http://{addr}"),
            Duration::from_secs(5),
        )
        .unwrap();

        let err = client.complete(&sample_prompt()).await.unwrap_err();
        assert!(matches!(err, LlmError::Http(ref e) if e.is_connect()));
    }
}
