//! Drafting oracles: whatever turns a prompt into plan text.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{OrionError, Result};

/// Chat completions endpoint used when an API key is configured.
pub const OPENAI_CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Base URL of the self-hosted OpenAI-compatible server.
pub const DEFAULT_VLLM_BASE_URL: &str = "http://vllm:8000/v1";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Prompt handed to an oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OraclePrompt {
    pub system: String,
    pub user: String,
}

/// Why an oracle produced no text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Transport(String),
    #[error("Oracle returned HTTP {status}")]
    Status { status: u16 },
    #[error("Oracle returned an unreadable response: {0}")]
    InvalidResponse(String),
    #[error("No drafting oracle configured")]
    Disabled,
}

/// Produces free text that should contain a JSON plan object.
///
/// The text is untrusted; the drafter extracts and validates it.
#[async_trait]
pub trait DraftingOracle: Send + Sync {
    async fn complete(&self, prompt: &OraclePrompt) -> std::result::Result<String, OracleError>;
}

/// Oracle that always declines, so every draft uses the fallback plan.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledOracle;

#[async_trait]
impl DraftingOracle for DisabledOracle {
    async fn complete(&self, _prompt: &OraclePrompt) -> std::result::Result<String, OracleError> {
        Err(OracleError::Disabled)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct ChatCompletionsOracle {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl fmt::Debug for ChatCompletionsOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionsOracle")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("authenticated", &self.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsOracle {
    /// Creates an unauthenticated client for the given completions URL.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::Configuration` if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrionError::configuration(format!("Failed to build oracle client: {e}")))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Hosted OpenAI with bearer authentication.
    ///
    /// # Errors
    ///
    /// As [`ChatCompletionsOracle::new`].
    pub fn openai(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::new(OPENAI_CHAT_COMPLETIONS_URL, timeout)?.with_api_key(api_key))
    }

    /// Self-hosted server at `<base_url>/chat/completions`.
    ///
    /// # Errors
    ///
    /// As [`ChatCompletionsOracle::new`].
    pub fn vllm(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::new(
            format!("{}/chat/completions", base_url.trim_end_matches('/')),
            timeout,
        )
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl DraftingOracle for ChatCompletionsOracle {
    async fn complete(&self, prompt: &OraclePrompt) -> std::result::Result<String, OracleError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Requesting plan draft from {} ({})", self.endpoint, self.model);
        let response = request
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status {
                status: status.as_u16(),
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))?;

        Ok(reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn prompt() -> OraclePrompt {
        OraclePrompt {
            system: "system text".into(),
            user: "user text".into(),
        }
    }

    #[tokio::test]
    async fn test_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 1000,
                "messages": [
                    { "role": "system", "content": "system text" },
                    { "role": "user", "content": "user text" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"steps\":[]}" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let oracle =
            ChatCompletionsOracle::vllm(&format!("{}/v1/", server.uri()), Duration::from_secs(5)).unwrap();
        assert_eq!(oracle.complete(&prompt()).await.unwrap(), "{\"steps\":[]}");
    }

    #[tokio::test]
    async fn test_sends_bearer_token_when_keyed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let oracle = ChatCompletionsOracle::new(server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_api_key("sk-test");
        assert_eq!(oracle.complete(&prompt()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let oracle = ChatCompletionsOracle::new(server.uri(), Duration::from_secs(5)).unwrap();
        assert_eq!(
            oracle.complete(&prompt()).await,
            Err(OracleError::Status { status: 429 })
        );
    }

    #[tokio::test]
    async fn test_slow_server_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "choices": [] }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let oracle = ChatCompletionsOracle::new(server.uri(), Duration::from_millis(50)).unwrap();
        assert!(matches!(
            oracle.complete(&prompt()).await,
            Err(OracleError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_disabled_oracle_declines() {
        assert_eq!(DisabledOracle.complete(&prompt()).await, Err(OracleError::Disabled));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let oracle = ChatCompletionsOracle::openai("sk-secret", Duration::from_secs(1)).unwrap();
        let debug = format!("{oracle:?}");
        assert!(!debug.contains("sk-secret"));
        assert_eq!(oracle.endpoint(), OPENAI_CHAT_COMPLETIONS_URL);
    }
}
