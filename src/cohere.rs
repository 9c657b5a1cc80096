//! Cohere v2 chat client.
//!
//! One `reqwest::Client` is built at startup and reused for every request.
//! Status codes and transport failures are classified into [`ChatError`]
//! so the HTTP layer can pick the right message for the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::chat::{ChatClient, ChatError, ChatReply, ChatRequest};
use crate::config::CohereConfig;
use crate::error::{RelayError, Result};

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

const USER_AGENT: &str = concat!("promptrelay/", env!("CARGO_PKG_VERSION"));

/// Cohere v2 chat response structures
#[derive(Debug, Deserialize)]
struct CohereChatResponse {
    message: Option<CohereMessage>,
}

#[derive(Debug, Deserialize)]
struct CohereMessage {
    #[serde(default)]
    content: Vec<CohereContent>,
}

#[derive(Debug, Deserialize)]
struct CohereContent {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct CohereErrorBody {
    message: Option<String>,
}

/// Chat client for the Cohere v2 API
pub struct CohereClient {
    client: reqwest::Client,
    endpoint: String,
    api_token: String,
}

impl CohereClient {
    pub fn new(config: &CohereConfig) -> Result<Self> {
        Self::with_timeout(config, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Same as [`CohereClient::new`] with an explicit request timeout.
    pub fn with_timeout(config: &CohereConfig, timeout: Duration) -> Result<Self> {
        config.validate()?;

        if config.api_token.is_empty() {
            warn!("No API token configured; upstream calls will be rejected");
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| RelayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v2/chat", config.base_url.trim_end_matches('/')),
            api_token: config.api_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for CohereClient {
    async fn complete(&self, request: &ChatRequest) -> std::result::Result<ChatReply, ChatError> {
        debug!(model = %request.model, messages = request.messages.len(), "Sending chat request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = provider_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

            return Err(match status {
                reqwest::StatusCode::UNAUTHORIZED => ChatError::Unauthorized(message),
                reqwest::StatusCode::REQUEST_TIMEOUT | reqwest::StatusCode::GATEWAY_TIMEOUT => {
                    ChatError::Timeout
                }
                _ => ChatError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        let body = response.text().await.map_err(classify_transport_error)?;
        let reply = parse_chat_response(&body)?;

        debug!(has_content = reply.text().is_some(), "Chat response received");
        Ok(reply)
    }
}

fn classify_transport_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Network(e)
    }
}

/// Pull the `message` field out of an error body, if there is one.
fn provider_message(body: &str) -> Option<String> {
    serde_json::from_str::<CohereErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && !trimmed.starts_with('{')).then(|| trimmed.to_string())
        })
}

/// Concatenate the text parts of a chat response.
fn parse_chat_response(body: &str) -> std::result::Result<ChatReply, ChatError> {
    let parsed: CohereChatResponse = serde_json::from_str(body)
        .map_err(|e| ChatError::Decode(format!("Failed to parse chat response: {}", e)))?;

    let text: String = parsed
        .message
        .map(|m| {
            m.content
                .into_iter()
                .filter(|c| c.kind == "text")
                .map(|c| c.text)
                .collect()
        })
        .unwrap_or_default();

    Ok(ChatReply {
        content: (!text.is_empty()).then_some(text),
    })
}
