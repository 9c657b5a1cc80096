//! Chat-completion client abstraction.
//!
//! The relay only needs "send these messages to this model, give me the
//! text back". Providers implement [`ChatClient`]; the HTTP layer holds one
//! long-lived instance behind an `Arc<dyn ChatClient>`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single chat-completion call
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// One user message, which is all the relay ever sends.
    pub fn single_user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(prompt)],
        }
    }
}

/// What the provider generated. `content` is `None` when nothing came back.
#[derive(Debug, Clone, Default)]
pub struct ChatReply {
    pub content: Option<String>,
}

impl ChatReply {
    /// Generated text, if any was produced.
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    pub fn into_text(self) -> Option<String> {
        self.content.filter(|c| !c.is_empty())
    }
}

/// Failures of a chat-completion call
#[derive(Debug, Error)]
pub enum ChatError {
    /// Credential rejected by the provider
    #[error("invalid API key: {0}")]
    Unauthorized(String),

    /// Request did not complete in time
    #[error("request timeout")]
    Timeout,

    /// Provider returned a non-success status
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body did not have the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Anything else a provider wants to surface verbatim
    #[error("{0}")]
    Other(String),
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send `request` and return the generated content.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}
