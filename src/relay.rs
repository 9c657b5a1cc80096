//! Prompt relay: request validation, the `/api/llm` handler and router.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::chat::{ChatClient, ChatRequest};
use crate::config::{RelayConfig, ValidationPolicy};
use crate::error::{RelayError, Result};
use crate::prompt::build_prompt;

pub const MISSING_INPUT_MESSAGE: &str = "Please provide a custom prompt or some text to process.";

pub const MISSING_TEXT_MESSAGE: &str = "Please provide some text to process.";

/// Request body for `POST /api/llm`
///
/// Numbers and `true` are accepted and rendered as text; `null`, `false`
/// and zero count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub prompt: Option<String>,
}

fn scalar_as_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok((n.as_f64() != Some(0.0)).then(|| n.to_string())),
        Some(Value::Array(_)) => Err(de::Error::custom("expected a string, found an array")),
        Some(Value::Object(_)) => Err(de::Error::custom("expected a string, found an object")),
    }
}

impl GenerateRequest {
    /// Parse a request body. The content type is not checked.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| RelayError::Validation(format!("Invalid request body: {}", e)))
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.is_empty())
    }

    /// Check the payload against `policy`.
    pub fn validate(&self, policy: ValidationPolicy) -> Result<()> {
        match policy {
            ValidationPolicy::Strict if self.text().is_none() && self.prompt().is_none() => {
                Err(RelayError::Validation(MISSING_INPUT_MESSAGE.to_string()))
            }
            ValidationPolicy::TextRequired if self.text().is_none() => {
                Err(RelayError::Validation(MISSING_TEXT_MESSAGE.to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Successful response body
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// Shared state: one chat client for the life of the process.
pub struct AppState {
    pub client: Arc<dyn ChatClient>,
    pub config: RelayConfig,
}

impl AppState {
    pub fn new(client: Arc<dyn ChatClient>, config: RelayConfig) -> Self {
        Self { client, config }
    }
}

/// Validate, build the prompt, make one chat call, return the text.
pub async fn relay(
    client: &dyn ChatClient,
    config: &RelayConfig,
    req: &GenerateRequest,
) -> Result<String> {
    if let Err(e) = req.validate(config.policy) {
        warn!(error = %e, policy = ?config.policy, "Rejected request");
        return Err(e);
    }

    let prompt = build_prompt(req.text(), req.prompt());
    let chat_request = ChatRequest::single_user(config.model.as_str(), prompt);

    let reply = client.complete(&chat_request).await.map_err(|e| {
        error!(error = %e, model = %config.model, "Chat completion failed");
        RelayError::from(e)
    })?;

    reply.into_text().ok_or_else(|| {
        error!(model = %config.model, "Chat completion returned no content");
        RelayError::EmptyResponse
    })
}

/// `POST /api/llm`
pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<GenerateResponse>> {
    let req = GenerateRequest::from_body(&body).inspect_err(|e| {
        warn!(error = %e, "Rejected request body");
    })?;

    info!(
        has_text = req.text().is_some(),
        has_prompt = req.prompt().is_some(),
        "Generate request"
    );

    let text = relay(state.client.as_ref(), &state.config, &req).await?;
    Ok(Json(GenerateResponse { text }))
}

/// Health check endpoint
async fn health_handler() -> &'static str {
    "OK"
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/llm", post(generate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: Option<&str>, prompt: Option<&str>) -> GenerateRequest {
        GenerateRequest {
            text: text.map(String::from),
            prompt: prompt.map(String::from),
        }
    }

    #[test]
    fn test_strict_validation() {
        let policy = ValidationPolicy::Strict;
        assert!(request(None, None).validate(policy).is_err());
        assert!(request(Some(""), Some("")).validate(policy).is_err());
        assert!(request(Some("foo"), None).validate(policy).is_ok());
        assert!(request(None, Some("bar")).validate(policy).is_ok());
    }

    #[test]
    fn test_from_body_scalars() {
        let req = GenerateRequest::from_body(br#"{"text": 5, "prompt": "x"}"#).expect("parse");
        assert_eq!(req.text.as_deref(), Some("5"));

        let req = GenerateRequest::from_body(br#"{"text": 0, "prompt": null}"#).expect("parse");
        assert!(req.text.is_none());
        assert!(req.prompt.is_none());

        assert!(GenerateRequest::from_body(br#"{"text": ["a"]}"#).is_err());
        assert!(GenerateRequest::from_body(br#""just a string""#).is_err());
        assert!(GenerateRequest::from_body(b"").is_err());
    }

    #[test]
    fn test_text_required_validation() {
        let policy = ValidationPolicy::TextRequired;
        let err = request(None, Some("bar")).validate(policy).expect_err("text missing");
        assert_eq!(err.to_string(), MISSING_TEXT_MESSAGE);
        assert!(request(Some("foo"), None).validate(policy).is_ok());
    }
}
