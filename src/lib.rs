//! # promptrelay
//!
//! Forwards user-supplied text to an LLM chat-completion API and returns
//! the generated text as JSON.
//!
//! ## Modules
//!
//! - [`relay`] - `POST /api/llm` handler, validation and router
//! - [`prompt`] - Prompt templates
//! - [`chat`] - `ChatClient` trait and message types
//! - [`cohere`] - Cohere v2 chat client
//! - [`config`] - Runtime configuration
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use promptrelay::{cohere::CohereClient, config::{CohereConfig, RelayConfig}, relay};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = CohereClient::new(&CohereConfig::from_env())?;
//!     let state = Arc::new(relay::AppState::new(Arc::new(client), RelayConfig::default()));
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//!     axum::serve(listener, relay::router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod cohere;
pub mod config;
pub mod error;
pub mod prompt;
pub mod relay;

pub use error::{RelayError, Result};
