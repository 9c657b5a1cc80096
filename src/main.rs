//! promptrelay - LLM prompt relay
//!
//! ## Usage
//!
//! ### HTTP Server Mode
//! ```bash
//! COHERE_API_TOKEN=... promptrelay serve --port 3000
//! ```
//!
//! `COHERE_API_TOKEN` may also be set in a `.env` file in the working
//! directory.
//!
//! ### CLI Mode
//! ```bash
//! promptrelay generate --text "teh quick fox" --prompt "fix the typos"
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use promptrelay::{
    cohere::CohereClient,
    config::{
        CohereConfig, RelayConfig, ValidationPolicy, API_TOKEN_ENV, BASE_URL_ENV, DEFAULT_BASE_URL,
        DEFAULT_MODEL, MODEL_ENV,
    },
    relay::{self, AppState, GenerateRequest},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Relay prompts to an LLM chat-completion API
#[derive(Parser)]
#[command(name = "promptrelay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run as HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },

    /// Run a single prompt and print the generated text
    Generate {
        /// Selected text to rewrite
        #[arg(long)]
        text: Option<String>,

        /// Instruction for the model
        #[arg(long)]
        prompt: Option<String>,

        #[command(flatten)]
        upstream: UpstreamArgs,
    },
}

#[derive(Args)]
struct UpstreamArgs {
    /// Model identifier
    #[arg(long, env = MODEL_ENV, default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat API base URL
    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// API token
    #[arg(long, env = API_TOKEN_ENV, default_value = "", hide_env_values = true)]
    api_token: String,

    /// Validation policy: strict (text or prompt) or text-required
    #[arg(long, default_value = "strict", value_parser = parse_policy)]
    policy: ValidationPolicy,
}

impl UpstreamArgs {
    fn split(self) -> (CohereConfig, RelayConfig) {
        (
            CohereConfig {
                base_url: self.base_url,
                api_token: self.api_token,
            },
            RelayConfig {
                model: self.model,
                policy: self.policy,
            },
        )
    }
}

fn parse_policy(s: &str) -> std::result::Result<ValidationPolicy, String> {
    s.parse().map_err(|e: promptrelay::RelayError| e.to_string())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so clap's env fallbacks see it
    let env_file = dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if let Some(path) = env_file {
        debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Serve {
            port,
            host,
            upstream,
        } => run_server(host, port, upstream).await,
        Commands::Generate {
            text,
            prompt,
            upstream,
        } => run_generate(text, prompt, upstream).await,
    }
}

// ============================================================================
// CLI Mode
// ============================================================================

async fn run_generate(
    text: Option<String>,
    prompt: Option<String>,
    upstream: UpstreamArgs,
) -> Result<()> {
    let (cohere_config, relay_config) = upstream.split();
    let client = CohereClient::new(&cohere_config).context("Failed to create chat client")?;

    let req = GenerateRequest { text, prompt };
    let generated = relay::relay(&client, &relay_config, &req).await?;

    println!("{}", generated);
    Ok(())
}

// ============================================================================
// HTTP Server
// ============================================================================

async fn run_server(host: String, port: u16, upstream: UpstreamArgs) -> Result<()> {
    let (cohere_config, relay_config) = upstream.split();

    info!(
        host = %host,
        port = port,
        model = %relay_config.model,
        policy = ?relay_config.policy,
        "Starting HTTP server"
    );

    let client = CohereClient::new(&cohere_config).context("Failed to create chat client")?;
    let app_state = Arc::new(AppState::new(Arc::new(client), relay_config));
    let app = relay::router(app_state);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid host:port")?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
