//! Runtime configuration.
//!
//! Values come from CLI flags first, then the environment (a `.env` file
//! is loaded into it at startup), then the defaults below.

use std::str::FromStr;

use crate::error::{RelayError, Result};

/// Environment variable holding the provider credential
pub const API_TOKEN_ENV: &str = "COHERE_API_TOKEN";

/// Environment variable overriding the provider base URL
pub const BASE_URL_ENV: &str = "COHERE_BASE_URL";

/// Environment variable overriding the model identifier
pub const MODEL_ENV: &str = "RELAY_MODEL";

/// Cohere API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.cohere.com";

pub const DEFAULT_MODEL: &str = "command-r-plus-08-2024";

/// Which request shapes the relay accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationPolicy {
    /// At least one of `text` or `prompt` must be present
    #[default]
    Strict,
    /// `text` is mandatory, `prompt` falls back to a default instruction
    TextRequired,
}

impl FromStr for ValidationPolicy {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationPolicy::Strict),
            "text-required" | "text_required" | "loose" => Ok(ValidationPolicy::TextRequired),
            other => Err(RelayError::Config(format!(
                "unknown validation policy '{}' (expected strict or text-required)",
                other
            ))),
        }
    }
}

/// Provider connection settings
#[derive(Debug, Clone)]
pub struct CohereConfig {
    pub base_url: String,
    pub api_token: String,
}

impl Default for CohereConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: String::new(),
        }
    }
}

impl CohereConfig {
    /// Read the credential and base URL from the environment.
    ///
    /// A missing token is not an error: the provider rejects the call and
    /// the caller sees the credential message.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source (process env, parsed `.env` file).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: lookup(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_token: lookup(API_TOKEN_ENV).unwrap_or_default(),
        }
    }

    /// Ensure the base URL parses as an absolute http(s) URL.
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| RelayError::Config(format!("invalid base URL '{}': {}", self.base_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(RelayError::Config(format!(
                "unsupported base URL scheme '{}'",
                scheme
            ))),
        }
    }
}

/// Settings the request handler needs
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub model: String,
    pub policy: ValidationPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            policy: ValidationPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<ValidationPolicy>().ok(), Some(ValidationPolicy::Strict));
        assert_eq!(
            "Text-Required".parse::<ValidationPolicy>().ok(),
            Some(ValidationPolicy::TextRequired)
        );
        assert!("lenient".parse::<ValidationPolicy>().is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(CohereConfig::default().validate().is_ok());

        let bad = CohereConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let ftp = CohereConfig {
            base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(ftp.validate().is_err());
    }

    #[test]
    fn test_from_dotenv_contents() {
        let contents = "# local secrets\nCOHERE_API_TOKEN=abc123\nOTHER=1\n";
        let vars: HashMap<String, String> = dotenvy::from_read_iter(contents.as_bytes())
            .collect::<std::result::Result<_, _>>()
            .expect("parse .env");

        let config = CohereConfig::from_lookup(|key| vars.get(key).cloned());
        assert_eq!(config.api_token, "abc123");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_from_lookup_missing_token() {
        let config = CohereConfig::from_lookup(|_| None);
        assert!(config.api_token.is_empty());
    }

    #[test]
    fn test_relay_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.policy, ValidationPolicy::Strict);
    }
}
