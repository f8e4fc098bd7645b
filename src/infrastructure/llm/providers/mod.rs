//! # LLM Providers
//!
//! Implementations for the supported chat APIs:
//! - OpenAI-compatible chat completions (OpenAI, Groq, XAI, DeepAI, Zai)
//! - Anthropic Messages API

mod anthropic;
mod openai;

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::Client;

use crate::domain::config::GeneratorConfig;
use crate::domain::error::{CoreError, CoreResult};
use crate::infrastructure::llm::{Context, Error, Provider, Response};

/// Default per-request timeout when the config sets none.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for a provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for non-default endpoints)
    pub base_url: Option<String>,
    /// Default model
    pub default_model: String,
    /// Timeout in seconds
    pub timeout: Option<u64>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve the credential: explicit `api_key`, else the env var named by `api_key_env`.
    /// A missing credential means the service is unavailable, not that a request failed.
    pub fn from_generator_config(config: &GeneratorConfig) -> CoreResult<Self> {
        let api_key = if let Some(key) = config.api_key.as_ref().filter(|k| !k.is_empty()) {
            key.clone()
        } else if let Some(env_var) = &config.api_key_env {
            match std::env::var(env_var) {
                Ok(key) if !key.trim().is_empty() => key,
                _ => {
                    return Err(CoreError::ServiceUnavailable(
                        crate::strings::messages::missing_api_key(env_var),
                    ));
                }
            }
        } else {
            return Err(CoreError::ServiceUnavailable(
                "No API key provided - set api_key or api_key_env".to_string(),
            ));
        };

        Ok(Self {
            api_key,
            base_url: config.endpoint.clone(),
            default_model: config.model.clone(),
            timeout: config.timeout,
        })
    }
}

/// HTTP client reused across requests
fn http_client(provider: &str) -> Result<&'static Client, Error> {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| Error::new(provider, format!("Failed to create HTTP client: {e}")))?;
    Ok(CLIENT.get_or_init(|| client))
}

/// Execute a chat request with the specified provider
pub async fn chat(
    provider: Provider,
    config: ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    match provider {
        Provider::OpenAI => openai::chat(config, context).await,
        Provider::Groq => {
            // Groq uses OpenAI-compatible API
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .unwrap_or_else(|| "https://api.groq.com/openai/v1".to_string()),
                ),
                ..config
            };
            openai::chat(config_with_url, context).await
        }
        Provider::XAI => {
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .unwrap_or_else(|| "https://api.x.ai/v1".to_string()),
                ),
                ..config
            };
            openai::chat(config_with_url, context).await
        }
        Provider::DeepAI => {
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .unwrap_or_else(|| "https://api.deepai.com/v1".to_string()),
                ),
                ..config
            };
            openai::chat(config_with_url, context).await
        }
        Provider::Zai => {
            let config_with_url = ProviderConfig {
                base_url: Some(
                    config
                        .base_url
                        .unwrap_or_else(|| "https://api.z.ai/api/coding/paas/v4".to_string()),
                ),
                ..config
            };
            openai::chat(config_with_url, context).await
        }
        Provider::Anthropic => anthropic::chat(config, context).await,
    }
}

/// Pull a readable message out of an error body, falling back to the raw text.
fn error_detail(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(error) = json.get("error")
    {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str());
        if let Some(message) = message {
            return match error.get("type").and_then(|t| t.as_str()) {
                Some(kind) => format!("HTTP {status}: {kind}: {message}"),
                None => format!("HTTP {status}: {message}"),
            };
        }
    }
    format!("HTTP {status}: {body}")
}
