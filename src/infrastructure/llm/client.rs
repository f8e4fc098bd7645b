//! # LLM Client
//!
//! Provides the `Client` struct, the entry point for chat completions. It picks the
//! provider named in the generator config, resolves credentials per request and maps
//! failures into the engine's error taxonomy.

use async_trait::async_trait;

use crate::domain::config::GeneratorConfig;
use crate::domain::error::{CoreError, CoreResult};
use crate::domain::traits::LlmProvider;
use crate::infrastructure::llm::{Context, Provider, Response, providers};

/// Simple LLM client
#[derive(Debug, Clone)]
pub struct Client {
    config: GeneratorConfig,
}

impl Client {
    /// Create a new client from generator configuration
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Send a system directive and a user prompt to the configured provider.
    ///
    /// Credentials are resolved here rather than at construction so that switching to
    /// online mode without a key surfaces as `ServiceUnavailable` on the first request.
    pub async fn prompt(&self, system: &str, prompt: &str) -> CoreResult<Response> {
        let provider_type = Provider::from_name(&self.config.provider).ok_or_else(|| {
            CoreError::ServiceUnavailable(format!("Unknown provider '{}'", self.config.provider))
        })?;

        let provider_config = providers::ProviderConfig::from_generator_config(&self.config)?;

        let context = Context::new()
            .add_system_message(system)
            .add_user_message(prompt)
            .with_model(self.config.model.clone())
            .with_temperature(self.config.temperature)
            .with_max_tokens(self.config.max_tokens);

        let response = providers::chat(provider_type, provider_config, context)
            .await
            .map_err(|e| CoreError::RemoteError(e.to_string()))?;

        tracing::info!(
            "{} replied with {} chars ({} tokens)",
            response.model,
            response.content.len(),
            response.usage.total_tokens
        );
        Ok(response)
    }
}

#[async_trait]
impl LlmProvider for Client {
    async fn completion(&self, system: &str, user: &str) -> CoreResult<String> {
        self.prompt(system, user).await.map(|r| r.content)
    }
}
