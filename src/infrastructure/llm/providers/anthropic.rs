//! Anthropic (Claude) provider
//!
//! System messages go into the top-level `system` field; the rest become text blocks.

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_detail, http_client};
use crate::infrastructure::llm::{Context, Error, MessageRole, Response, TokenUsage};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Anthropic API request format
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: String,
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Serialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    content_type: &'static str,
    text: String,
}

/// Anthropic API response format
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<AnthropicResponseContent>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Execute a chat request using Anthropic's API
pub async fn chat(config: ProviderConfig, context: Context) -> Result<Response, Error> {
    let base_url = config
        .base_url
        .unwrap_or_else(|| "https://api.anthropic.com".to_string());
    let model = context.model.unwrap_or_else(|| {
        if config.default_model.is_empty() {
            "claude-3-5-haiku-20241022".to_string()
        } else {
            config.default_model.clone()
        }
    });

    let url = format!("{}/v1/messages", base_url.trim_end_matches('/'));

    let mut system = Vec::new();
    let mut messages = Vec::new();
    for msg in context.messages {
        match msg.role {
            MessageRole::System => system.push(msg.content),
            MessageRole::User => messages.push(AnthropicMessage {
                role: msg.role.as_str().to_string(),
                content: vec![AnthropicContentBlock {
                    content_type: "text",
                    text: msg.content,
                }],
            }),
        }
    }

    let request = AnthropicRequest {
        model: model.clone(),
        max_tokens: context.max_tokens.unwrap_or(4096),
        messages,
        system: (!system.is_empty()).then(|| system.join("\n\n")),
        temperature: context.temperature,
    };

    let mut request_builder = http_client(PROVIDER)?
        .post(&url)
        .header("x-api-key", config.api_key)
        .header("anthropic-version", API_VERSION)
        .header("Content-Type", "application/json")
        .json(&request);

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    tracing::debug!("POST {} (model {})", url, model);

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new(PROVIDER, format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new(PROVIDER, error_detail(status, &error_text)));
    }

    let anthropic_response: AnthropicResponse = response
        .json()
        .await
        .map_err(|e| Error::new(PROVIDER, format!("Failed to parse response: {}", e)))?;

    let content: String = anthropic_response
        .content
        .into_iter()
        .filter(|block| block.content_type == "text")
        .map(|block| block.text)
        .collect();

    let usage = &anthropic_response.usage;
    Ok(Response {
        content,
        model: anthropic_response.model,
        usage: TokenUsage {
            prompt_tokens: usage.input_tokens,
            completion_tokens: usage.output_tokens,
            total_tokens: usage.input_tokens + usage.output_tokens,
        },
    })
}
