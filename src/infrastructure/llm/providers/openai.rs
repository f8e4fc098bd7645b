//! OpenAI-compatible API provider
//!
//! Supports OpenAI, Groq, XAI, DeepAI, Zai and other OpenAI-compatible APIs

use serde::{Deserialize, Serialize};

use super::{ProviderConfig, error_detail, http_client};
use crate::infrastructure::llm::{Context, Error, Response, TokenUsage};

const PROVIDER: &str = "openai";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Execute a chat request using OpenAI-compatible API
pub async fn chat(config: ProviderConfig, context: Context) -> Result<Response, Error> {
    let base_url = config
        .base_url
        .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
    let model = context.model.unwrap_or_else(|| {
        if config.default_model.is_empty() {
            "gpt-4o-mini".to_string()
        } else {
            config.default_model.clone()
        }
    });

    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));

    let request = OpenAIRequest {
        model: model.clone(),
        messages: context
            .messages
            .into_iter()
            .map(|msg| OpenAIMessage {
                role: msg.role.as_str().to_string(),
                content: msg.content,
            })
            .collect(),
        temperature: context.temperature,
        max_tokens: context.max_tokens,
    };

    let mut request_builder = http_client(PROVIDER)?
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.api_key))
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

    let openai_response: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new(PROVIDER, format!("Failed to parse response: {}", e)))?;

    let Some(choice) = openai_response.choices.into_iter().next() else {
        return Err(Error::new(PROVIDER, "No choices in response"));
    };

    let usage = openai_response
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(Response {
        content: choice.message.content.unwrap_or_default(),
        model: if openai_response.model.is_empty() {
            model
        } else {
            openai_response.model
        },
        usage,
    })
}
