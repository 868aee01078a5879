//! Anthropic messages client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{CompletionRequest, LlmProvider, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use web::http::{build_client, request_error, success_text};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Concatenates the text blocks of a messages response.
pub(crate) fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("anthropic response: {e}")))?;
    let text: String = parsed
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .map(|block| block.text)
        .collect();
    if text.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "anthropic response has no text content".into(),
        ));
    }
    Ok(text)
}

pub struct AnthropicProvider {
    http: Client,
    api_key: String,
    model: String,
    label: String,
    base_url: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicProvider {
    pub fn new(
        api_key: String,
        model: String,
        base_url: Option<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            http: build_client(timeout, web::DEFAULT_USER_AGENT)?,
            api_key,
            label: format!("anthropic:{model}"),
            model,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_tokens,
            timeout,
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(model = %self.model, prompt_chars = request.prompt.len(), "anthropic completion");
        let resp = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        parse_response(&success_text(resp, self.timeout).await?)
    }
}
