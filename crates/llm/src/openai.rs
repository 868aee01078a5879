//! OpenAI chat-completions client.

use std::time::Duration;

use async_trait::async_trait;
use pipeline::{CompletionRequest, LlmProvider, ProviderError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use web::http::{build_client, request_error, success_text};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// ── Response types ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the first choice's text from a chat-completions response body.
pub(crate) fn parse_response(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(format!("openai response: {e}")))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::InvalidResponse("openai response has no content".into()))
}

// ── Client ───────────────────────────────────────────────────────────

pub struct OpenAiProvider {
    http: Client,
    api_key: String,
    model: String,
    label: String,
    base_url: String,
    max_tokens: u32,
    timeout: Duration,
}

impl OpenAiProvider {
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
            label: format!("openai:{model}"),
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
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.label
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
            max_tokens: self.max_tokens,
        };

        debug!(model = %self.model, prompt_chars = request.prompt.len(), "openai completion");
        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_error(e, self.timeout))?;

        parse_response(&success_text(resp, self.timeout).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_text() {
        let body = concat!(
            r#"{"choices":[{"message":{"role":"assistant","content":"hello"}},"#,
            r#"{"message":{"content":"ignored"}}]}"#
        );
        assert_eq!(parse_response(body).unwrap(), "hello");
    }

    #[test]
    fn empty_choices_is_invalid() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn malformed_json_is_invalid() {
        assert!(matches!(
            parse_response("<html>bad gateway</html>"),
            Err(ProviderError::InvalidResponse(_))
        ));
    }
}
