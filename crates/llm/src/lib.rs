//! Research agent LLM provider infrastructure adapter.
//!
//! Implements the [`pipeline::LlmProvider`] trait for OpenAI's chat-completions
//! API and Anthropic's messages API. Additional providers are added as new
//! modules in this crate without any changes to the `pipeline` crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request formatting and response parsing live here;
//! transport and error mapping come from `web::http`. The [`pipeline`] crate
//! sees only [`pipeline::LlmProvider`].
//!
//! ## Provider selection
//!
//! [`build_provider`] resolves an [`LlmConfig`] plus the credentials found in
//! the environment. When no provider is named, OpenAI is used if an OpenAI key
//! is available and Anthropic otherwise. A missing key is a
//! [`pipeline::PipelineError::Configuration`]: the run never starts.

use std::sync::Arc;
use std::time::Duration;

use pipeline::{LlmProvider, PipelineError};
use serde::{Deserialize, Serialize};
use tracing::info;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// Default model when OpenAI is selected.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4-turbo-preview";
/// Default model when Anthropic is selected.
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-sonnet-20240229";

/// Which hosted API to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    /// Environment variable conventionally holding this provider's key.
    pub fn key_variable(self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

/// The `[llm]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// `None` picks by available credentials.
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    /// Overrides the key taken from the environment.
    pub api_key: Option<String>,
    /// Alternative API root, e.g. a proxy or a compatible local server.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            api_key: None,
            base_url: None,
            timeout_secs: 120,
            max_tokens: 4096,
        }
    }
}

/// API keys found in the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
}

impl Credentials {
    /// Reads `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`, ignoring blank values.
    pub fn from_env() -> Self {
        let read = |kind: ProviderKind| {
            std::env::var(kind.key_variable())
                .ok()
                .filter(|v| !v.trim().is_empty())
        };
        Self {
            openai: read(ProviderKind::OpenAi),
            anthropic: read(ProviderKind::Anthropic),
        }
    }

    fn for_kind(&self, kind: ProviderKind) -> Option<&String> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
        }
    }
}

/// Provider, model, and key after applying defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLlm {
    pub kind: ProviderKind,
    pub model: String,
    pub api_key: String,
}

/// Applies provider-selection and credential rules without building a client.
pub fn resolve(
    config: &LlmConfig,
    credentials: &Credentials,
) -> Result<ResolvedLlm, PipelineError> {
    let kind = config.provider.unwrap_or(if credentials.openai.is_some() {
        ProviderKind::OpenAi
    } else {
        ProviderKind::Anthropic
    });

    let api_key = config
        .api_key
        .as_ref()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| credentials.for_kind(kind))
        .cloned()
        .ok_or_else(|| {
            PipelineError::configuration(format!(
                "{} not found: set it in the environment or configure llm.api_key",
                kind.key_variable()
            ))
        })?;

    let model = config.model.clone().unwrap_or_else(|| {
        match kind {
            ProviderKind::OpenAi => DEFAULT_OPENAI_MODEL,
            ProviderKind::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
        .to_string()
    });

    Ok(ResolvedLlm {
        kind,
        model,
        api_key,
    })
}

/// Builds the configured language-model provider.
pub fn build_provider(
    config: &LlmConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn LlmProvider>, PipelineError> {
    let ResolvedLlm {
        kind,
        model,
        api_key,
    } = resolve(config, credentials)?;
    let timeout = Duration::from_secs(config.timeout_secs);
    let base_url = config.base_url.clone();
    let max_tokens = config.max_tokens;
    info!(provider = ?kind, model = %model, "language model configured");

    let provider: Arc<dyn LlmProvider> = match kind {
        ProviderKind::OpenAi => Arc::new(
            OpenAiProvider::new(api_key, model, base_url, max_tokens, timeout)
                .map_err(|e| PipelineError::configuration(e.to_string()))?,
        ),
        ProviderKind::Anthropic => Arc::new(
            AnthropicProvider::new(api_key, model, base_url, max_tokens, timeout)
                .map_err(|e| PipelineError::configuration(e.to_string()))?,
        ),
    };
    Ok(provider)
}
