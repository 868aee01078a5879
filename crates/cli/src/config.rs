//! Layered configuration.
//!
//! Priority, highest first:
//! 1. Command-line overrides
//! 2. Environment variables prefixed `RESEARCH_AGENT_` (`__` separates
//!    sections, e.g. `RESEARCH_AGENT_LLM__MODEL`)
//! 3. The config file: `--config <path>`, or `research-agent.toml` in the
//!    working directory when present
//! 4. Built-in defaults

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use llm::LlmConfig;
use pipeline::ResearchSettings;
use serde::{Deserialize, Serialize};
use storage::OutputConfig;
use web::{FetchConfig, SearchConfig};

pub const DEFAULT_CONFIG_FILE: &str = "research-agent.toml";
pub const ENV_PREFIX: &str = "RESEARCH_AGENT_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// The `[telemetry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// OTLP/gRPC collector, e.g. `http://localhost:4317`. Unset disables export.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub research: ResearchSettings,
    pub llm: LlmConfig,
    pub search: SearchConfig,
    pub fetch: FetchConfig,
    pub output: OutputConfig,
    pub telemetry: TelemetryConfig,
}

/// Values given on the command line; `None` leaves lower layers in charge.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    pub model: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file {0} does not exist")]
    MissingFile(PathBuf),

    #[error(transparent)]
    Invalid(#[from] Box<figment::Error>),
}

fn figment(config_file: Option<&Path>, overrides: &Overrides) -> Result<Figment, ConfigError> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

    match config_file {
        Some(path) if !path.exists() => return Err(ConfigError::MissingFile(path.to_path_buf())),
        Some(path) => figment = figment.merge(Toml::file(path)),
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.exists() {
                figment = figment.merge(Toml::file(local));
            }
        }
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(dir) = &overrides.output_dir {
        figment = figment.merge(Serialized::default("output.dir", dir));
    }
    if let Some(model) = &overrides.model {
        figment = figment.merge(Serialized::default("llm.model", model));
    }
    Ok(figment)
}

pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<AppConfig, ConfigError> {
    let config = figment(config_file, overrides)?
        .extract()
        .map_err(Box::new)?;
    Ok(config)
}
