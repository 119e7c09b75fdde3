//! Configuration for the floor-plan generation service
//!
//! Supports YAML configuration files with sensible defaults for every
//! section, so a missing or empty file still yields a runnable service.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::PlanBotError;
use crate::generation::GeneratorConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlanBotConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub generation: GeneratorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub auth: LlmAuth,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            auth: LlmAuth::default(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    Gemini,
    /// Any endpoint serving the Gemini `generateContent` shape, e.g. a Vertex
    /// AI model or a local stub.
    Custom { base_url: String },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmAuth {
    /// API key given directly in the configuration file.
    pub api_key: Option<String>,
    /// Name of the environment variable holding the API key.
    pub api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Interpreter binary used to run generated scripts.
    #[serde(default = "default_interpreter")]
    pub interpreter: String,
    /// Wall-clock limit per script execution, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            interpreter: default_interpreter(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_interpreter() -> String {
    "python3".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load a configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<PlanBotConfig, PlanBotError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            PlanBotError::ConfigError(format!("could not read {}: {}", path.display(), e))
        })?;
        serde_yaml::from_str(&raw)
            .map_err(|e| PlanBotError::ConfigError(format!("invalid configuration: {}", e)))
    }
}
