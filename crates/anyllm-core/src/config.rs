use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default models for each capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub chat: String,
    pub embedding: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            chat: "llama3".into(),
            embedding: "nomic-embed-text".into(),
        }
    }
}

/// Client configuration: backend endpoint plus model defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub models: ModelConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            models: ModelConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML.
    pub fn from_toml(src: &str) -> Result<Self, ConfigError> {
        toml::from_str(src).map_err(ConfigError::from)
    }

    /// The model name used for chat.
    pub fn chat_model(&self) -> &str {
        &self.models.chat
    }

    /// The model name used for embeddings.
    pub fn embedding_model(&self) -> &str {
        &self.models.embedding
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}
