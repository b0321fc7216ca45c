//! Game configuration.

use crate::oracle::{LlmOracle, OracleProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

fn default_provider() -> OracleProvider {
    OracleProvider::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_scores_path() -> PathBuf {
    PathBuf::from("whoami_scores.json")
}

/// Configuration for a game run.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct GameConfig {
    /// Oracle provider (openai or anthropic).
    #[serde(default = "default_provider")]
    provider: OracleProvider,

    /// Model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-20241022").
    #[serde(default = "default_model")]
    model: String,

    /// Maximum tokens per oracle reply.
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Where win scores are persisted.
    #[serde(default = "default_scores_path")]
    scores_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            scores_path: default_scores_path(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = ?config.provider, model = %config.model, "Config loaded");
        Ok(config)
    }

    /// Loads configuration from the given file, or defaults when no file
    /// is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a file is given but unreadable.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Creates an oracle client from this configuration.
    ///
    /// Requires `OPENAI_API_KEY` or `ANTHROPIC_API_KEY` in the environment,
    /// depending on the configured provider.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the required API key is not set.
    #[instrument(skip(self), fields(provider = ?self.provider, model = %self.model))]
    pub fn create_oracle(&self) -> Result<LlmOracle, ConfigError> {
        debug!("Creating oracle from config");

        let api_key = match self.provider {
            OracleProvider::OpenAI => std::env::var("OPENAI_API_KEY").map_err(|_| {
                ConfigError::new("OPENAI_API_KEY environment variable not set".to_string())
            })?,
            OracleProvider::Anthropic => std::env::var("ANTHROPIC_API_KEY").map_err(|_| {
                ConfigError::new("ANTHROPIC_API_KEY environment variable not set".to_string())
            })?,
        };

        Ok(LlmOracle::new(
            self.provider,
            api_key,
            self.model.clone(),
            self.max_tokens,
        ))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
