//! Configuration management for docpilot.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `DEFAULT_MODEL` - Optional. The default LLM model. Defaults to `anthropic/claude-sonnet-4.5`.
//! - `EMBED_MODEL` - Optional. Embedding model. Defaults to `openai/text-embedding-3-small`.
//! - `CORPUS_PATH` - Optional. Directory of .txt/.md documents to ingest. Defaults to `./corpus`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `MAX_ITERATIONS` - Optional. Step budget per session. Defaults to `25`.
//! - `MAX_RETRIES` - Optional. Tolerated consecutive rejected proposals. Defaults to `2`.

use std::path::PathBuf;
use thiserror::Error;

use crate::agent::SessionLimits;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Agent configuration. Passed explicitly into session construction; there
/// is no process-global settings object.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Default LLM model identifier (OpenRouter format)
    pub default_model: String,

    /// Embedding model for the corpus index
    pub embed_model: String,

    /// Directory containing documents to ingest at startup
    pub corpus_path: PathBuf,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Maximum driver proposals per session
    pub max_iterations: usize,

    /// Consecutive rejected proposals tolerated beyond the first
    pub max_retries: u32,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let default_model = std::env::var("DEFAULT_MODEL")
            .unwrap_or_else(|_| "anthropic/claude-sonnet-4.5".to_string());

        let embed_model = std::env::var("EMBED_MODEL")
            .unwrap_or_else(|_| "openai/text-embedding-3-small".to_string());

        let corpus_path = std::env::var("CORPUS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./corpus"));

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let max_iterations = std::env::var("MAX_ITERATIONS")
            .unwrap_or_else(|_| "25".to_string())
            .parse()
            .map_err(|e| {
                ConfigError::InvalidValue("MAX_ITERATIONS".to_string(), format!("{}", e))
            })?;

        let max_retries = std::env::var("MAX_RETRIES")
            .unwrap_or_else(|_| "2".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("MAX_RETRIES".to_string(), format!("{}", e)))?;

        Ok(Self {
            api_key,
            default_model,
            embed_model,
            corpus_path,
            host,
            port,
            max_iterations,
            max_retries,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: String, default_model: String, corpus_path: PathBuf) -> Self {
        Self {
            api_key,
            default_model,
            embed_model: "openai/text-embedding-3-small".to_string(),
            corpus_path,
            host: "127.0.0.1".to_string(),
            port: 3000,
            max_iterations: 25,
            max_retries: 2,
        }
    }

    /// Session termination bounds derived from this config.
    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            max_steps: self.max_iterations,
            max_retries: self.max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_limits_follow_config() {
        let mut config = Config::new(
            "key".to_string(),
            "test-model".to_string(),
            PathBuf::from("/tmp/corpus"),
        );
        config.max_iterations = 7;
        config.max_retries = 1;

        let limits = config.session_limits();
        assert_eq!(limits.max_steps, 7);
        assert_eq!(limits.max_retries, 1);
    }
}
