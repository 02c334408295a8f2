use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::output::OutputFormat;
use crate::error::ConfigError;
use crate::utils::RetryConfig;

pub const DEFAULT_EMBEDDING_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;
pub const DEFAULT_ENCODING: &str = "cl100k_base";
pub const DEFAULT_CTX_LENGTH: usize = 8191;
pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    #[serde(default)]
    pub pipeline: PipelineConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub estimate: EstimateConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docvec").join("config.toml"))
    }

    /// Load the user config file, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("pipeline.concurrency", self.pipeline.concurrency),
            ("pipeline.batch_size", self.pipeline.batch_size),
            ("tokenizer.ctx_length", self.tokenizer.ctx_length),
            ("embedding.dimension", self.embedding.dimension),
            ("retry.max_attempts", self.retry.max_attempts as usize),
        ];
        for (name, value) in checks {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        if self.retry.jitter_min < 0.0 || self.retry.jitter_max < self.retry.jitter_min {
            return Err(ConfigError::ValidationError(
                "retry jitter range must satisfy 0 <= jitter_min <= jitter_max".to_string(),
            ));
        }

        if self.pipeline.extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "pipeline.extensions must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default = "default_dimension")]
    pub dimension: usize,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

fn default_embedding_url() -> String {
    DEFAULT_EMBEDDING_URL.to_string()
}

fn default_embedding_model() -> String {
    DEFAULT_EMBEDDING_MODEL.to_string()
}

fn default_dimension() -> usize {
    DEFAULT_EMBEDDING_DIMENSION
}

fn default_timeout() -> u64 {
    120
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            dimension: default_dimension(),
            timeout_secs: default_timeout(),
            api_key: None,
            api_key_env: default_api_key_env(),
        }
    }
}

impl EmbeddingConfig {
    /// Resolve the API key from the config file or the configured environment variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Maximum tokens per window sent to the embedding service.
    #[serde(default = "default_ctx_length")]
    pub ctx_length: usize,
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_ctx_length() -> usize {
    DEFAULT_CTX_LENGTH
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            ctx_length: default_ctx_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Glob patterns to leave out of discovery. Empty by default.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Largest file accepted, in bytes. Larger files fail discovery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,

    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            exclude_patterns: Vec::new(),
            max_file_size: None,
            concurrency: default_concurrency(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateConfig {
    /// Price in USD per 1000 tokens, used for cost projection only.
    #[serde(default = "default_price_per_1k_tokens")]
    pub price_per_1k_tokens: f64,
}

fn default_price_per_1k_tokens() -> f64 {
    0.0001
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            price_per_1k_tokens: default_price_per_1k_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub default_format: OutputFormat,
}
