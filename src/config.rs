//! Configuration management

use crate::error::ReelError;
use crate::generation::ContentKind;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// Text service provider (azure, openai, anthropic, compatible, ollama)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Service endpoint (Azure resource URL or API base URL)
    #[serde(default, alias = "base_url")]
    pub endpoint: Option<String>,
    /// Model name, or deployment name for Azure
    #[serde(default, alias = "deployment")]
    pub model: Option<String>,
    /// Azure REST API version
    #[serde(default)]
    pub api_version: Option<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Reviews requested per movie detail view
    #[serde(default = "default_review_count")]
    pub review_count: usize,
    /// Tweets requested per actor detail view
    #[serde(default = "default_tweet_count")]
    pub tweet_count: usize,
}

fn default_provider() -> String {
    "azure".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_review_count() -> usize {
    ContentKind::Review.default_count()
}

fn default_tweet_count() -> usize {
    ContentKind::Tweet.default_count()
}

impl AnalysisConfig {
    /// Configured item count for a content kind
    pub fn count_for(&self, kind: ContentKind) -> usize {
        match kind {
            ContentKind::Review => self.review_count,
            ContentKind::Tweet => self.tweet_count,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            review_count: default_review_count(),
            tweet_count: default_tweet_count(),
        }
    }
}

impl Config {
    /// Load configuration from file, with `REEL_*` environment overrides
    /// (nested keys use `__`, e.g. `REEL_GENERATOR__API_KEY`)
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path
            .as_ref()
            .to_str()
            .ok_or_else(|| ReelError::Config("config path is not valid UTF-8".into()))?;

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("REEL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Load from default locations
    pub fn load_default() -> anyhow::Result<Self> {
        let paths = ["reel.toml", "reel.yaml", "~/.config/reel-sentiment/config.toml"];

        for path in paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::load(expanded.as_ref());
            }
        }

        anyhow::bail!("No configuration file found")
    }
}
