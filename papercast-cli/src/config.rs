// Application configuration: defaults, then an optional file, then environment

use anyhow::{anyhow, bail, Context, Result};
use papercast_core::DigestConfig;
use papercast_llm::LLMConfig;
use papercast_spk::SpeechConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub digest: DigestConfig,
    pub llm: LLMConfig,
    pub speech: SpeechConfig,

    /// Environment variable holding the generative text service key
    pub api_key_env: String,

    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            digest: DigestConfig::default(),
            llm: LLMConfig::default(),
            speech: SpeechConfig::default(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults (or `path`), then process environment overrides, then validation
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML or JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load configuration from string
    pub fn from_str(content: &str) -> Result<Self> {
        // Try JSON first
        if let Ok(config) = serde_json::from_str::<AppConfig>(content) {
            return Ok(config);
        }

        toml::from_str::<AppConfig>(content).map_err(|e| anyhow!("Not valid JSON or TOML: {}", e))
    }

    /// Apply `PAPERCAST_*` overrides. `lookup` returns the value of a variable.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(topics) = lookup("PAPERCAST_TOPICS") {
            let topics: Vec<String> = topics
                .split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect();
            if !topics.is_empty() {
                self.digest.topics = topics;
            }
        }

        if let Some(path) = lookup("PAPERCAST_NEWS_PATH") {
            self.digest.news_path = PathBuf::from(path);
        }

        if let Some(path) = lookup("PAPERCAST_PROCESSED_IDS_PATH") {
            self.digest.processed_ids_path = PathBuf::from(path);
        }

        if let Some(dir) = lookup("PAPERCAST_AUDIO_DIR") {
            self.digest.audio_dir = PathBuf::from(dir);
        }

        if let Some(model) = lookup("PAPERCAST_MODEL") {
            if !model.trim().is_empty() {
                self.llm.model = model.trim().to_string();
            }
        }

        if let Some(level) = lookup("PAPERCAST_LOG_LEVEL") {
            if !level.trim().is_empty() {
                self.log_level = level.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.digest.validate().map_err(|e| anyhow!("Invalid digest config: {}", e))?;
        self.llm.validate().map_err(|e| anyhow!("Invalid llm config: {}", e))?;
        self.speech.validate().map_err(|e| anyhow!("Invalid speech config: {}", e))?;

        if self.api_key_env.trim().is_empty() {
            bail!("api_key_env cannot be empty");
        }
        Ok(())
    }

    /// Read the service key named by `api_key_env`. Missing and empty are
    /// both errors.
    pub fn api_key<F>(&self, lookup: F) -> Result<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.api_key_env) {
            Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            Some(_) => bail!("{} is set but empty", self.api_key_env),
            None => bail!("{} is not set", self.api_key_env),
        }
    }
}
