// Digest configuration: what to fetch and where to keep state

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the fetch and persistence side of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Topics queried in order, one search per topic
    pub topics: Vec<String>,

    /// Search window per topic
    pub max_results: usize,

    /// New papers taken per topic
    pub per_topic_limit: usize,

    /// Append-only JSON-lines output
    pub news_path: PathBuf,

    /// Line-delimited processed identifiers
    pub processed_ids_path: PathBuf,

    /// Directory for per-paper audio clips
    pub audio_dir: PathBuf,

    /// Per-request HTTP timeout
    pub request_timeout_secs: u64,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            topics: vec![
                "AI".to_string(),
                "Foundation Model".to_string(),
                "Diffusion Model".to_string(),
            ],
            max_results: 50,
            per_topic_limit: 1,
            news_path: PathBuf::from("news.jsonl"),
            processed_ids_path: PathBuf::from("processed_ids.txt"),
            audio_dir: PathBuf::from("audios"),
            request_timeout_secs: 30,
        }
    }
}

impl DigestConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.topics.is_empty() {
            return Err("At least one topic is required".to_string());
        }

        if self.topics.iter().any(|t| t.trim().is_empty()) {
            return Err("Topics cannot be empty".to_string());
        }

        if self.max_results == 0 || self.max_results > 2000 {
            return Err("max_results must be between 1 and 2000".to_string());
        }

        if self.per_topic_limit == 0 {
            return Err("per_topic_limit must be greater than 0".to_string());
        }

        if self.per_topic_limit > self.max_results {
            return Err("per_topic_limit cannot exceed max_results".to_string());
        }

        for (name, path) in [
            ("news_path", &self.news_path),
            ("processed_ids_path", &self.processed_ids_path),
            ("audio_dir", &self.audio_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(format!("{} cannot be empty", name));
            }
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err("request_timeout_secs must be between 1 and 300".to_string());
        }

        Ok(())
    }
}
