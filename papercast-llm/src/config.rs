use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: Provider,
    pub model: String,
    /// Overrides the provider's public endpoint
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
    /// Language the localizer writes in, as named in the prompt
    pub target_language: String,
    /// Characters of the original abstract kept in the fallback text
    pub fallback_summary_chars: usize,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Google,
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            temperature: 0.7,
            max_tokens: Some(2000),
            timeout_secs: 30,
            target_language: "Traditional Chinese".to_string(),
            fallback_summary_chars: 100,
        }
    }
}

impl LLMConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model name cannot be empty".to_string());
        }

        if self.model.len() > 256 {
            return Err("Model name too long (max 256 chars)".to_string());
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 2.0".to_string());
        }

        if let Some(ref base_url) = self.base_url {
            match url::Url::parse(base_url) {
                Ok(u) if matches!(u.scheme(), "http" | "https") => {}
                Ok(u) => return Err(format!("Unsupported base URL scheme: {}", u.scheme())),
                Err(e) => return Err(format!("Invalid base URL: {}", e)),
            }
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("Timeout must be between 1 and 300 seconds".to_string());
        }

        if self.target_language.trim().is_empty() {
            return Err("Target language cannot be empty".to_string());
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    Google,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "google" | "gemini" => Some(Provider::Google),
            _ => None,
        }
    }

    pub fn env_var_name(&self) -> &'static str {
        match self {
            Provider::Google => "GEMINI_API_KEY",
        }
    }
}

/// Single-shot text generation request. No conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
