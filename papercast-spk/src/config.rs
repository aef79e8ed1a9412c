//! Configuration for speech synthesis

use serde::{Deserialize, Serialize};

/// Speech synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Enable speech synthesis; when off every paper is logged without audio
    pub enabled: bool,

    /// Preferred TTS engine
    pub engine: TtsEngine,

    /// Voice settings
    pub voice: VoiceConfig,

    /// Speech rate (words per minute, 0-500, default 150)
    pub rate: u32,

    /// Volume (0.0-1.0, default 0.8)
    pub volume: f32,

    /// Pitch adjustment (-1.0 to 1.0, default 0.0)
    pub pitch: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Endpoint and credentials override
    pub api_config: Option<ApiTtsConfig>,
}

/// TTS Engine type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TtsEngine {
    /// Keyless Google Translate speech endpoint
    GoogleTranslate,
    /// Google Cloud Text-to-Speech (API key required)
    GoogleCloud,
}

/// Voice configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Voice name/identifier
    pub name: Option<String>,

    /// Language tag (e.g., "zh-TW", "en-US")
    pub language: String,

    /// Gender preference
    pub gender: Option<VoiceGender>,
}

/// Voice gender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VoiceGender {
    Male,
    Female,
    Neutral,
}

/// API TTS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiTtsConfig {
    /// API endpoint URL
    pub endpoint: String,

    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            engine: TtsEngine::GoogleTranslate,
            voice: VoiceConfig::default(),
            rate: 150,
            volume: 0.8,
            pitch: 0.0,
            timeout_secs: 30,
            api_config: None,
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: None,
            language: "zh-TW".to_string(),
            gender: None,
        }
    }
}

impl VoiceConfig {
    /// Validate voice configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.language.is_empty() {
            return Err("Language code cannot be empty".to_string());
        }

        if self.language.len() > 32 {
            return Err("Language code too long (max 32 chars)".to_string());
        }

        // Basic format check: should be like "zh-TW" or "en"
        if !self.language.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err("Language code contains invalid characters (only alphanumeric and '-' allowed)".to_string());
        }

        if let Some(ref name) = self.name {
            if name.is_empty() {
                return Err("Voice name cannot be empty if provided".to_string());
            }

            if name.len() > 256 {
                return Err("Voice name too long (max 256 chars)".to_string());
            }

            if name.chars().any(|c| c == '\0' || c.is_control()) {
                return Err("Voice name contains invalid characters".to_string());
            }
        }

        Ok(())
    }
}

impl SpeechConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.rate > 500 {
            return Err("Speech rate must be between 0 and 500 WPM".to_string());
        }

        if !(0.0..=1.0).contains(&self.volume) {
            return Err("Volume must be between 0.0 and 1.0".to_string());
        }

        if !(-1.0..=1.0).contains(&self.pitch) {
            return Err("Pitch must be between -1.0 and 1.0".to_string());
        }

        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err("Timeout must be between 1 and 300 seconds".to_string());
        }

        self.voice.validate()?;

        if let Some(api_config) = &self.api_config {
            if api_config.endpoint.is_empty() {
                return Err("API endpoint cannot be empty".to_string());
            }

            let endpoint = url::Url::parse(&api_config.endpoint)
                .map_err(|e| format!("Invalid API endpoint: {}", e))?;
            if !matches!(endpoint.scheme(), "http" | "https") {
                return Err("API endpoint must use http or https".to_string());
            }

            if api_config.endpoint.len() > 2048 {
                return Err("API endpoint URL too long (max 2048 chars)".to_string());
            }
        }

        Ok(())
    }

    /// Speaking rate multiplier for the configured rate
    pub fn speaking_rate(&self) -> f32 {
        speaking_rate_for(self.rate)
    }
}

/// Map 0-500 WPM onto a 0.25-4.0 multiplier; 150 WPM is 1.0
pub fn speaking_rate_for(rate: u32) -> f32 {
    if rate <= 150 {
        0.25 + (rate as f32 / 150.0) * 0.75
    } else {
        1.0 + (rate.min(500) - 150) as f32 / 350.0 * 3.0
    }
    .clamp(0.25, 4.0)
}
