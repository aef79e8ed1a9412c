//! Google Cloud Text-to-Speech engine

use crate::config::{speaking_rate_for, VoiceConfig, VoiceGender};
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

pub const GOOGLE_CLOUD_TTS_ENDPOINT: &str = "https://texttospeech.googleapis.com";
pub const GOOGLE_CLOUD_API_KEY_ENV: &str = "GOOGLE_CLOUD_API_KEY";

pub struct GoogleCloudTtsEngine {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    rate: u32,   // Speech rate (0-500 WPM)
    volume: f32, // Volume (0.0-1.0)
    pitch: f32,  // Pitch (-1.0 to 1.0)
}

impl GoogleCloudTtsEngine {
    pub fn new(
        endpoint: String,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, SpeechError> {
        Self::new_with_config(endpoint, api_key, timeout_secs, 150, 0.8, 0.0)
    }

    /// Create an engine with rate/volume/pitch
    pub fn new_with_config(
        endpoint: String,
        api_key: Option<String>,
        timeout_secs: u64,
        rate: u32,
        volume: f32,
        pitch: f32,
    ) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SpeechError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            rate,
            volume,
            pitch,
        })
    }

    fn api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(GOOGLE_CLOUD_API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }

    fn speaking_rate(&self) -> f32 {
        speaking_rate_for(self.rate)
    }

    /// Map 0.0-1.0 onto -96.0 to 16.0 dB
    fn volume_gain_db(&self) -> f32 {
        -96.0 + (self.volume * 112.0)
    }

    /// Map -1.0 to 1.0 onto -20.0 to 20.0 semitones
    fn pitch_semitones(&self) -> f32 {
        self.pitch * 20.0
    }
}

#[async_trait]
impl TtsEngine for GoogleCloudTtsEngine {
    async fn synthesize(&self, text: &str, voice_config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        let api_key = self.api_key()
            .ok_or_else(|| SpeechError::Engine("Google Cloud API key not provided".to_string()))?;

        let mut voice = json!({
            "languageCode": voice_config.language,
            "ssmlGender": match voice_config.gender {
                Some(VoiceGender::Female) => "FEMALE",
                Some(VoiceGender::Male) => "MALE",
                _ => "NEUTRAL",
            }
        });
        if let Some(ref name) = voice_config.name {
            voice["name"] = json!(name);
        }

        let request_body = json!({
            "input": {
                "text": text
            },
            "voice": voice,
            "audioConfig": {
                "audioEncoding": "MP3",
                "speakingRate": self.speaking_rate(),
                "volumeGainDb": self.volume_gain_db(),
                "pitch": self.pitch_semitones(),
            }
        });

        let url = format!("{}/v1/text:synthesize", self.endpoint);

        let response = self.client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| SpeechError::Engine(format!("Google Cloud API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SpeechError::Api(format!("Google Cloud API error ({}): {}", status, error_text)));
        }

        let response_json: serde_json::Value = response.json()
            .await
            .map_err(|e| SpeechError::Api(format!("Failed to parse Google Cloud response: {}", e)))?;

        let audio_content = response_json.get("audioContent")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SpeechError::Api("Missing audioContent in Google Cloud response".to_string()))?;

        use base64::{Engine as _, engine::general_purpose};
        let audio_bytes = general_purpose::STANDARD.decode(audio_content)
            .map_err(|e| SpeechError::Api(format!("Failed to decode base64 audio: {}", e)))?;

        Ok(Bytes::from(audio_bytes))
    }

    fn is_available(&self) -> bool {
        self.api_key().is_some()
    }

    fn name(&self) -> &str {
        "Google Cloud TTS"
    }
}
