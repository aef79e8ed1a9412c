//! Speech synthesizer: validates input, delegates to an engine, writes clips

use crate::config::{SpeechConfig, VoiceConfig};
use crate::engines::google_cloud::{GoogleCloudTtsEngine, GOOGLE_CLOUD_TTS_ENDPOINT};
use crate::engines::google_translate::{GoogleTranslateTtsEngine, TRANSLATE_TTS_ENDPOINT};
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_TEXT_LENGTH: usize = 100_000;
const MAX_AUDIO_SIZE: usize = 50 * 1024 * 1024; // 50MB

pub struct SpeechSynthesizer {
    config: Arc<SpeechConfig>,
    engine: Arc<dyn TtsEngine>,
}

impl SpeechSynthesizer {
    /// Create a synthesizer with the engine named in `config`
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate()
            .map_err(SpeechError::Config)?;

        if !config.enabled {
            return Err(SpeechError::Config("Speech synthesis is disabled".to_string()));
        }

        let endpoint = config.api_config.as_ref().map(|c| c.endpoint.clone());
        let engine: Arc<dyn TtsEngine> = match config.engine {
            crate::config::TtsEngine::GoogleTranslate => {
                let engine = GoogleTranslateTtsEngine::with_endpoint(
                    endpoint.unwrap_or_else(|| TRANSLATE_TTS_ENDPOINT.to_string()),
                    config.timeout_secs,
                    config.speaking_rate(),
                )?;
                Arc::new(engine)
            }
            crate::config::TtsEngine::GoogleCloud => {
                let engine = GoogleCloudTtsEngine::new_with_config(
                    endpoint.unwrap_or_else(|| GOOGLE_CLOUD_TTS_ENDPOINT.to_string()),
                    config.api_config.as_ref().and_then(|c| c.api_key.clone()),
                    config.timeout_secs,
                    config.rate,
                    config.volume,
                    config.pitch,
                )?;

                if !engine.is_available() {
                    return Err(SpeechError::Engine("Google Cloud TTS not available (API key missing)".to_string()));
                }
                Arc::new(engine)
            }
        };

        Ok(Self::with_engine(config, engine))
    }

    /// Create a synthesizer around an existing engine
    pub fn with_engine(config: SpeechConfig, engine: Arc<dyn TtsEngine>) -> Self {
        info!("Speech engine: {}", engine.name());
        Self {
            config: Arc::new(config),
            engine,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.engine.name()
    }

    /// Synthesize text with the configured voice
    pub async fn speak(&self, text: &str) -> Result<Bytes, SpeechError> {
        self.speak_with_config(text, &self.config.voice).await
    }

    /// Synthesize text with custom voice config
    pub async fn speak_with_config(&self, text: &str, voice_config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::Synthesizer("Text cannot be empty".to_string()));
        }

        if text.contains('\0') {
            return Err(SpeechError::Synthesizer("Text contains null bytes".to_string()));
        }

        if text.len() > MAX_TEXT_LENGTH {
            return Err(SpeechError::Synthesizer(format!("Text too long (max {} bytes)", MAX_TEXT_LENGTH)));
        }

        voice_config.validate().map_err(SpeechError::Config)?;

        let audio = self.engine.synthesize(text, voice_config).await?;

        if audio.is_empty() {
            return Err(SpeechError::Synthesizer("Engine returned no audio".to_string()));
        }
        if audio.len() > MAX_AUDIO_SIZE {
            return Err(SpeechError::Synthesizer(format!(
                "Generated audio too large ({} bytes, max {} bytes)",
                audio.len(), MAX_AUDIO_SIZE
            )));
        }

        Ok(audio)
    }

    /// Synthesize `text` and write the clip to `path`, creating parent
    /// directories. A failed write leaves no file behind.
    pub async fn try_save_audio(&self, text: &str, path: &Path) -> Result<(), SpeechError> {
        let audio = self.speak(text).await?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        if let Err(e) = tokio::fs::write(path, &audio).await {
            let _ = tokio::fs::remove_file(path).await;
            return Err(e.into());
        }

        debug!("Wrote {} bytes of audio to {}", audio.len(), path.display());
        Ok(())
    }

    /// Like [`try_save_audio`](Self::try_save_audio) but reports only success.
    pub async fn save_audio(&self, text: &str, path: &Path) -> bool {
        match self.try_save_audio(text, path).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Speech synthesis for {} failed: {}", path.display(), e);
                false
            }
        }
    }
}
