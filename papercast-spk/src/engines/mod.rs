//! TTS engine implementations

pub mod google_translate;
pub mod google_cloud;

use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;

/// Trait for TTS engines
#[async_trait]
pub trait TtsEngine: Send + Sync {
    /// Synthesize text to speech audio (MP3)
    async fn synthesize(&self, text: &str, config: &crate::config::VoiceConfig) -> Result<Bytes, SpeechError>;

    /// Check if engine is available
    fn is_available(&self) -> bool;

    /// Get engine name
    fn name(&self) -> &str;
}
