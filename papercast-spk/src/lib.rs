//! papercast-spk: Speech synthesis for paper digests
//!
//! Provides text-to-speech with:
//! - Google Translate speech endpoint (keyless, chunked)
//! - Google Cloud Text-to-Speech (API key)
//! - Clip persistence that reports failure instead of raising

pub mod error;
pub mod config;
pub mod engines;
pub mod synthesizer;

pub use error::SpeechError;
pub use config::{SpeechConfig, VoiceConfig, TtsEngine, ApiTtsConfig};
pub use synthesizer::SpeechSynthesizer;
pub use engines::TtsEngine as TtsEngineTrait;
