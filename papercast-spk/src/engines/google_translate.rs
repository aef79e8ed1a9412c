//! Google Translate speech endpoint.
//!
//! Keyless, but only accepts short inputs, so text is split into chunks of
//! at most [`MAX_CHUNK_CHARS`] characters and the returned MP3 segments are
//! concatenated.

use crate::config::VoiceConfig;
use crate::engines::TtsEngine;
use crate::error::SpeechError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const TRANSLATE_TTS_ENDPOINT: &str = "https://translate.google.com";
pub const MAX_CHUNK_CHARS: usize = 100;

const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB per chunk

pub struct GoogleTranslateTtsEngine {
    client: Client,
    endpoint: String,
    speed: f32,
}

impl GoogleTranslateTtsEngine {
    pub fn new(timeout_secs: u64) -> Result<Self, SpeechError> {
        Self::with_endpoint(TRANSLATE_TTS_ENDPOINT.to_string(), timeout_secs, 1.0)
    }

    pub fn with_endpoint(endpoint: String, timeout_secs: u64, speed: f32) -> Result<Self, SpeechError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0")
            .build()
            .map_err(|e| SpeechError::Engine(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            speed: speed.clamp(0.25, 4.0),
        })
    }

    async fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Bytes, SpeechError> {
        let url = format!("{}/translate_tts", self.endpoint);
        let textlen = chunk.chars().count().to_string();
        let idx = idx.to_string();
        let total = total.to_string();
        let speed = self.speed.to_string();

        let response = self.client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("q", chunk),
                ("tl", language),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
                ("client", "tw-ob"),
                ("ttsspeed", speed.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SpeechError::Engine(format!("Google Translate TTS request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text: String = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string())
                .chars()
                .take(1000)
                .collect();
            return Err(SpeechError::Api(format!(
                "Google Translate TTS error ({}): {}",
                status, error_text
            )));
        }

        let audio = response.bytes()
            .await
            .map_err(|e| SpeechError::Engine(format!("Failed to read audio response: {}", e)))?;

        if audio.is_empty() {
            return Err(SpeechError::Api("Google Translate TTS returned empty audio".to_string()));
        }
        if audio.len() > MAX_RESPONSE_SIZE {
            return Err(SpeechError::Api(format!(
                "Response too large ({} bytes, max {} bytes)",
                audio.len(), MAX_RESPONSE_SIZE
            )));
        }

        Ok(audio)
    }
}

#[async_trait]
impl TtsEngine for GoogleTranslateTtsEngine {
    async fn synthesize(&self, text: &str, config: &VoiceConfig) -> Result<Bytes, SpeechError> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(SpeechError::Engine("No speakable text".to_string()));
        }

        let total = chunks.len();
        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Synthesizing chunk {}/{} ({} chars)", idx + 1, total, chunk.chars().count());
            let part = self.fetch_chunk(chunk, &config.language, idx, total).await?;
            audio.extend_from_slice(&part);
        }

        Ok(Bytes::from(audio))
    }

    fn is_available(&self) -> bool {
        !self.endpoint.is_empty()
    }

    fn name(&self) -> &str {
        "Google Translate TTS"
    }
}

fn is_break(c: char) -> bool {
    matches!(
        c,
        '.' | ',' | '!' | '?' | ';' | ':' | '\n'
            | '。' | '，' | '！' | '？' | '；' | '：' | '、'
    )
}

/// Split `segment` into pieces of at most `max_chars`, preferring whitespace.
fn split_long(segment: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest: Vec<char> = segment.chars().collect();
    while rest.len() > max_chars {
        let cut = rest[..max_chars]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&i| i > 0)
            .map(|i| i + 1)
            .unwrap_or(max_chars);
        pieces.push(rest[..cut].iter().collect());
        rest.drain(..cut);
    }
    if !rest.is_empty() {
        pieces.push(rest.into_iter().collect());
    }
    pieces
}

fn push_chunk(chunks: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    // Punctuation-only chunks produce no speech
    if trimmed.chars().any(char::is_alphanumeric) {
        chunks.push(trimmed.to_string());
    }
}

/// Split text at punctuation (ASCII and CJK) into chunks of at most
/// `max_chars` characters. Never splits inside a code point.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut segments = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if is_break(c) {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }

    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut chunk_len = 0;
    for segment in segments {
        for piece in split_long(&segment, max_chars) {
            let piece_len = piece.chars().count();
            if chunk_len + piece_len > max_chars {
                push_chunk(&mut chunks, &chunk);
                chunk.clear();
                chunk_len = 0;
            }
            chunk.push_str(&piece);
            chunk_len += piece_len;
        }
    }
    push_chunk(&mut chunks, &chunk);
    chunks
}
