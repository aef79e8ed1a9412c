use crate::config::{GenerateRequest, LLMConfig};
use crate::error::{LLMError, Result};
use crate::providers::ProviderTrait;
use std::sync::Arc;
use tracing::{info, warn};

pub const TITLE_FALLBACK_TAG: &str = "[translated]";
pub const SUMMARY_FALLBACK_TAG: &str = "[summary]";

/// Outcome of localizing one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// Model output after quote stripping
    Translated(String),
    /// Deterministic placeholder used because the model call failed
    Fallback(String),
}

impl Translation {
    pub fn text(&self) -> &str {
        match self {
            Translation::Translated(s) | Translation::Fallback(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Translation::Translated(s) | Translation::Fallback(s) => s,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Translation::Fallback(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizedText {
    pub title_zh: Translation,
    pub summary_zh: Translation,
}

impl LocalizedText {
    /// Text handed to speech synthesis: title, line break, abstract.
    pub fn speech_text(&self) -> String {
        format!("{}\n{}", self.title_zh.text(), self.summary_zh.text())
    }
}

pub fn title_prompt(title: &str, target_language: &str) -> String {
    format!(
        "You are a professional academic translation system. Translate the following paper title into {lang}, keeping it academic and easy to read.\n\
         Rules:\n\
         1. Output only the {lang} result, with no extra text\n\
         2. Do not use words such as \"translation\" or \"translated title\"\n\
         3. Do not wrap the result in quotation marks or other punctuation\n\n\
         Title: {title}\n",
        lang = target_language,
        title = title,
    )
}

pub fn summary_prompt(summary: &str, target_language: &str) -> String {
    format!(
        "You are a professional academic translation system. Translate the following paper abstract into {lang} and condense it into a brief, clear version.\n\
         Rules:\n\
         1. Output only the {lang} result, with no extra text\n\
         2. Do not use words such as \"translation\" or \"translated abstract\"\n\
         3. Do not wrap the result in quotation marks or other punctuation\n\
         4. Keep it academic but suitable for reading and listening\n\n\
         Abstract: {summary}\n",
        lang = target_language,
        summary = summary,
    )
}

/// Trim, then drop one wrapping quote on each side (`"` or CJK corner brackets).
pub fn strip_wrapping_quotes(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix(['"', '「']).unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix(['"', '」']).unwrap_or(trimmed);
    trimmed.trim().to_string()
}

pub fn title_fallback(title: &str) -> String {
    format!("{} {}", TITLE_FALLBACK_TAG, title)
}

pub fn summary_fallback(summary: &str, keep_chars: usize) -> String {
    let head: String = summary.chars().take(keep_chars).collect();
    format!(
        "{} Unable to translate this abstract; it may contain special symbols or formatting. Original abstract: {}...",
        SUMMARY_FALLBACK_TAG, head
    )
}

fn preview(text: &str) -> String {
    text.chars().take(30).collect()
}

/// Title/abstract localizer. Each field is a separate model call and fails
/// independently.
pub struct Localizer {
    provider: Arc<dyn ProviderTrait>,
    config: LLMConfig,
}

impl Localizer {
    pub fn new(provider: Arc<dyn ProviderTrait>, config: LLMConfig) -> Self {
        Self { provider, config }
    }

    pub async fn localize(&self, title: &str, summary: &str) -> LocalizedText {
        let title_zh = self.translate_title(title).await;
        let summary_zh = self.translate_summary(summary).await;
        LocalizedText { title_zh, summary_zh }
    }

    pub async fn translate_title(&self, title: &str) -> Translation {
        let prompt = title_prompt(title, &self.config.target_language);
        match self.generate(prompt).await {
            Ok(text) => {
                info!("Title translated: {}...", preview(&text));
                Translation::Translated(text)
            }
            Err(e) => {
                warn!("Title translation failed: {}", e);
                Translation::Fallback(title_fallback(title))
            }
        }
    }

    pub async fn translate_summary(&self, summary: &str) -> Translation {
        let prompt = summary_prompt(summary, &self.config.target_language);
        match self.generate(prompt).await {
            Ok(text) => {
                info!("Abstract translated: {}...", preview(&text));
                Translation::Translated(text)
            }
            Err(e) => {
                warn!("Abstract translation failed: {}", e);
                Translation::Fallback(summary_fallback(summary, self.config.fallback_summary_chars))
            }
        }
    }

    async fn generate(&self, prompt: String) -> Result<String> {
        let request = GenerateRequest {
            prompt,
            model: Some(self.config.model.clone()),
            temperature: Some(self.config.temperature),
            max_tokens: self.config.max_tokens,
        };
        let response = self.provider.generate(request).await?;
        let text = strip_wrapping_quotes(&response.content);
        if text.is_empty() {
            return Err(LLMError::EmptyResponse(format!(
                "{} returned only quotes or whitespace",
                self.provider.name()
            )));
        }
        Ok(text)
    }
}
