use async_trait::async_trait;
use crate::config::*;
use crate::error::{LLMError, Result};
use crate::providers::trait_impl::Provider as ProviderTrait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use parking_lot::RwLock;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

pub struct GoogleProvider {
    api_key: Arc<RwLock<Option<String>>>,
    client: Client,
    base_url: String,
}

impl GoogleProvider {
    pub fn new() -> Self {
        Self {
            api_key: Arc::new(RwLock::new(None)),
            client: Client::new(),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_api_key(api_key: String) -> Self {
        let mut provider = Self::new();
        provider.set_api_key(api_key);
        provider
    }

    /// Build from config: endpoint override and request timeout.
    pub fn from_config(config: &LLMConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let mut provider = Self {
            api_key: Arc::new(RwLock::new(None)),
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        };
        if let Some(ref base_url) = config.base_url {
            provider = provider.with_base_url(base_url);
        }
        provider.set_api_key(api_key);
        Ok(provider)
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn get_api_key(&self) -> Result<String> {
        self.api_key
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| LLMError::MissingApiKey("Google".to_string()))
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderTrait for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn has_api_key(&self) -> bool {
        self.api_key.read().is_some()
    }

    fn set_api_key(&mut self, key: String) {
        if key.trim().is_empty() {
            tracing::warn!("Empty API key provided for Google");
            return;
        }
        *self.api_key.write() = Some(key);
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let api_key = self.get_api_key()?;
        let model = request.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let mut generation_config = json!({});
        if let Some(temp) = request.temperature {
            generation_config["temperature"] = json!(temp.clamp(0.0, 2.0));
        }
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = json!(max_tokens.min(8192));
        }

        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": request.prompt}]
            }],
            "generationConfig": generation_config,
        });

        let base = url::Url::parse(&self.base_url)
            .map_err(|e| LLMError::Provider(format!("Invalid base URL: {}", e)))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(LLMError::Provider("Invalid base URL".to_string()));
        }

        // URL encode model name to prevent injection
        let model_encoded = urlencoding::encode(&model);
        let url = format!("{}/models/{}:generateContent", self.base_url, model_encoded);

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(LLMError::RateLimit),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LLMError::AuthenticationFailed)
            }
            status if !status.is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(LLMError::InvalidResponse(format!(
                    "HTTP {}: {}",
                    status, text
                )));
            }
            _ => {}
        }

        let json: serde_json::Value = response.json().await?;

        if let Some(reason) = json["promptFeedback"]["blockReason"].as_str() {
            return Err(LLMError::EmptyResponse(format!("prompt blocked: {}", reason)));
        }

        let finish_reason = json["candidates"][0]["finishReason"].as_str().map(|s| s.to_string());

        let content: String = json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LLMError::EmptyResponse(
                finish_reason.unwrap_or_else(|| "no candidates".to_string()),
            ));
        }

        let usage = json.get("usageMetadata").and_then(|u| {
            Some(Usage {
                prompt_tokens: u["promptTokenCount"].as_u64()? as u32,
                completion_tokens: u["candidatesTokenCount"].as_u64()? as u32,
                total_tokens: u["totalTokenCount"].as_u64()? as u32,
            })
        });

        Ok(GenerateResponse {
            content,
            model,
            usage,
            finish_reason,
        })
    }

    fn available_models(&self) -> Vec<String> {
        vec![
            "gemini-2.0-flash".to_string(),
            "gemini-1.5-flash".to_string(),
            "gemini-1.5-pro".to_string(),
        ]
    }
}
