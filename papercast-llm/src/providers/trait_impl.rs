use async_trait::async_trait;
use crate::config::*;
use crate::error::Result;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Check if API key is set
    fn has_api_key(&self) -> bool;

    /// Set API key
    fn set_api_key(&mut self, key: String);

    /// Generate text from a single prompt
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse>;

    /// Get available models
    fn available_models(&self) -> Vec<String>;
}
