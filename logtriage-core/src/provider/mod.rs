use anyhow::Result;
use thiserror::Error;

pub mod gemini;
pub mod openrouter;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use openrouter::OpenRouterProvider;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Authentication failed")]
    Authentication,
    #[error("Rate limited")]
    RateLimited,
    #[error("Response contained no completion text")]
    EmptyCompletion,
    #[error("Provider not supported: {0}")]
    UnsupportedProvider(String),
}

/// A hosted text-completion service. The pipeline treats it as a black box:
/// prompt in, free text out.
#[async_trait::async_trait]
pub trait AiProvider: Send + Sync + std::fmt::Debug {
    async fn complete(&self, prompt: &str) -> Result<String, AiError>;
    fn name(&self) -> &str;
}

pub fn create_provider(provider_name: &str, api_key: &str) -> Result<Box<dyn AiProvider>> {
    match provider_name.to_lowercase().as_str() {
        "gemini" => Ok(Box::new(GeminiProvider::new(api_key.to_string()))),
        "openrouter" => Ok(Box::new(OpenRouterProvider::new(api_key.to_string()))),
        _ => Err(AiError::UnsupportedProvider(provider_name.to_string()).into()),
    }
}

pub fn create_provider_with_model(
    provider_name: &str,
    api_key: &str,
    model: Option<String>,
) -> Result<Box<dyn AiProvider>> {
    match (provider_name.to_lowercase().as_str(), model) {
        ("gemini", Some(model)) => {
            Ok(Box::new(GeminiProvider::new(api_key.to_string()).with_model(model)))
        }
        ("openrouter", Some(model)) => Ok(Box::new(
            OpenRouterProvider::new(api_key.to_string()).with_model(model),
        )),
        (_, None) => create_provider(provider_name, api_key),
        _ => Err(AiError::UnsupportedProvider(provider_name.to_string()).into()),
    }
}
