use std::sync::Arc;

use common::LlmConfig;

use crate::error::{DigestError, Result};

/// Summarization backend. Implementations normalize whatever their service returns
/// into plain summary text or a `DigestError::Summarization`.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    /// Summary of `content`, aiming at roughly `max_length` characters
    async fn summarize(&self, content: &str, max_length: usize) -> Result<String>;
}

/// Request structure for LLM generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub prompt: String,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Response from LLM generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub usage: UsageMetadata,
    pub model: String,
}

/// Token usage metadata
#[derive(Debug, Clone, Default)]
pub struct UsageMetadata {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

pub mod extractive;
pub mod remote;

/// Build the provider selected by `llm.adapter`.
pub fn create_llm_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.adapter.as_str() {
        "remote" => {
            let api_key = std::env::var(&config.api_key_env).map_err(|_| {
                DigestError::Config(format!("LLM API key env var '{}' not set", config.api_key_env))
            })?;
            let provider = remote::RemoteLlmProvider::new(&config.api_url, api_key, &config.model)
                .with_defaults(config.timeout_seconds, config.temperature);
            Ok(Arc::new(provider))
        }
        "extractive" => Ok(Arc::new(extractive::ExtractiveProvider)),
        other => Err(DigestError::Config(format!("Unknown LLM adapter type: {}", other))),
    }
}
