use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::{LlmProvider, LlmRequest, LlmResponse, UsageMetadata};
use crate::error::{DigestError, Result};

/// Remote LLM provider using OpenAI-compatible HTTP API
pub struct RemoteLlmProvider {
    base_url: String,
    api_key: String,
    model: String,
    default_timeout: Duration,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            default_timeout: Duration::from_secs(30),
            default_temperature: 0.1,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(mut self, timeout_secs: u64, temperature: f32) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_temperature = temperature;
        self
    }

    /// One chat completion; the first choice's message content is the result.
    pub async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let timeout = request
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);
        let temperature = request.temperature.unwrap_or(self.default_temperature);

        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: request.prompt,
            }],
            max_tokens: request.max_tokens,
            temperature: Some(temperature),
        };

        // One deadline covers connect, headers and body
        let resp_body = tokio::time::timeout(timeout, self.request_completion(&req_body))
            .await
            .map_err(|_| DigestError::Summarization("LLM request timed out".to_string()))??;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DigestError::Summarization("LLM response has no choices".to_string()))?;

        let usage = resp_body.usage.unwrap_or_default();
        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: UsageMetadata {
                prompt_tokens: usage.prompt_tokens.unwrap_or(0),
                completion_tokens: usage.completion_tokens.unwrap_or(0),
                total_tokens: usage.total_tokens.unwrap_or(0),
            },
            model: resp_body.model.unwrap_or_else(|| self.model.clone()),
        })
    }

    async fn request_completion(&self, req_body: &OpenAiRequest) -> Result<OpenAiResponse> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(req_body)
            .send()
            .await
            .map_err(|e| DigestError::Summarization(format!("LLM HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DigestError::Summarization(format!("LLM API error {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| DigestError::Summarization(format!("Failed to parse LLM response: {}", e)))
    }
}

fn summary_prompt(content: &str, max_length: usize) -> String {
    format!(
        "Summarize the following technical article in about {max_length} characters. \
Focus on the technical points and keep concrete, useful details.

Article:
{content}

Summary (about {max_length} characters):"
    )
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    fn name(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, content: &str, max_length: usize) -> Result<String> {
        let request = LlmRequest {
            prompt: summary_prompt(content, max_length),
            // Output budget in tokens is loose relative to the character target
            max_tokens: Some(max_length * 2),
            temperature: None,
            timeout_seconds: None,
        };

        let response = self.generate(request).await?;
        let summary = response.content.trim().to_string();
        if summary.is_empty() {
            warn!(model = %response.model, "LLM returned an empty summary");
            return Err(DigestError::Summarization("LLM returned an empty summary".to_string()));
        }

        info!(
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            chars = summary.chars().count(),
            "LLM summarization successful"
        );
        Ok(summary)
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<usize>,
    #[serde(default)]
    completion_tokens: Option<usize>,
    #[serde(default)]
    total_tokens: Option<usize>,
}
