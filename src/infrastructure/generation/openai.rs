use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::generation::{FallbackGenerator, Generation};
use crate::domain::DomainError;
use crate::infrastructure::http::HttpClientTrait;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Fallback generator backed by `/v1/chat/completions`
///
/// Confidence comes from the finish reason: a natural stop earns the
/// configured confidence, a truncated answer half of it and a filtered
/// answer none.
#[derive(Debug)]
pub struct OpenAiGenerator<C: HttpClientTrait> {
    client: C,
    auth_header: String,
    base_url: String,
    model: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    confidence: f64,
}

impl<C: HttpClientTrait> OpenAiGenerator<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, api_key, DEFAULT_OPENAI_BASE_URL)
    }

    pub fn with_base_url(
        client: C,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = format!("Bearer {}", api_key.into());
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
            model: DEFAULT_CHAT_MODEL.to_string(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            confidence: DEFAULT_CONFIDENCE,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        vec![
            ("Authorization", self.auth_header.as_str()),
            ("Content-Type", "application/json"),
        ]
    }

    fn build_request(&self, query: &str) -> serde_json::Value {
        let mut messages = Vec::new();

        if let Some(ref prompt) = self.system_prompt {
            messages.push(serde_json::json!({"role": "system", "content": prompt}));
        }
        messages.push(serde_json::json!({"role": "user", "content": query}));

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
        });

        if let Some(temperature) = self.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        body
    }

    fn parse_response(&self, json: serde_json::Value) -> Result<Generation, DomainError> {
        let response: OpenAiChatResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse chat response: {}", e))
        })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::provider("openai", "No choices in response"))?;

        let text = choice.message.content.unwrap_or_default();
        let confidence = self.confidence_for(choice.finish_reason.as_deref());

        Ok(Generation::new(text.trim(), confidence))
    }

    fn confidence_for(&self, finish_reason: Option<&str>) -> f64 {
        match finish_reason {
            Some("length") => self.confidence / 2.0,
            Some("content_filter") => 0.0,
            _ => self.confidence,
        }
    }
}

#[async_trait]
impl<C: HttpClientTrait> FallbackGenerator for OpenAiGenerator<C> {
    async fn generate(&self, query: &str) -> Result<Generation, DomainError> {
        debug!(model = %self.model, "Requesting fallback generation");

        let response = self
            .client
            .post_json(&self.chat_completions_url(), self.headers(), &self.build_request(query))
            .await?;

        self.parse_response(response)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}
