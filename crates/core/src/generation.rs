use crate::traits::Generator;
use crate::QueryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Chat-completions client used as the answer generator. Temperature is
/// pinned to zero so repeated questions over the same context stay stable.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>, api_base: &str) -> Result<Self, QueryError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(QueryError::BackendResponse {
                backend: "openai".to_string(),
                details: "api key must not be empty".to_string(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| QueryError::from_http("openai", error))?;

        Ok(Self {
            client,
            api_key,
            base_url: Url::parse(api_base)?,
            model: DEFAULT_CHAT_MODEL.to_string(),
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Pulls the human-readable message out of an OpenAI error body, falling
/// back to the raw body when it is not the documented JSON shape.
pub(crate) fn api_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<ApiErrorResponse>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| body.to_string());
    format!("{status}: {detail}")
}

#[async_trait]
impl Generator for OpenAiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, QueryError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: 0.0,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.base_url.as_str().trim_end_matches('/')
            ))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|error| QueryError::from_http("openai", error))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::BackendResponse {
                backend: "openai".to_string(),
                details: api_error_detail(status, &body),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|error| QueryError::from_http("openai", error))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| QueryError::BackendResponse {
                backend: "openai".to_string(),
                details: "chat response held no choices".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_detail_prefers_the_api_message() {
        let body = r#"{"error": {"message": "Rate limit reached", "type": "requests"}}"#;
        let detail = api_error_detail(reqwest::StatusCode::TOO_MANY_REQUESTS, body);
        assert!(detail.contains("Rate limit reached"));
        assert!(detail.contains("429"));
    }

    #[test]
    fn error_detail_falls_back_to_the_raw_body() {
        let detail = api_error_detail(reqwest::StatusCode::BAD_GATEWAY, "upstream unavailable");
        assert!(detail.contains("upstream unavailable"));
    }

    #[test]
    fn empty_api_key_is_rejected() {
        let result = OpenAiGenerator::new("", crate::embeddings::DEFAULT_API_BASE);
        assert!(matches!(result, Err(QueryError::BackendResponse { .. })));
    }
}
