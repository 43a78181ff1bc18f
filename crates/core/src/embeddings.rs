use crate::QueryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Text-to-vector capability. Vectors from one embedder instance always have
/// `dimensions()` components.
#[async_trait]
pub trait Embedder {
    fn dimensions(&self) -> usize;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError>;
}

pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    base_url: Url,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
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
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    pub fn from_env(api_base: &str) -> Result<Self, QueryError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| QueryError::BackendResponse {
            backend: "openai".to_string(),
            details: "OPENAI_API_KEY environment variable not set".to_string(),
        })?;
        Self::new(api_key, api_base)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, QueryError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url.as_str().trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: vec![text],
            })
            .send()
            .await
            .map_err(|error| QueryError::from_http("openai", error))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(QueryError::BackendResponse {
                backend: "openai".to_string(),
                details: crate::generation::api_error_detail(status, &body),
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|error| QueryError::from_http("openai", error))?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|item| item.embedding)
            .ok_or_else(|| QueryError::BackendResponse {
                backend: "openai".to_string(),
                details: "embeddings response held no vectors".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let result = OpenAiEmbedder::new("  ", DEFAULT_API_BASE);
        assert!(matches!(result, Err(QueryError::BackendResponse { .. })));
    }

    #[test]
    fn malformed_api_base_is_rejected() {
        let result = OpenAiEmbedder::new("sk-test", "not a url");
        assert!(matches!(result, Err(QueryError::Url(_))));
    }

    #[test]
    fn default_dimensions_match_the_default_model() {
        let embedder = OpenAiEmbedder::new("sk-test", DEFAULT_API_BASE).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
    }
}
