//! Gemini embedding provider.
//!
//! Uses the Generative Language batch embedding endpoint:
//! https://ai.google.dev/api/embeddings

use crate::embeddings::provider::EmbeddingProvider;
use finstep_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const EMBEDDING_MODEL: &str = "text-embedding-004";
const EMBEDDING_DIMENSIONS: usize = 768;

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest {
    model: String,
    content: EmbedContent,
}

#[derive(Debug, Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Debug, Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

/// Gemini embedding provider backed by `text-embedding-004`.
#[derive(Debug)]
pub struct GeminiEmbeddingProvider {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiEmbeddingProvider {
    /// Create a new Gemini embedding provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a provider with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_batch_request(&self, texts: &[String]) -> BatchEmbedRequest {
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", EMBEDDING_MODEL),
                    content: EmbedContent {
                        parts: vec![EmbedPart { text: text.clone() }],
                    },
                })
                .collect(),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        EMBEDDING_MODEL
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(count = texts.len(), "Requesting Gemini embeddings");

        let url = format!(
            "{}/models/{}:batchEmbedContents?key={}",
            self.base_url, EMBEDDING_MODEL, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .json(&self.to_batch_request(texts))
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send embedding request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Gemini embedding API error ({}): {}",
                status, error_text
            )));
        }

        let batch: BatchEmbedResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse embedding response: {}", e)))?;

        if batch.embeddings.len() != texts.len() {
            return Err(AppError::Llm(format!(
                "Gemini returned {} embeddings for {} texts",
                batch.embeddings.len(),
                texts.len()
            )));
        }

        Ok(batch.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_metadata() {
        let provider = GeminiEmbeddingProvider::new("test-key");
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.model_name(), "text-embedding-004");
        assert_eq!(provider.dimensions(), 768);
    }

    #[test]
    fn test_batch_request_shape() {
        let provider = GeminiEmbeddingProvider::new("test-key");
        let texts = vec!["first".to_string(), "second".to_string()];

        let request = provider.to_batch_request(&texts);
        assert_eq!(request.requests.len(), 2);
        assert_eq!(request.requests[0].model, "models/text-embedding-004");
        assert_eq!(request.requests[1].content.parts[0].text, "second");
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let provider = GeminiEmbeddingProvider::new("test-key");
        let embeddings = provider.embed_batch(&[]).await.unwrap();
        assert!(embeddings.is_empty());
    }
}
