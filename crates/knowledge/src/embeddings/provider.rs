//! Embedding provider trait and factory.

use finstep_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Embeddings must be deterministic for a given text so that retrieval is
/// stable for an unchanged store.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "gemini")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Store("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
///
/// # Arguments
/// * `provider` - Provider identifier ("trigram", "gemini")
/// * `api_key` - API key (required by the Gemini provider)
pub fn create_provider(
    provider: &str,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider.to_lowercase().as_str() {
        "trigram" => {
            let provider = super::providers::trigram::TrigramProvider::default();
            Ok(Arc::new(provider))
        }

        "gemini" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("Gemini embedding provider requires an API key".to_string())
            })?;
            let provider = super::providers::gemini::GeminiEmbeddingProvider::new(key);
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, gemini",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trigram_provider() {
        let provider = create_provider("trigram", None).unwrap();
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }

    #[test]
    fn test_create_gemini_provider() {
        let provider = create_provider("gemini", Some("test-key")).unwrap();
        assert_eq!(provider.provider_name(), "gemini");
        assert_eq!(provider.dimensions(), 768);
    }

    #[test]
    fn test_gemini_requires_api_key() {
        let result = create_provider("gemini", None);
        assert!(result.is_err());
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_provider("unknown", None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider("trigram", None).unwrap();
        let embedding = provider.embed("test text").await.unwrap();
        assert_eq!(embedding.len(), 384);
    }
}
