//! Trigram embedding provider using character trigram-based content-aware
//! embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use finstep_core::AppResult;
use std::collections::{HashMap, HashSet};

const DEFAULT_DIMENSIONS: usize = 384;

/// Trigram-based embedding provider for local, offline operation.
///
/// Generates deterministic embeddings from character trigrams and word
/// frequencies. Not semantically accurate like a neural embedding model,
/// but consistent and content-dependent, which keeps retrieval stable for
/// a fixed corpus and makes it the default for development and tests.
#[derive(Debug)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl Default for TrigramProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Split text into lowercased content words, dropping stop words and
    /// words too short to carry signal.
    fn content_words(text: &str) -> Vec<String> {
        let stop_words: HashSet<&str> = [
            "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to",
            "of", "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have",
            "has", "had", "it", "its", "their", "they", "them", "you", "your",
        ]
        .iter()
        .copied()
        .collect();

        text.to_lowercase()
            .split_whitespace()
            .filter(|w| !stop_words.contains(w) && w.len() > 2)
            .map(|w| w.to_string())
            .collect()
    }

    /// Generate a trigram-based embedding for text.
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.dimensions];

        let words = Self::content_words(text);

        let mut word_freq: HashMap<&str, u32> = HashMap::new();
        for word in &words {
            *word_freq.entry(word.as_str()).or_insert(0) += 1;
        }

        // Each unique word contributes its character trigrams plus a whole-
        // word dimension, so related texts land near each other while
        // unrelated texts spread out.
        for (word, freq) in word_freq.iter() {
            let chars: Vec<char> = word.chars().collect();
            for i in 0..chars.len().saturating_sub(2) {
                let trigram = format!(
                    "{}{}{}",
                    chars[i],
                    chars[i + 1],
                    chars.get(i + 2).unwrap_or(&' ')
                );
                let trigram_hash = trigram
                    .bytes()
                    .fold(0u64, |acc, b| acc.wrapping_mul(37).wrapping_add(b as u64));

                let dim_idx = (trigram_hash as usize) % self.dimensions;
                // sqrt scale keeps frequent words from dominating
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash as usize) % self.dimensions;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigram_provider_dimensions() {
        let provider = TrigramProvider::default();
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_single() {
        let provider = TrigramProvider::default();
        let embedding = provider.embed("individual savings account").await.unwrap();

        assert_eq!(embedding.len(), 384);

        // Verify normalization (unit vector)
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_batch() {
        let provider = TrigramProvider::default();
        let texts = vec![
            "isa savings allowance".to_string(),
            "overdraft fees charges".to_string(),
            "debit card current account".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            assert_eq!(embedding.len(), 384);

            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 0.001);
        }
    }

    #[tokio::test]
    async fn test_trigram_provider_deterministic() {
        let provider = TrigramProvider::default();
        let text = "What is a cash ISA?";

        let embedding1 = provider.embed(text).await.unwrap();
        let embedding2 = provider.embed(text).await.unwrap();

        // Same text must produce identical embeddings
        assert_eq!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_trigram_provider_different_texts() {
        let provider = TrigramProvider::default();

        let embedding1 = provider.embed("isa savings allowance").await.unwrap();
        let embedding2 = provider.embed("overdraft fees charges").await.unwrap();

        assert_ne!(embedding1, embedding2);
    }

    #[tokio::test]
    async fn test_trigram_provider_empty_text() {
        let provider = TrigramProvider::default();
        let embedding = provider.embed("").await.unwrap();

        assert_eq!(embedding.len(), 384);
        // Empty text produces the zero vector
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_trigram_provider_related_texts_score_higher() {
        let provider = TrigramProvider::default();

        let isa_doc = provider
            .embed("An ISA is an Individual Savings Account. Interest earned in an ISA is tax free up to the annual allowance.")
            .await
            .unwrap();
        let overdraft_doc = provider
            .embed("An overdraft lets a current account balance go below zero. Banks charge interest on arranged overdrafts.")
            .await
            .unwrap();
        let query = provider
            .embed("How much can I save in an ISA allowance?")
            .await
            .unwrap();

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };

        // Unit vectors, so dot product is cosine similarity
        assert!(dot(&query, &isa_doc) > dot(&query, &overdraft_doc));
    }

    #[tokio::test]
    async fn test_trigram_provider_utf8_safety() {
        let provider = TrigramProvider::default();

        let text = "Saving £1,000 in a LISA earns a 25% bonus 🎉 towards a first home!";
        let embedding = provider.embed(text).await.unwrap();

        assert_eq!(embedding.len(), 384);

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 0.001);
    }
}
