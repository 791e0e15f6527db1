//! Single-document retrieval over the store.

use crate::embeddings::EmbeddingProvider;
use crate::store::DocumentStore;
use crate::types::SearchHit;
use finstep_core::AppResult;
use std::sync::Arc;

/// Context handed to the draft stage when the store has nothing to offer.
///
/// An empty store is a normal condition, not an error. The sentinel flows
/// into the draft prompt like any other context, and the draft model is
/// instructed to admit the gap.
pub const NO_INFORMATION_SENTINEL: &str = "No information found.";

/// Retrieves the single closest document for a query.
pub struct Retriever {
    store: DocumentStore,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever over an open store.
    pub fn new(store: DocumentStore, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Access the underlying store.
    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Embed the query and return the nearest document, if any.
    pub async fn search_hit(&self, query: &str) -> AppResult<Option<SearchHit>> {
        let embedding = self.embedder.embed(query).await?;
        let hit = self.store.nearest(&embedding)?;

        match &hit {
            Some(hit) => {
                tracing::debug!(doc_id = %hit.id, score = hit.score, "Retrieved context document")
            }
            None => tracing::debug!("Store is empty, no context retrieved"),
        }

        Ok(hit)
    }

    /// Return the nearest document body, or the sentinel when the store
    /// is empty.
    ///
    /// The nearest document is always used as context, however weak the
    /// match. There is no similarity cutoff.
    pub async fn search(&self, query: &str) -> AppResult<String> {
        Ok(self
            .search_hit(query)
            .await?
            .map(|hit| hit.body)
            .unwrap_or_else(|| NO_INFORMATION_SENTINEL.to_string()))
    }
}
