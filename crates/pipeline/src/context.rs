//! Context lookup abstraction for the drafting stage.

use finstep_core::AppResult;
use finstep_knowledge::Retriever;

/// Source of background context for a question.
///
/// The orchestrator performs exactly one lookup per question and forwards
/// whatever comes back into the drafting prompt, sentinel included. Tests
/// substitute scripted sources; production wires in the store-backed
/// [`Retriever`].
#[async_trait::async_trait]
pub trait ContextSource: Send + Sync {
    /// Return the context block for a query.
    async fn context_for(&self, query: &str) -> AppResult<String>;
}

#[async_trait::async_trait]
impl ContextSource for Retriever {
    async fn context_for(&self, query: &str) -> AppResult<String> {
        self.search(query).await
    }
}
