//! Drafting stage.
//!
//! The librarian answers the question in plain, student-friendly language,
//! grounded in whatever context the retriever produced. Its output is never
//! shown to the user directly; it always passes through the review stage.

use finstep_core::AppResult;
use finstep_llm::{LlmClient, LlmRequest};
use finstep_prompt::{build_prompt, load_prompt, LIBRARIAN_PROMPT_ID};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// First pipeline stage: draft an answer from question and context.
pub struct Librarian {
    client: Arc<dyn LlmClient>,
    model: String,
    workspace: PathBuf,
}

impl Librarian {
    /// Create a drafting stage bound to a model.
    pub fn new(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            workspace: workspace.into(),
        }
    }

    /// Draft an answer for `question` using `context`.
    ///
    /// The context is embedded verbatim, including the no-information
    /// sentinel when the store had nothing.
    pub async fn draft(&self, question: &str, context: &str) -> AppResult<String> {
        let definition = load_prompt(&self.workspace, LIBRARIAN_PROMPT_ID)?;

        let mut variables = HashMap::new();
        variables.insert("context".to_string(), context.to_string());
        variables.insert("question".to_string(), question.to_string());
        let built = build_prompt(&definition, variables)?;

        tracing::debug!(
            model = %self.model,
            context_chars = context.len(),
            "Drafting answer"
        );

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        if !response.done {
            tracing::warn!(model = %response.model, "Draft stopped before a natural end");
        }

        Ok(response.content)
    }
}
