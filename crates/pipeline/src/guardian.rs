//! Compliance review stage.
//!
//! The guardian rewrites the draft so it informs without giving regulated
//! financial advice. It sees only the draft text. The original question and
//! the retrieved context are withheld so the review cannot drift back to
//! source material the draft already consumed.

use finstep_core::AppResult;
use finstep_llm::{LlmClient, LlmRequest};
use finstep_prompt::{build_prompt, load_prompt, GUARDIAN_PROMPT_ID};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Second pipeline stage: rewrite a draft into the compliant final answer.
pub struct Guardian {
    client: Arc<dyn LlmClient>,
    model: String,
    workspace: PathBuf,
}

impl Guardian {
    /// Create a review stage bound to a model.
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

    /// Review a draft and return the final answer.
    pub async fn review(&self, draft: &str) -> AppResult<String> {
        let definition = load_prompt(&self.workspace, GUARDIAN_PROMPT_ID)?;

        let mut variables = HashMap::new();
        variables.insert("draft".to_string(), draft.to_string());
        let built = build_prompt(&definition, variables)?;

        tracing::debug!(model = %self.model, draft_chars = draft.len(), "Reviewing draft");

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        if !response.done {
            tracing::warn!(model = %response.model, "Review stopped before a natural end");
        }

        Ok(response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;
    use std::path::Path;

    #[tokio::test]
    async fn test_review_embeds_draft_and_rules() {
        let client = Arc::new(ScriptedClient::new(vec![Ok("Final answer")]));
        let guardian = Guardian::new(client.clone(), "gemini-2.5-pro", Path::new("."));

        let answer = guardian
            .review("**The Short Answer:** Yes, you should buy it!")
            .await
            .unwrap();

        assert_eq!(answer, "Final answer");
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].model, "gemini-2.5-pro");
        assert!(calls[0]
            .prompt
            .contains("DRAFT ANSWER: **The Short Answer:** Yes, you should buy it!"));
        assert!(calls[0].prompt.contains("NO DIRECT ADVICE"));
        assert!(calls[0]
            .prompt
            .contains("If the draft says \"I don't know,\" leave it alone."));
        assert!(calls[0].prompt.contains("FINAL COMPLIANT OUTPUT:"));
        assert!(calls[0]
            .system
            .as_deref()
            .unwrap_or("")
            .contains("Compliance Officer"));
    }

    #[tokio::test]
    async fn test_review_payload_excludes_question_and_context() {
        let client = Arc::new(ScriptedClient::new(vec![Ok("Final answer")]));
        let guardian = Guardian::new(client.clone(), "gemini-2.5-pro", Path::new("."));

        guardian.review("Just the draft text.").await.unwrap();

        let calls = client.calls();
        assert!(!calls[0].prompt.contains("QUESTION:"));
        assert!(!calls[0].prompt.contains("CONTEXT:"));
    }

    #[tokio::test]
    async fn test_review_propagates_client_error() {
        let client = Arc::new(ScriptedClient::new(vec![Err("quota exceeded")]));
        let guardian = Guardian::new(client, "gemini-2.5-pro", Path::new("."));

        let result = guardian.review("Draft.").await;
        assert!(result.is_err());
    }
}
