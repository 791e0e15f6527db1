//! Two-stage answer pipeline.

use crate::context::ContextSource;
use crate::guardian::Guardian;
use crate::librarian::Librarian;
use finstep_core::AppResult;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Everything one pipeline run produced.
///
/// `answer` is the text to show the user. The intermediate `context` and
/// `draft` are kept for diagnostics and never serialized; only the
/// reviewed answer leaves the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineAnswer {
    pub question: String,

    /// Internal: retrieved context the draft was grounded on.
    #[serde(skip_serializing)]
    pub context: String,

    /// Internal: unreviewed draft text.
    #[serde(skip_serializing)]
    pub draft: String,

    pub answer: String,
    pub duration_secs: f64,
}

/// Runs one question through retrieval, drafting, and review.
///
/// The orchestrator holds no conversation state. Chat history lives with
/// the caller; every `answer` call is a fresh retrieval and a fresh pair
/// of model calls.
pub struct Orchestrator {
    context: Arc<dyn ContextSource>,
    librarian: Librarian,
    guardian: Guardian,
}

impl Orchestrator {
    /// Assemble the pipeline from its three collaborators.
    pub fn new(context: Arc<dyn ContextSource>, librarian: Librarian, guardian: Guardian) -> Self {
        Self {
            context,
            librarian,
            guardian,
        }
    }

    /// Answer one question.
    ///
    /// Stages run strictly in order and each failure aborts the run, so a
    /// failed draft never reaches review.
    pub async fn answer(&self, question: &str) -> AppResult<PipelineAnswer> {
        let started = Instant::now();

        tracing::info!("Retrieving context");
        let context = self.context.context_for(question).await?;

        tracing::info!("Drafting answer");
        let draft = self.librarian.draft(question, &context).await?;

        tracing::info!("Reviewing draft");
        let answer = self.guardian.review(&draft).await?;

        let duration_secs = started.elapsed().as_secs_f64();
        tracing::info!("Answer ready in {:.2}s", duration_secs);

        Ok(PipelineAnswer {
            question: question.to_string(),
            context,
            draft,
            answer,
            duration_secs,
        })
    }
}
