//! Ask command handler.
//!
//! Answers a single question and exits.

use clap::Args;
use finstep_core::{config::AppConfig, AppResult};

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");

        let (orchestrator, report) = super::build_pipeline(config).await?;
        if let Some(report) = report {
            tracing::info!(
                "Populated knowledge store with {} documents",
                report.added.len()
            );
        }

        let result = orchestrator.answer(&self.question).await?;

        if self.json {
            let output = serde_json::json!({
                "question": result.question,
                "answer": result.answer,
                "provider": config.provider,
                "draftModel": config.draft_model,
                "reviewModel": config.review_model,
                "durationSecs": result.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", result.answer);
        }

        Ok(())
    }
}
