//! Populate command handler.
//!
//! Loads the reference corpus into the knowledge store.

use clap::Args;
use finstep_core::{config::AppConfig, AppResult};
use finstep_knowledge::{create_provider, default_store_path, populate_from_dir, DocumentStore};
use std::path::PathBuf;

/// Load the reference corpus into the knowledge store
#[derive(Args, Debug)]
pub struct PopulateCommand {
    /// Delete existing documents before loading
    #[arg(long)]
    pub reset: bool,

    /// Corpus directory (default: <workspace>/corpus)
    #[arg(long)]
    pub corpus: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PopulateCommand {
    /// Execute the populate command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing populate command");

        let api_key = config.resolve_api_key();
        let store = DocumentStore::open(&default_store_path(&config.workspace))?;
        let embedder = create_provider(&config.embedding_provider, api_key.as_deref())?;

        if self.reset {
            store.reset()?;
        }

        let corpus_dir = self.corpus.clone().unwrap_or_else(|| config.corpus_dir());
        let report = populate_from_dir(&store, &embedder, &corpus_dir).await?;

        if self.json {
            let output = serde_json::json!({
                "added": report.added,
                "skipped": report.skipped,
                "documentsCount": store.count()?,
                "durationSecs": report.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Populated {} documents ({} skipped) in {:.2}s",
                report.added.len(),
                report.skipped.len(),
                report.duration_secs
            );
            for name in &report.skipped {
                println!("  skipped: {}", name);
            }
        }

        Ok(())
    }
}
