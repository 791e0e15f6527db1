//! Stats command handler.
//!
//! Shows knowledge store statistics.

use clap::Args;
use finstep_core::{config::AppConfig, AppResult};
use finstep_knowledge::{default_store_path, DocumentStore};

/// Show knowledge store statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    /// Execute the stats command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = DocumentStore::open(&default_store_path(&config.workspace))?;
        let stats = store.stats()?;

        if self.json {
            let output = serde_json::json!({
                "documentsCount": stats.documents_count,
                "dbSizeBytes": stats.db_size_bytes,
                "embeddingProvider": stats.provider,
                "embeddingModel": stats.model,
                "dimensions": stats.dimensions,
                "newestAddedAt": stats.newest_added_at,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Knowledge store");
            println!("  Documents: {}", stats.documents_count);
            println!("  DB size: {} bytes", stats.db_size_bytes);
            if let (Some(provider), Some(model)) = (&stats.provider, &stats.model) {
                println!(
                    "  Embeddings: {} / {} ({} dims)",
                    provider,
                    model,
                    stats.dimensions.unwrap_or(0)
                );
            }
            if let Some(newest) = &stats.newest_added_at {
                println!("  Last populated: {}", newest);
            }
        }

        Ok(())
    }
}
