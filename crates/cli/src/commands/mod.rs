//! Command handlers for the FinStep CLI.

pub mod ask;
pub mod chat;
pub mod populate;
pub mod stats;

pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use populate::PopulateCommand;
pub use stats::StatsCommand;

use finstep_core::{config::AppConfig, AppResult};
use finstep_knowledge::{
    create_provider, default_store_path, ensure_populated, DocumentStore, PopulationReport,
    Retriever,
};
use finstep_llm::create_client;
use finstep_pipeline::{Guardian, Librarian, Orchestrator};
use std::sync::Arc;

/// Wire up the full answer pipeline from configuration.
///
/// Opens the store, populates it from the corpus when empty, and binds
/// both model stages to one shared client. Returns the population report
/// when a first-run load happened.
pub(crate) async fn build_pipeline(
    config: &AppConfig,
) -> AppResult<(Orchestrator, Option<PopulationReport>)> {
    config.validate()?;

    let api_key = config.resolve_api_key();

    let store = DocumentStore::open(&default_store_path(&config.workspace))?;
    let embedder = create_provider(&config.embedding_provider, api_key.as_deref())?;
    let report = ensure_populated(&store, &embedder, &config.corpus_dir()).await?;

    let client = create_client(&config.provider, config.endpoint.as_deref(), api_key.as_deref())?;
    let librarian = Librarian::new(
        client.clone(),
        config.draft_model.clone(),
        &config.workspace,
    );
    let guardian = Guardian::new(client, config.review_model.clone(), &config.workspace);
    let retriever = Retriever::new(store, embedder);

    let orchestrator = Orchestrator::new(Arc::new(retriever), librarian, guardian);
    Ok((orchestrator, report))
}
