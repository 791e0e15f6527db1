//! Corpus population for the document store.
//!
//! Population reads the reference guides from a corpus directory, embeds
//! their full text, and upserts them into the store keyed by file name.
//! Running it twice is a no-op at the document level: an unchanged file
//! overwrites itself.
//!
//! A missing corpus file is logged and skipped; population only fails when
//! no file could be read at all.

use crate::embeddings::EmbeddingProvider;
use crate::store::DocumentStore;
use crate::types::{Document, PopulationReport};
use finstep_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// File names the store is populated from, in order.
pub const REFERENCE_FILES: [&str; 3] = [
    "isa_guide.txt",
    "overdraft_guide.txt",
    "current_account_debit_card.txt",
];

/// Embed and upsert a batch of documents.
///
/// Returns the ids that were written, in input order.
pub async fn populate_documents(
    store: &DocumentStore,
    embedder: &Arc<dyn EmbeddingProvider>,
    documents: &[Document],
) -> AppResult<Vec<String>> {
    if documents.is_empty() {
        return Ok(Vec::new());
    }

    let bodies: Vec<String> = documents.iter().map(|d| d.body.clone()).collect();
    let embeddings = embedder.embed_batch(&bodies).await?;

    if embeddings.len() != documents.len() {
        return Err(AppError::Population(format!(
            "Embedder returned {} vectors for {} documents",
            embeddings.len(),
            documents.len()
        )));
    }

    let mut added = Vec::with_capacity(documents.len());
    for (document, embedding) in documents.iter().zip(embeddings.iter()) {
        store.upsert(
            document,
            embedding,
            embedder.provider_name(),
            embedder.model_name(),
        )?;
        added.push(document.id.clone());
    }

    Ok(added)
}

/// Populate the store from the reference files in `corpus_dir`.
///
/// Unreadable files are skipped with a warning. Fails only when none of
/// the reference files could be read.
pub async fn populate_from_dir(
    store: &DocumentStore,
    embedder: &Arc<dyn EmbeddingProvider>,
    corpus_dir: &Path,
) -> AppResult<PopulationReport> {
    let started = Instant::now();

    let mut documents = Vec::new();
    let mut skipped = Vec::new();

    for name in REFERENCE_FILES {
        let path = corpus_dir.join(name);
        match std::fs::read_to_string(&path) {
            Ok(body) => documents.push(Document::new(name, body)),
            Err(e) => {
                tracing::warn!("Skipping corpus file '{}': {}", path.display(), e);
                skipped.push(name.to_string());
            }
        }
    }

    if documents.is_empty() {
        return Err(AppError::Population(format!(
            "No readable corpus files in '{}' (expected {})",
            corpus_dir.display(),
            REFERENCE_FILES.join(", ")
        )));
    }

    let added = populate_documents(store, embedder, &documents).await?;
    let duration_secs = started.elapsed().as_secs_f64();

    tracing::info!(
        "Populated {} documents ({} skipped) in {:.2}s",
        added.len(),
        skipped.len(),
        duration_secs
    );

    Ok(PopulationReport {
        added,
        skipped,
        duration_secs,
    })
}

/// Populate the store from `corpus_dir` only when it holds no documents.
///
/// Returns `None` when the store already has content. The check is on the
/// document count, so a store whose database file exists but is empty
/// still gets populated.
pub async fn ensure_populated(
    store: &DocumentStore,
    embedder: &Arc<dyn EmbeddingProvider>,
    corpus_dir: &Path,
) -> AppResult<Option<PopulationReport>> {
    if store.count()? > 0 {
        tracing::debug!("Store already populated, skipping corpus load");
        return Ok(None);
    }

    let report = populate_from_dir(store, embedder, corpus_dir).await?;
    Ok(Some(report))
}
