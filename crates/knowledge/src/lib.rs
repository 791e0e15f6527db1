//! Knowledge store for the reference corpus.
//!
//! Whole documents live in a local SQLite database alongside their
//! embeddings. Retrieval embeds the query and scans for the single closest
//! document; an empty store yields a sentinel string instead of an error.

pub mod embeddings;
pub mod population;
pub mod retriever;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use embeddings::{create_provider, EmbeddingProvider};
pub use population::{ensure_populated, populate_from_dir, REFERENCE_FILES};
pub use retriever::{Retriever, NO_INFORMATION_SENTINEL};
pub use store::{default_store_path, DocumentStore};
pub use types::{Document, PopulationReport, SearchHit, StoreStats, StoredDocument};
