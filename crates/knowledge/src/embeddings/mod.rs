//! Embedding generation for the document store.
//!
//! Providers turn text into fixed-dimension vectors. The deterministic
//! trigram provider is the default and needs no network access; the Gemini
//! provider calls the hosted embedding API.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::gemini::GeminiEmbeddingProvider;
pub use providers::trigram::TrigramProvider;
