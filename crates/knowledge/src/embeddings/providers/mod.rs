//! Embedding provider implementations.

pub mod gemini;
pub mod trigram;
