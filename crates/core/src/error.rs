//! Error types for FinStep.
//!
//! This module defines a unified error enum covering every failure category
//! in the application: configuration, knowledge store, corpus population,
//! prompt templates, and LLM providers.
//!
//! Two conditions are deliberately NOT errors:
//! - an empty retrieval result (the retriever returns a sentinel context), and
//! - a missing corpus file during population (logged as a warning, skipped).

use thiserror::Error;

/// Unified error type for FinStep.
///
/// All fallible functions in the application return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors. Fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Knowledge store errors (cannot open, schema failure, corrupt row).
    /// Fatal at startup.
    #[error("Store error: {0}")]
    Store(String),

    /// Corpus population errors. Raised when zero corpus files could be
    /// read; individual missing files are warnings, not errors.
    #[error("Population error: {0}")]
    Population(String),

    /// LLM provider errors. Propagated to the caller per query; an
    /// interactive session survives them.
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt template errors (missing definition, bad render).
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
