//! Prompt system for FinStep.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions for the two pipeline stages
//! - Compiled-in defaults with per-workspace overrides
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{load_prompt, GUARDIAN_PROMPT_ID, LIBRARIAN_PROMPT_ID};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptOutputSpec,
};
