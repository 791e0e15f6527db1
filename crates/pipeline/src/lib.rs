//! Two-agent answer pipeline.
//!
//! A question is answered in three steps: the retriever picks the closest
//! reference document, the librarian drafts a student-friendly answer from
//! it, and the guardian rewrites the draft for UK compliance. Only the
//! guardian's output reaches the user.

pub mod context;
pub mod guardian;
pub mod librarian;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use context::ContextSource;
pub use guardian::Guardian;
pub use librarian::Librarian;
pub use orchestrator::{Orchestrator, PipelineAnswer};
