//! Knowledge store type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A reference document to be stored.
///
/// The id is derived from the source filename and is unique within the
/// store; the body is the full text of the reference file. Documents are
/// immutable once stored and are only created during population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Unique document identifier (source filename)
    pub id: String,

    /// Full text body
    pub body: String,
}

impl Document {
    /// Create a new document.
    pub fn new(id: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            body: body.into(),
        }
    }

    /// SHA-256 hash of the body, hex-encoded.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.body.as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// A document row as stored, with its embedding metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique document identifier
    pub id: String,

    /// Full text body
    pub body: String,

    /// SHA-256 hash of the body at insertion time
    pub content_hash: String,

    /// Embedding provider that produced the stored vector
    pub provider: String,

    /// Embedding model identifier
    pub model: String,

    /// Embedding vector dimension
    pub dimensions: usize,

    /// When this document was inserted
    pub added_at: DateTime<Utc>,
}

/// A nearest-neighbor search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Document identifier
    pub id: String,

    /// Document body
    pub body: String,

    /// Cosine similarity to the query embedding
    pub score: f32,
}

/// Statistics for the document store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of stored documents
    pub documents_count: u32,

    /// Database file size in bytes
    pub db_size_bytes: u64,

    /// Embedding provider recorded on the stored rows (if any)
    pub provider: Option<String>,

    /// Embedding model recorded on the stored rows (if any)
    pub model: Option<String>,

    /// Embedding dimension recorded on the stored rows (if any)
    pub dimensions: Option<usize>,

    /// Most recent insertion timestamp
    pub newest_added_at: Option<DateTime<Utc>>,
}

/// Outcome of a population run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationReport {
    /// Ids of documents written to the store
    pub added: Vec<String>,

    /// Filenames skipped because the source file was missing
    pub skipped: Vec<String>,

    /// Duration in seconds
    pub duration_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        let a = Document::new("isa_guide.txt", "An ISA shelters savings from tax.");
        let b = Document::new("other_id.txt", "An ISA shelters savings from tax.");

        // Hash depends only on the body
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);
    }

    #[test]
    fn test_content_hash_differs_for_different_bodies() {
        let a = Document::new("isa_guide.txt", "text one");
        let b = Document::new("isa_guide.txt", "text two");
        assert_ne!(a.content_hash(), b.content_hash());
    }
}
