//! SQLite-backed document store with embedding search.
//!
//! Each row holds one whole reference document and the embedding computed
//! from its body at insertion time. The corpus is small (a handful of
//! guides), so similarity search is a brute-force cosine scan over all rows
//! rather than an approximate index.

use crate::types::{Document, SearchHit, StoreStats, StoredDocument};
use chrono::{DateTime, Utc};
use finstep_core::{AppError, AppResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Persistent document store.
///
/// Writes happen only during population; queries are read-only and the CLI
/// orders population strictly before the first search. The connection is
/// behind a mutex, so access is serialized; with a corpus of a few
/// documents that costs nothing and keeps the store usable from shared
/// async contexts.
pub struct DocumentStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

/// Default store location inside a workspace.
pub fn default_store_path(workspace: &Path) -> PathBuf {
    workspace.join(".finstep").join("knowledge").join("index.sqlite")
}

impl DocumentStore {
    /// Open (or create) the store at the given path.
    ///
    /// Creates parent directories and the schema if they do not exist.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Store(format!("Failed to create store directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open document store: {}", e)))?;
        init_schema(&conn)?;

        tracing::debug!("Opened document store at {:?}", db_path);

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: db_path.to_path_buf(),
        })
    }

    /// Open an in-memory store (tests).
    pub fn open_in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory store: {}", e)))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: PathBuf::from(":memory:"),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("Document store lock poisoned".to_string()))
    }

    /// Insert or replace a document with its embedding.
    ///
    /// Keyed on document id: re-adding an existing id overwrites the stored
    /// row, so the store never holds two retrievable copies under one id.
    pub fn upsert(
        &self,
        document: &Document,
        embedding: &[f32],
        provider: &str,
        model: &str,
    ) -> AppResult<()> {
        let embedding_bytes = embedding_to_bytes(embedding);

        self.lock()?
            .execute(
                "INSERT OR REPLACE INTO documents
                 (id, body, embedding, content_hash, provider, model, dimensions, added_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    document.id,
                    document.body,
                    embedding_bytes,
                    document.content_hash(),
                    provider,
                    model,
                    embedding.len() as i64,
                    Utc::now().to_rfc3339(),
                ],
            )
            .map_err(|e| AppError::Store(format!("Failed to insert document: {}", e)))?;

        tracing::debug!(document = %document.id, "Stored document");
        Ok(())
    }

    /// Number of stored documents.
    pub fn count(&self) -> AppResult<u32> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM documents", [], |row| {
                row.get::<_, i64>(0).map(|v| v as u32)
            })
            .map_err(|e| AppError::Store(format!("Failed to count documents: {}", e)))
    }

    /// Fetch one document by id.
    pub fn get(&self, id: &str) -> AppResult<Option<StoredDocument>> {
        self.lock()?
            .query_row(
                "SELECT id, body, content_hash, provider, model, dimensions, added_at
                 FROM documents WHERE id = ?1",
                params![id],
                |row| {
                    Ok(StoredDocument {
                        id: row.get(0)?,
                        body: row.get(1)?,
                        content_hash: row.get(2)?,
                        provider: row.get(3)?,
                        model: row.get(4)?,
                        dimensions: row.get::<_, i64>(5)? as usize,
                        added_at: parse_timestamp(row.get::<_, String>(6)?),
                    })
                },
            )
            .optional()
            .map_err(|e| AppError::Store(format!("Failed to fetch document: {}", e)))
    }

    /// Find the single nearest document to the query embedding.
    ///
    /// Returns `None` when the store is empty. A dimension mismatch between
    /// the query embedding and a stored embedding is a consistency error
    /// (the store was populated with a different embedding model), not a
    /// low score.
    pub fn nearest(&self, query_embedding: &[f32]) -> AppResult<Option<SearchHit>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT id, body, embedding FROM documents")
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let rows = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let body: String = row.get(1)?;
                let embedding_bytes: Vec<u8> = row.get(2)?;
                Ok((id, body, embedding_bytes))
            })
            .map_err(|e| AppError::Store(format!("Failed to query documents: {}", e)))?;

        let mut best: Option<SearchHit> = None;

        for row in rows {
            let (id, body, embedding_bytes) =
                row.map_err(|e| AppError::Store(format!("Failed to read document row: {}", e)))?;

            let embedding = bytes_to_embedding(&embedding_bytes)?;
            if embedding.len() != query_embedding.len() {
                return Err(AppError::Store(format!(
                    "Embedding dimension mismatch for document '{}': stored {} vs query {}. \
                     Repopulate the store with the active embedding provider.",
                    id,
                    embedding.len(),
                    query_embedding.len()
                )));
            }

            let score = cosine_similarity(query_embedding, &embedding);
            let better = match &best {
                Some(hit) => score > hit.score,
                None => true,
            };
            if better {
                best = Some(SearchHit { id, body, score });
            }
        }

        Ok(best)
    }

    /// Statistics for the store.
    pub fn stats(&self) -> AppResult<StoreStats> {
        let documents_count = self.count()?;

        let db_size_bytes = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        // Aggregate over an empty table yields a NULL row, so only read the
        // embedding metadata when documents exist.
        let row: Option<(String, String, i64, String)> = if documents_count > 0 {
            self.lock()?
                .query_row(
                    "SELECT provider, model, dimensions, MAX(added_at) FROM documents",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()
                .map_err(|e| AppError::Store(format!("Failed to read store stats: {}", e)))?
        } else {
            None
        };

        let (provider, model, dimensions, newest_added_at) = match row {
            Some((provider, model, dimensions, newest)) => (
                Some(provider),
                Some(model),
                Some(dimensions as usize),
                Some(parse_timestamp(newest)),
            ),
            None => (None, None, None, None),
        };

        Ok(StoreStats {
            documents_count,
            db_size_bytes,
            provider,
            model,
            dimensions,
            newest_added_at,
        })
    }

    /// Delete all stored documents.
    pub fn reset(&self) -> AppResult<()> {
        self.lock()?
            .execute("DELETE FROM documents", [])
            .map_err(|e| AppError::Store(format!("Failed to reset store: {}", e)))?;

        tracing::info!("Reset document store");
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id TEXT PRIMARY KEY,
            body TEXT NOT NULL,
            embedding BLOB NOT NULL,
            content_hash TEXT NOT NULL,
            provider TEXT NOT NULL,
            model TEXT NOT NULL,
            dimensions INTEGER NOT NULL,
            added_at TEXT NOT NULL
        );
        "#,
    )
    .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))
}

fn parse_timestamp(raw: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Store("Invalid embedding bytes length".to_string()));
    }

    let mut embedding = Vec::with_capacity(bytes.len() / 4);
    for chunk in bytes.chunks_exact(4) {
        let value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        embedding.push(value);
    }

    Ok(embedding)
}

/// Calculate cosine similarity between two vectors of equal length.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn doc(id: &str, body: &str) -> Document {
        Document::new(id, body)
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let db_path = default_store_path(temp.path());
        assert!(!db_path.exists());

        let store = DocumentStore::open(&db_path).unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert!(db_path.exists());
    }

    #[test]
    fn test_upsert_and_nearest() {
        let store = DocumentStore::open_in_memory().unwrap();

        store
            .upsert(&doc("a.txt", "isa savings"), &[1.0, 0.0, 0.0], "trigram", "trigram-v1")
            .unwrap();
        store
            .upsert(&doc("b.txt", "overdraft fees"), &[0.0, 1.0, 0.0], "trigram", "trigram-v1")
            .unwrap();

        let hit = store.nearest(&[0.9, 0.1, 0.0]).unwrap().unwrap();
        assert_eq!(hit.id, "a.txt");
        assert_eq!(hit.body, "isa savings");
        assert!(hit.score > 0.9);
    }

    #[test]
    fn test_nearest_on_empty_store() {
        let store = DocumentStore::open_in_memory().unwrap();
        let hit = store.nearest(&[1.0, 0.0, 0.0]).unwrap();
        assert!(hit.is_none());
    }

    #[test]
    fn test_upsert_same_id_overwrites() {
        let store = DocumentStore::open_in_memory().unwrap();

        store
            .upsert(&doc("a.txt", "old body"), &[1.0, 0.0], "trigram", "trigram-v1")
            .unwrap();
        store
            .upsert(&doc("a.txt", "new body"), &[0.0, 1.0], "trigram", "trigram-v1")
            .unwrap();

        assert_eq!(store.count().unwrap(), 1);
        let stored = store.get("a.txt").unwrap().unwrap();
        assert_eq!(stored.body, "new body");
    }

    #[test]
    fn test_dimension_mismatch_is_error() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .upsert(&doc("a.txt", "text"), &[1.0, 0.0, 0.0], "trigram", "trigram-v1")
            .unwrap();

        let err = store.nearest(&[1.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[test]
    fn test_stats_reflect_rows() {
        let temp = TempDir::new().unwrap();
        let store = DocumentStore::open(&temp.path().join("index.sqlite")).unwrap();

        let empty = store.stats().unwrap();
        assert_eq!(empty.documents_count, 0);
        assert!(empty.provider.is_none());

        store
            .upsert(&doc("a.txt", "text"), &[1.0, 0.0], "trigram", "trigram-v1")
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.documents_count, 1);
        assert_eq!(stats.provider.as_deref(), Some("trigram"));
        assert_eq!(stats.model.as_deref(), Some("trigram-v1"));
        assert_eq!(stats.dimensions, Some(2));
        assert!(stats.newest_added_at.is_some());
    }

    #[test]
    fn test_reset_empties_store() {
        let store = DocumentStore::open_in_memory().unwrap();
        store
            .upsert(&doc("a.txt", "text"), &[1.0], "trigram", "trigram-v1")
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);

        store.reset().unwrap();
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&c, &d) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_embedding_roundtrip() {
        let original = vec![0.25, -1.5, 3.75];
        let bytes = embedding_to_bytes(&original);
        let restored = bytes_to_embedding(&bytes).unwrap();
        assert_eq!(original, restored);
    }
}
