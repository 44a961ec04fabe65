//! Cosine-similarity vector index with JSON persistence

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

const INDEX_FILE: &str = "index.json";

/// One indexed document: its ID and embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Document ID, resolvable through the side store
    pub doc_id: Uuid,
    /// Embedding of the document's retrievable content
    pub embedding: Vec<f32>,
}

/// Flat in-memory vector index searched by cosine similarity
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document embedding to the index
    pub fn insert(&mut self, doc_id: Uuid, embedding: Vec<f32>) {
        self.entries.push(IndexEntry { doc_id, embedding });
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all indexed document IDs
    pub fn doc_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.entries.iter().map(|e| e.doc_id)
    }

    /// Return up to `top_k` document IDs by similarity to `query`, best first
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(Uuid, f32)> {
        let mut scored: Vec<(Uuid, f32)> = self
            .entries
            .iter()
            .map(|e| (e.doc_id, cosine_similarity(&e.embedding, query)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        scored
    }

    /// Save the index as `index.json` under `dir`
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string(self)?;
        std::fs::write(dir.join(INDEX_FILE), json)?;
        Ok(())
    }

    /// Load an index from `index.json` under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(INDEX_FILE);
        let data = std::fs::read_to_string(&path).map_err(|e| {
            RagError::IndexError(format!("cannot read {}: {e}", path.display()))
        })?;
        let index = serde_json::from_str(&data)?;
        Ok(index)
    }

    /// Whether a persisted index exists under `dir`
    pub fn exists(dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(INDEX_FILE).is_file()
    }
}

/// Cosine similarity of two vectors; 0.0 when either has zero magnitude
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = VectorIndex::new();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        index.insert(far, vec![0.0, 1.0]);
        index.insert(near, vec![1.0, 0.1]);

        let hits = index.search(&[1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, near);
        assert!(hits[0].1 > hits[1].1);
    }

    #[test]
    fn test_search_truncates_to_top_k() {
        let mut index = VectorIndex::new();
        for _ in 0..10 {
            index.insert(Uuid::new_v4(), vec![1.0, 0.0]);
        }
        assert_eq!(index.search(&[1.0, 0.0], 4).len(), 4);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let mut index = VectorIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, vec![0.5, 0.5]);

        index.save(dir.path()).unwrap();
        assert!(VectorIndex::exists(dir.path()));

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.search(&[0.5, 0.5], 1)[0].0, id);
    }

    #[test]
    fn test_load_missing_index() {
        let dir = tempdir().unwrap();
        assert!(!VectorIndex::exists(dir.path()));
        assert!(VectorIndex::load(dir.path()).is_err());
    }
}
