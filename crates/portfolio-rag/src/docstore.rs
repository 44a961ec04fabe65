//! Side store mapping document IDs to retrievable content

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use uuid::Uuid;

const DOCSTORE_FILE: &str = "docstore.json";

/// Maps each indexed document ID to the content handed to the answer chain
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SideStore {
    docs: HashMap<Uuid, String>,
}

impl SideStore {
    /// Create an empty side store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store content under a document ID
    pub fn insert(&mut self, doc_id: Uuid, content: String) {
        self.docs.insert(doc_id, content);
    }

    /// Look up content by document ID
    pub fn get(&self, doc_id: &Uuid) -> Option<&str> {
        self.docs.get(doc_id).map(String::as_str)
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Iterate over all stored document IDs
    pub fn doc_ids(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.docs.keys().copied()
    }

    /// Save the store as `docstore.json` under `dir`
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let json = serde_json::to_string(self)?;
        std::fs::write(dir.join(DOCSTORE_FILE), json)?;
        Ok(())
    }

    /// Load a store from `docstore.json` under `dir`
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(DOCSTORE_FILE);
        let data = std::fs::read_to_string(&path).map_err(|e| {
            RagError::IndexError(format!("cannot read {}: {e}", path.display()))
        })?;
        let store = serde_json::from_str(&data)?;
        Ok(store)
    }

    /// Whether a persisted store exists under `dir`
    pub fn exists(dir: impl AsRef<Path>) -> bool {
        dir.as_ref().join(DOCSTORE_FILE).is_file()
    }
}
