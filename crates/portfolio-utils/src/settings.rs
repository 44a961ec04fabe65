//! Environment-driven settings shared across the workspace

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default path of the ingestion output file.
pub const DEFAULT_SUMMARIES_FILE: &str = "summaries.json";

/// Default directory holding the persisted vector index and side store.
pub const DEFAULT_INDEX_DIR: &str = "vector_index";

/// Runtime settings for the assistant
///
/// Every field has a sensible default; environment variables override
/// individual entries so deployments can retarget models or paths without
/// code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Chat/vision model used by the agents and the RAG chain
    pub chat_model: String,
    /// Local model used for structured table extraction
    pub extraction_model: String,
    /// Embedding model for the vector index
    pub embedding_model: String,
    /// Where ingestion writes its summary records
    pub summaries_path: PathBuf,
    /// Where the vector index and side store are persisted
    pub index_dir: PathBuf,
    /// Number of documents retrieved per question
    pub top_k: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chat_model: "gpt-4o-mini".to_string(),
            extraction_model: "gemma:2b-instruct".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            summaries_path: PathBuf::from(DEFAULT_SUMMARIES_FILE),
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            top_k: 4,
        }
    }
}

impl Settings {
    /// Build settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Ok(model) = std::env::var("PORTFOLIO_CHAT_MODEL") {
            settings.chat_model = model;
        }
        if let Ok(model) = std::env::var("PORTFOLIO_EXTRACTION_MODEL") {
            settings.extraction_model = model;
        }
        if let Ok(model) = std::env::var("PORTFOLIO_EMBEDDING_MODEL") {
            settings.embedding_model = model;
        }
        if let Ok(path) = std::env::var("PORTFOLIO_SUMMARIES_PATH") {
            settings.summaries_path = PathBuf::from(path);
        }
        if let Ok(dir) = std::env::var("PORTFOLIO_INDEX_DIR") {
            settings.index_dir = PathBuf::from(dir);
        }
        if let Ok(k) = std::env::var("PORTFOLIO_TOP_K") {
            if let Ok(k) = k.parse() {
                settings.top_k = k;
            }
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.chat_model, "gpt-4o-mini");
        assert_eq!(settings.summaries_path, PathBuf::from("summaries.json"));
        assert_eq!(settings.index_dir, PathBuf::from("vector_index"));
        assert_eq!(settings.top_k, 4);
    }
}
