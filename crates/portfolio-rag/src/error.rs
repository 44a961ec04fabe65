//! Error types for retrieval and answering

use thiserror::Error;
use uuid::Uuid;

/// RAG specific errors
#[derive(Debug, Error)]
pub enum RagError {
    /// Embedding backend failed
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        provider: String,
        message: String,
    },

    /// Vector index could not be built, loaded or saved
    #[error("Index error: {0}")]
    IndexError(String),

    /// An indexed document ID has no entry in the side store
    #[error("Corrupt index: doc {doc_id} missing from side store")]
    CorruptIndex {
        doc_id: Uuid,
    },

    /// Filesystem error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Chat model error while answering
    #[error("LLM error: {0}")]
    LlmError(#[from] portfolio_llm::LLMError),
}

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, RagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_index_display() {
        let id = Uuid::nil();
        let err = RagError::CorruptIndex { doc_id: id };
        assert_eq!(
            err.to_string(),
            "Corrupt index: doc 00000000-0000-0000-0000-000000000000 missing from side store"
        );
    }
}
