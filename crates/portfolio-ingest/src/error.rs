//! Error types for PDF ingestion

use thiserror::Error;

/// Ingestion specific errors
#[derive(Debug, Error)]
pub enum IngestError {
    /// PDF could not be read or parsed
    #[error("PDF error: {0}")]
    PdfError(String),

    /// Filesystem error while reading input or writing summaries
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Partition service returned an unusable response
    #[error("Partition error: {0}")]
    PartitionError(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// LLM provider error
    #[error("LLM error: {0}")]
    LlmError(#[from] portfolio_llm::LLMError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

impl From<pdf_extract::OutputError> for IngestError {
    fn from(err: pdf_extract::OutputError) -> Self {
        IngestError::PdfError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::PdfError("encrypted document".to_string());
        assert_eq!(err.to_string(), "PDF error: encrypted document");

        let err = IngestError::PartitionError("empty element list".to_string());
        assert_eq!(err.to_string(), "Partition error: empty element list");
    }
}
