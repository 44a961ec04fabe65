//! Error types for market data and agent construction

use thiserror::Error;

/// Market data and agent errors
#[derive(Debug, Error)]
pub enum MarketError {
    /// Yahoo Finance API error
    #[error("Yahoo Finance error: {0}")]
    YahooFinanceError(String),

    /// A date argument could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// LLM provider error
    #[error("LLM error: {0}")]
    LlmError(#[from] portfolio_llm::LLMError),

    /// Retrieval error while answering a portfolio question
    #[error("Retrieval error: {0}")]
    RagError(#[from] portfolio_rag::RagError),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

/// Result type alias for market operations
pub type Result<T> = std::result::Result<T, MarketError>;

impl From<MarketError> for portfolio_core::Error {
    fn from(err: MarketError) -> Self {
        portfolio_core::Error::ProcessingFailed(err.to_string())
    }
}

impl From<portfolio_core::Error> for MarketError {
    fn from(err: portfolio_core::Error) -> Self {
        MarketError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarketError::InvalidDate("13/40/2024".to_string());
        assert_eq!(err.to_string(), "Invalid date: 13/40/2024");
    }

    #[test]
    fn test_conversion_to_core_error() {
        let err: portfolio_core::Error =
            MarketError::YahooFinanceError("timeout".to_string()).into();
        match err {
            portfolio_core::Error::ProcessingFailed(msg) => {
                assert!(msg.contains("Yahoo Finance error"));
            }
            _ => panic!("Expected ProcessingFailed"),
        }
    }
}
