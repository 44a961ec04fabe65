//! Table-to-purchase-entry extraction via an LLM
//!
//! The extraction model receives one table at a time and must answer with
//! a JSON array only. Models frequently wrap the array in a ```json fence
//! anyway, so the parser accepts both forms. Any failure downgrades to an
//! empty result with a warning; a malformed table never aborts ingestion.

use crate::summary::PurchaseEntry;
use minijinja::{Environment, context};
use portfolio_llm::{CompletionRequest, LLMProvider, Message};
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::warn;

const EXTRACTION_PROMPT: &str = "\
You are a data extractor.

Extract the table below into a list of JSON objects with keys:
- ticker (e.g., \"MSFT\")
- purchase_date (YYYY-MM-DD format)
- price (float)
- shares (int)

Output a JSON array only. No extra text.

Table:
{{ table }}
";

static JSON_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("valid fence regex")
});

/// Strip a ```json fence if present, otherwise return the input trimmed
pub fn unfence_json(raw: &str) -> &str {
    match JSON_FENCE.captures(raw) {
        Some(caps) => caps.get(1).map(|m| m.as_str()).unwrap_or(raw.trim()),
        None => raw.trim(),
    }
}

/// Extracts purchase rows from table text using an LLM
pub struct TableExtractor {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl TableExtractor {
    /// Create a new extractor against the given provider and model
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Extract bullet summaries, one per table row
    ///
    /// Returns an empty list when the model call fails or answers with
    /// something that is not a JSON array of rows.
    pub async fn extract_bullets(&self, table: &str) -> Vec<String> {
        self.extract_entries(table)
            .await
            .iter()
            .map(PurchaseEntry::bullet)
            .collect()
    }

    /// Extract structured purchase rows from one table
    pub async fn extract_entries(&self, table: &str) -> Vec<PurchaseEntry> {
        let prompt = match render_prompt(table) {
            Ok(p) => p,
            Err(err) => {
                warn!(error = %err, "table extraction prompt failed to render");
                return Vec::new();
            }
        };

        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user(prompt))
            .max_tokens(1024)
            .build();

        let raw = match self.provider.complete(request).await {
            Ok(response) => match response.message.text() {
                Some(text) => text.to_string(),
                None => {
                    warn!("table extraction returned no text content");
                    return Vec::new();
                }
            },
            Err(err) => {
                warn!(error = %err, "table extraction call failed");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<PurchaseEntry>>(unfence_json(&raw)) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "table extraction produced invalid JSON");
                Vec::new()
            }
        }
    }
}

fn render_prompt(table: &str) -> Result<String, minijinja::Error> {
    let env = Environment::new();
    env.render_str(EXTRACTION_PROMPT, context! { table => table })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_llm::{CompletionResponse, StopReason, TokenUsage};
    use std::sync::Mutex;

    struct CannedProvider {
        replies: Mutex<Vec<String>>,
    }

    impl CannedProvider {
        fn new(replies: Vec<&str>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()),
            }
        }
    }

    #[async_trait]
    impl LLMProvider for CannedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
            let text = self.replies.lock().unwrap().pop().unwrap_or_default();
            Ok(CompletionResponse {
                message: Message::assistant(text),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[test]
    fn test_unfence_json() {
        assert_eq!(unfence_json("```json\n[1, 2]\n```"), "[1, 2]");
        assert_eq!(unfence_json("  [1, 2]  "), "[1, 2]");
        assert_eq!(unfence_json("```json [] ```"), "[]");
    }

    #[tokio::test]
    async fn test_extracts_fenced_rows() {
        let provider = Arc::new(CannedProvider::new(vec![
            "```json\n[{\"ticker\": \"MSFT\", \"purchase_date\": \"2024-05-10\", \"price\": 320.5, \"shares\": 10}]\n```",
        ]));
        let extractor = TableExtractor::new(provider, "gemma:2b-instruct");

        let bullets = extractor.extract_bullets("| MSFT | 2024-05-10 | 320.50 | 10 |").await;
        assert_eq!(bullets, vec!["- MSFT: 10 shares @ 320.5 (bought 2024-05-10)"]);
    }

    #[tokio::test]
    async fn test_well_formed_table_yields_one_entry() {
        let provider = Arc::new(CannedProvider::new(vec![
            "```json\n[{\"ticker\": \"AAPL\", \"purchase_date\": \"2023-05-10\", \"price\": 150.0, \"shares\": 5}]\n```",
        ]));
        let extractor = TableExtractor::new(provider, "gemma:2b-instruct");

        let entries = extractor
            .extract_entries("| ticker | shares | price | date |\n| AAPL | 5 | 150.0 | 2023-05-10 |")
            .await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(entries[0].shares, Some(5));
        assert_eq!(entries[0].price, Some(150.0));
        assert_eq!(
            entries[0].purchase_date,
            Some(chrono::NaiveDate::from_ymd_opt(2023, 5, 10).unwrap())
        );
    }

    #[tokio::test]
    async fn test_bare_array_without_fence() {
        let provider = Arc::new(CannedProvider::new(vec![
            "[{\"ticker\": \"AAPL\", \"purchase_date\": null, \"price\": null, \"shares\": 5}]",
        ]));
        let extractor = TableExtractor::new(provider, "gemma:2b-instruct");

        let entries = extractor.extract_entries("| AAPL | 5 |").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ticker.as_deref(), Some("AAPL"));
        assert_eq!(entries[0].shares, Some(5));
    }

    #[tokio::test]
    async fn test_invalid_json_degrades_to_empty() {
        let provider = Arc::new(CannedProvider::new(vec!["sorry, I cannot parse this"]));
        let extractor = TableExtractor::new(provider, "gemma:2b-instruct");

        let entries = extractor.extract_entries("| garbage |").await;
        assert!(entries.is_empty());
    }
}
