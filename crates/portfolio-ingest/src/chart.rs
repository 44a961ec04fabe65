//! Chart image interpretation via a vision model
//!
//! Each chart image (base64 JPEG from the partition pass) is sent to a
//! vision-capable model with a fixed extraction instruction. The answer is
//! expected to be JSON, optionally fenced. A chart the model cannot read
//! is skipped with a warning.

use crate::extract::unfence_json;
use portfolio_llm::{CompletionRequest, ContentBlock, LLMProvider, Message};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

const CHART_PROMPT: &str =
    "Extract tickers, purchase date, price and shares from this chart as JSON.";

/// Interprets chart images into structured JSON
pub struct ChartAnalyzer {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl ChartAnalyzer {
    /// Create a new analyzer against the given provider and model
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Analyze one chart image, given as base64 JPEG data
    ///
    /// Returns `None` when the model call fails or its answer is not
    /// valid JSON.
    pub async fn analyze(&self, image_b64: &str) -> Option<Value> {
        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user_blocks(vec![
                ContentBlock::text(CHART_PROMPT),
                ContentBlock::jpeg_base64(image_b64),
            ]))
            .max_tokens(1024)
            .build();

        let raw = match self.provider.complete(request).await {
            Ok(response) => response.message.text().map(str::to_string),
            Err(err) => {
                warn!(error = %err, "chart analysis call failed");
                return None;
            }
        }?;

        match serde_json::from_str::<Value>(unfence_json(&raw)) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "chart analysis produced invalid JSON");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_llm::{CompletionResponse, MessageContent, StopReason, TokenUsage};

    struct FixedProvider(&'static str);

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
            // The request must carry the image as a block alongside text
            let has_image = request.messages.iter().any(|m| {
                matches!(&m.content, Some(MessageContent::Blocks(blocks))
                    if blocks.iter().any(|b| matches!(b, ContentBlock::Image { .. })))
            });
            assert!(has_image, "chart request should include an image block");

            Ok(CompletionResponse {
                message: Message::assistant(self.0),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_fenced_chart_json() {
        let analyzer = ChartAnalyzer::new(
            Arc::new(FixedProvider(
                "```json\n{\"ticker\": \"NVDA\", \"shares\": 3}\n```",
            )),
            "gpt-4o-mini",
        );
        let value = analyzer.analyze("aGVsbG8=").await.unwrap();
        assert_eq!(value["ticker"], "NVDA");
    }

    #[tokio::test]
    async fn test_unreadable_chart_is_skipped() {
        let analyzer = ChartAnalyzer::new(
            Arc::new(FixedProvider("I see a bar chart but cannot read values")),
            "gpt-4o-mini",
        );
        assert!(analyzer.analyze("aGVsbG8=").await.is_none());
    }
}
