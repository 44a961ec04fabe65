//! Headline sentiment classification
//!
//! Sentiment comes from the chat model asked for a strict JSON verdict.
//! Low-confidence verdicts (score below 0.7) are demoted to NEUTRAL, and
//! any classification failure falls back to NEUTRAL at 0.5 so one bad
//! headline never sinks a summary.

use portfolio_llm::{CompletionRequest, LLMProvider, Message};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Verdicts below this confidence are demoted to NEUTRAL
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

const CLASSIFY_PROMPT: &str = "\
Classify the sentiment of this financial news headline.

Respond with a JSON object only, no extra text:
{\"label\": \"POSITIVE\" | \"NEGATIVE\" | \"NEUTRAL\", \"score\": <confidence 0.0-1.0>}
";

/// Sentiment label for a headline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    /// Positive tone
    Positive,
    /// Negative tone
    Negative,
    /// Neutral or unclear tone
    Neutral,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// A classified headline verdict
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Classified label
    pub label: SentimentLabel,
    /// Model confidence in the label
    pub score: f64,
}

impl Sentiment {
    /// The fallback verdict used when classification fails
    pub fn neutral() -> Self {
        Self {
            label: SentimentLabel::Neutral,
            score: 0.5,
        }
    }

    /// Demote low-confidence verdicts to NEUTRAL
    pub fn demoted(self) -> Self {
        if self.score < CONFIDENCE_THRESHOLD {
            Self {
                label: SentimentLabel::Neutral,
                score: self.score,
            }
        } else {
            self
        }
    }
}

/// Classifies headlines through the chat model
pub struct SentimentClassifier {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl SentimentClassifier {
    /// Create a classifier against the given provider and model
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Classify one headline, applying the low-confidence demotion
    ///
    /// Never fails: classification errors fall back to NEUTRAL at 0.5.
    pub async fn classify(&self, headline: &str) -> Sentiment {
        let request = CompletionRequest::builder(&self.model)
            .system(CLASSIFY_PROMPT)
            .add_message(Message::user(headline))
            .max_tokens(128)
            .temperature(0.0)
            .build();

        let raw = match self.provider.complete(request).await {
            Ok(response) => response.message.text().map(str::to_string),
            Err(err) => {
                warn!(error = %err, "sentiment classification failed");
                return Sentiment::neutral();
            }
        };

        let Some(raw) = raw else {
            return Sentiment::neutral();
        };

        match serde_json::from_str::<Sentiment>(raw.trim()) {
            Ok(sentiment) => sentiment.demoted(),
            Err(err) => {
                warn!(error = %err, "sentiment verdict was not valid JSON");
                Sentiment::neutral()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_llm::{CompletionResponse, StopReason, TokenUsage};

    struct FixedProvider(&'static str);

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
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

    #[test]
    fn test_demotion_below_threshold() {
        let verdict = Sentiment {
            label: SentimentLabel::Positive,
            score: 0.6,
        };
        assert_eq!(verdict.demoted().label, SentimentLabel::Neutral);

        let confident = Sentiment {
            label: SentimentLabel::Negative,
            score: 0.9,
        };
        assert_eq!(confident.demoted().label, SentimentLabel::Negative);
    }

    #[tokio::test]
    async fn test_classify_confident_verdict() {
        let classifier = SentimentClassifier::new(
            Arc::new(FixedProvider(r#"{"label": "POSITIVE", "score": 0.92}"#)),
            "gpt-4o-mini",
        );
        let verdict = classifier.classify("Record iPhone demand lifts Apple").await;
        assert_eq!(verdict.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn test_classify_garbage_falls_back_to_neutral() {
        let classifier =
            SentimentClassifier::new(Arc::new(FixedProvider("no idea")), "gpt-4o-mini");
        let verdict = classifier.classify("anything").await;
        assert_eq!(verdict, Sentiment::neutral());
    }
}
