//! News tools: headlines and tone summaries

use crate::api::YahooFinanceClient;
use crate::sentiment::{Sentiment, SentimentClassifier, SentimentLabel};
use async_trait::async_trait;
use portfolio_core::Result as AgentResult;
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Number of headlines classified for a tone summary
const CLASSIFIED_HEADLINES: usize = 5;

/// Number of example headlines shown in the summary
const EXAMPLE_HEADLINES: usize = 3;

#[derive(Debug, Deserialize)]
struct NewsParams {
    query: String,
}

/// Fetch recent headlines for a ticker
pub struct GetFinanceNewsTool {
    client: Arc<YahooFinanceClient>,
}

impl GetFinanceNewsTool {
    /// Create the tool over a shared Yahoo client
    pub fn new(client: Arc<YahooFinanceClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for GetFinanceNewsTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: NewsParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;
        let ticker = params.query.to_uppercase();

        let headlines = self
            .client
            .news_headlines(&ticker)
            .await
            .map_err(|e| portfolio_core::Error::ProcessingFailed(e.to_string()))?;

        if headlines.is_empty() {
            return Ok(Value::String(format!(
                "No recent news headlines found for {ticker}."
            )));
        }
        Ok(Value::String(headlines.join("\n")))
    }

    fn name(&self) -> &str {
        "get_finance_news"
    }

    fn description(&self) -> &str {
        "Fetches the latest financial news headlines for a stock ticker (e.g. 'AAPL' or 'TSLA'). \
         Returns a newline-separated list of recent headlines."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "query": schema::string("A stock ticker symbol, e.g. \"MSFT\" or \"NVDA\""),
            }),
            vec!["query"],
        )
    }
}

#[derive(Debug, Deserialize)]
struct ToneParams {
    ticker: String,
}

/// Summarize the overall tone of recent headlines
pub struct SummarizeNewsToneTool {
    client: Arc<YahooFinanceClient>,
    classifier: Arc<SentimentClassifier>,
}

impl SummarizeNewsToneTool {
    /// Create the tool over a shared Yahoo client and classifier
    pub fn new(client: Arc<YahooFinanceClient>, classifier: Arc<SentimentClassifier>) -> Self {
        Self { client, classifier }
    }
}

/// Render the tone summary from classified headlines
fn render_summary(ticker: &str, scored: &[(String, Sentiment)]) -> String {
    let mut counts: HashMap<SentimentLabel, usize> = HashMap::new();
    for (_, verdict) in scored {
        *counts.entry(verdict.label).or_insert(0) += 1;
    }

    // Ties resolve POSITIVE over NEGATIVE over NEUTRAL; max_by_key keeps
    // the last maximum, so candidates are listed in reverse preference.
    let majority = [
        SentimentLabel::Neutral,
        SentimentLabel::Negative,
        SentimentLabel::Positive,
    ]
    .into_iter()
    .max_by_key(|label| counts.get(label).copied().unwrap_or(0))
    .unwrap_or(SentimentLabel::Neutral);

    let breakdown = format!(
        "POSITIVE: {}, NEGATIVE: {}, NEUTRAL: {}",
        counts.get(&SentimentLabel::Positive).copied().unwrap_or(0),
        counts.get(&SentimentLabel::Negative).copied().unwrap_or(0),
        counts.get(&SentimentLabel::Neutral).copied().unwrap_or(0),
    );

    let examples = scored
        .iter()
        .take(EXAMPLE_HEADLINES)
        .map(|(text, verdict)| format!("- {} → \"{}\"", verdict.label, text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Overall sentiment for {ticker}: **{majority}**\n{breakdown}\n\nHeadlines:\n{examples}"
    )
}

#[async_trait]
impl Tool for SummarizeNewsToneTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: ToneParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;
        let ticker = params.ticker.to_uppercase();

        let headlines = self
            .client
            .news_headlines(&ticker)
            .await
            .map_err(|e| portfolio_core::Error::ProcessingFailed(e.to_string()))?;

        if headlines.is_empty() {
            return Ok(Value::String(format!(
                "No recent news headlines found for {ticker}."
            )));
        }

        let mut scored = Vec::new();
        for headline in headlines.into_iter().take(CLASSIFIED_HEADLINES) {
            let verdict = self.classifier.classify(&headline).await;
            scored.push((headline, verdict));
        }

        Ok(Value::String(render_summary(&ticker, &scored)))
    }

    fn name(&self) -> &str {
        "summarize_news_tone"
    }

    fn description(&self) -> &str {
        "Fetches recent headlines for a ticker, classifies their sentiment and returns the \
         overall tone with a count breakdown and example headlines."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("A stock ticker symbol, e.g. \"GOOGL\" or \"AMZN\""),
            }),
            vec!["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(label: SentimentLabel, score: f64) -> Sentiment {
        Sentiment { label, score }
    }

    #[test]
    fn test_render_summary_majority_and_breakdown() {
        let scored = vec![
            ("up big".to_string(), verdict(SentimentLabel::Positive, 0.9)),
            ("record q".to_string(), verdict(SentimentLabel::Positive, 0.8)),
            ("lawsuit".to_string(), verdict(SentimentLabel::Negative, 0.85)),
        ];
        let summary = render_summary("AAPL", &scored);
        assert!(summary.starts_with("Overall sentiment for AAPL: **POSITIVE**"));
        assert!(summary.contains("POSITIVE: 2, NEGATIVE: 1, NEUTRAL: 0"));
        assert!(summary.contains("- NEGATIVE → \"lawsuit\""));
    }

    #[test]
    fn test_render_summary_limits_examples() {
        let scored: Vec<(String, Sentiment)> = (0..5)
            .map(|i| (format!("h{i}"), verdict(SentimentLabel::Neutral, 0.5)))
            .collect();
        let summary = render_summary("TSLA", &scored);
        assert_eq!(summary.matches("- NEUTRAL").count(), 3);
    }
}
