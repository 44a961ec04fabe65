//! Price tools: closing price by date and recent trend

use crate::api::YahooFinanceClient;
use crate::cache::MarketCache;
use async_trait::async_trait;
use chrono::NaiveDate;
use portfolio_core::Result as AgentResult;
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

fn default_days() -> u32 {
    7
}

#[derive(Debug, Deserialize)]
struct PriceParams {
    symbol: String,
    date: String,
}

/// Closing price for a symbol on a specific date
pub struct GetStockPriceTool {
    client: Arc<YahooFinanceClient>,
    cache: MarketCache,
}

impl GetStockPriceTool {
    /// Create the tool over a shared Yahoo client and cache
    pub fn new(client: Arc<YahooFinanceClient>, cache: MarketCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl Tool for GetStockPriceTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: PriceParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;
        let symbol = params.symbol.to_uppercase();

        let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d").map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!(
                "Invalid date '{}': {e}",
                params.date
            ))
        })?;

        let key = MarketCache::key("close", &symbol, &params.date);
        let client = self.client.clone();
        let symbol_for_fetch = symbol.clone();
        let date_str = params.date.clone();

        self.cache
            .get_or_fetch(key, || async move {
                match client.close_on_date(&symbol_for_fetch, date).await {
                    Ok(Some(close)) => Ok(json!({
                        "ticker": symbol_for_fetch,
                        "date": date_str,
                        "close": (close * 100.0).round() / 100.0,
                    })),
                    Ok(None) => Ok(Value::String(format!(
                        "Stock price data for {symbol_for_fetch} on {date_str} isn't available"
                    ))),
                    Err(e) => Err(portfolio_core::Error::ProcessingFailed(e.to_string())),
                }
            })
            .await
    }

    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Fetches the closing stock price for a company on a specific date using its ticker \
         symbol. For example, 'AAPL' for Apple, 'MSFT' for Microsoft."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "symbol": schema::string("Stock ticker symbol, e.g. \"AAPL\""),
                "date": schema::string("Date in YYYY-MM-DD format"),
            }),
            vec!["symbol", "date"],
        )
    }
}

#[derive(Debug, Deserialize)]
struct TrendParams {
    ticker: String,
    #[serde(default = "default_days")]
    days: u32,
}

/// Percentage trend over the last N trading days
pub struct GetPriceTrendTool {
    client: Arc<YahooFinanceClient>,
    cache: MarketCache,
}

impl GetPriceTrendTool {
    /// Create the tool over a shared Yahoo client and cache
    pub fn new(client: Arc<YahooFinanceClient>, cache: MarketCache) -> Self {
        Self { client, cache }
    }
}

/// Render the trend line from a close-price series
fn render_trend(ticker: &str, days: u32, closes: &[f64]) -> String {
    if closes.len() < 2 {
        return format!("Not enough data to calculate {days}-day trend for {ticker}.");
    }
    let start = closes[0];
    let end = closes[closes.len() - 1];
    let pct_change = ((end - start) / start) * 100.0;
    let trend = if pct_change > 0.0 { "up" } else { "down" };
    format!(
        "{ticker} is {trend} {:.2}% over the last {days} days.",
        pct_change.abs()
    )
}

#[async_trait]
impl Tool for GetPriceTrendTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: TrendParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;
        let ticker = params.ticker.to_uppercase();
        let days = params.days;

        let key = MarketCache::key("trend", &ticker, &days.to_string());
        let client = self.client.clone();
        let ticker_for_fetch = ticker.clone();

        self.cache
            .get_or_fetch(key, || async move {
                let closes = client
                    .recent_closes(&ticker_for_fetch, days)
                    .await
                    .map_err(|e| portfolio_core::Error::ProcessingFailed(e.to_string()))?;
                Ok(Value::String(render_trend(&ticker_for_fetch, days, &closes)))
            })
            .await
    }

    fn name(&self) -> &str {
        "get_price_trend"
    }

    fn description(&self) -> &str {
        "Calculates the stock price trend over the past N days for a ticker symbol as the \
         percentage change from the first to the most recent closing price."
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "ticker": schema::string("Stock ticker symbol, e.g. \"GOOGL\" or \"NVDA\""),
                "days": schema::integer("Number of most recent trading days (default 7)"),
            }),
            vec!["ticker"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_trend_up() {
        let line = render_trend("AAPL", 7, &[100.0, 103.0, 105.0]);
        assert_eq!(line, "AAPL is up 5.00% over the last 7 days.");
    }

    #[test]
    fn test_render_trend_down() {
        let line = render_trend("TSLA", 7, &[200.0, 180.0]);
        assert_eq!(line, "TSLA is down 10.00% over the last 7 days.");
    }

    #[test]
    fn test_render_trend_insufficient_data() {
        let line = render_trend("NVDA", 30, &[900.0]);
        assert_eq!(line, "Not enough data to calculate 30-day trend for NVDA.");
    }
}
