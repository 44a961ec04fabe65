//! Yahoo Finance API client
//!
//! Thin wrapper over `yahoo_finance_api` with a direct rate limiter in
//! front of every call. Missing data (no trading row for a date, no news
//! for a query) comes back as `None`/empty rather than an error; only
//! transport and API failures are errors.

use crate::error::{MarketError, Result};
use chrono::NaiveDate;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

const DEFAULT_REQUESTS_PER_MINUTE: u32 = 60;

/// Yahoo Finance client used by the price and news tools
pub struct YahooFinanceClient {
    rate_limiter: SharedRateLimiter,
}

impl YahooFinanceClient {
    /// Create a client with the default rate limit
    pub fn new() -> Self {
        Self::with_rate_limit(DEFAULT_REQUESTS_PER_MINUTE)
    }

    /// Create a client limited to `requests_per_minute` API calls
    pub fn with_rate_limit(requests_per_minute: u32) -> Self {
        let per_minute = NonZeroU32::new(requests_per_minute)
            .unwrap_or(NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN));
        Self {
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
        }
    }

    /// Closing price for a symbol on a specific date
    ///
    /// Queries the one-day window starting at midnight UTC of `date`.
    /// Returns `None` when the market has no row for that day (weekend,
    /// holiday, unknown symbol with empty history).
    pub async fn close_on_date(&self, symbol: &str, date: NaiveDate) -> Result<Option<f64>> {
        self.rate_limiter.until_ready().await;

        let start = to_offset_datetime(date)?;
        let end = to_offset_datetime(
            date.succ_opt()
                .ok_or_else(|| MarketError::InvalidDate(date.to_string()))?,
        )?;

        let provider = connector()?;
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(quotes.first().map(|q| q.close))
    }

    /// Daily closing prices over the last `days` trading days, oldest first
    pub async fn recent_closes(&self, symbol: &str, days: u32) -> Result<Vec<f64>> {
        self.rate_limiter.until_ready().await;

        let provider = connector()?;
        let range = format!("{days}d");
        let response = provider
            .get_quote_range(symbol, "1d", &range)
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        let quotes = response
            .quotes()
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(quotes.iter().map(|q| q.close).collect())
    }

    /// Recent news headlines for a ticker or company name
    pub async fn news_headlines(&self, query: &str) -> Result<Vec<String>> {
        self.rate_limiter.until_ready().await;

        let provider = connector()?;
        let result = provider
            .search_ticker(query)
            .await
            .map_err(|e| MarketError::YahooFinanceError(e.to_string()))?;

        Ok(result
            .news
            .into_iter()
            .map(|item| item.title)
            .filter(|t| !t.trim().is_empty())
            .collect())
    }
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

fn connector() -> Result<yahoo::YahooConnector> {
    yahoo::YahooConnector::new().map_err(|e| MarketError::YahooFinanceError(e.to_string()))
}

fn to_offset_datetime(date: NaiveDate) -> Result<OffsetDateTime> {
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| MarketError::InvalidDate(date.to_string()))?;
    OffsetDateTime::from_unix_timestamp(midnight.and_utc().timestamp())
        .map_err(|e| MarketError::InvalidDate(format!("{date}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_offset_datetime() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let odt = to_offset_datetime(date).unwrap();
        assert_eq!(odt.date().to_string(), "2024-05-10");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_recent_closes() {
        let client = YahooFinanceClient::new();
        let closes = client.recent_closes("AAPL", 7).await.unwrap();
        assert!(!closes.is_empty());
        assert!(closes.iter().all(|c| *c > 0.0));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_close_on_weekend_is_none() {
        let client = YahooFinanceClient::new();
        // 2024-05-11 was a Saturday
        let date = NaiveDate::from_ymd_opt(2024, 5, 11).unwrap();
        assert!(client.close_on_date("AAPL", date).await.unwrap().is_none());
    }
}
