//! Market data API clients

mod yahoo;

pub use yahoo::YahooFinanceClient;
