//! Specialist agents and the supervisor
//!
//! Three specialists cover the assistant's ground:
//!
//! - **news** — headlines and sentiment for a ticker
//! - **price** — closing prices by date and recent trends
//! - **portfolio** — grounded answers from the ingested PDF summaries
//!
//! The supervisor is itself a tool-using agent whose tools are the three
//! specialists, so routing is a model decision, not a rule table.

pub mod api;
pub mod cache;
pub mod error;
pub mod prompts;
pub mod sentiment;
pub mod supervisor;
pub mod tools;

pub use api::YahooFinanceClient;
pub use cache::MarketCache;
pub use error::{MarketError, Result};
pub use sentiment::{Sentiment, SentimentClassifier, SentimentLabel};
pub use supervisor::{AgentStack, build_agents};
