//! Tools exposed to the specialist agents and the supervisor

mod agent;
mod news;
mod portfolio;
mod price;

pub use agent::AgentTool;
pub use news::{GetFinanceNewsTool, SummarizeNewsToneTool};
pub use portfolio::AnswerInvestmentQuestionTool;
pub use price::{GetPriceTrendTool, GetStockPriceTool};
