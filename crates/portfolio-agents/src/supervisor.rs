//! Construction of the specialist agents and the supervisor
//!
//! Each specialist gets its own tool registry so the model behind one
//! agent can only call that agent's tools. The supervisor's registry
//! holds the three specialists wrapped as tools; routing between them is
//! left entirely to the supervisor's model.

use crate::api::YahooFinanceClient;
use crate::cache::MarketCache;
use crate::error::Result;
use crate::prompts;
use crate::sentiment::SentimentClassifier;
use crate::tools::{
    AgentTool, AnswerInvestmentQuestionTool, GetFinanceNewsTool, GetPriceTrendTool,
    GetStockPriceTool, SummarizeNewsToneTool,
};
use chrono::NaiveDate;
use portfolio_llm::LLMProvider;
use portfolio_rag::RagService;
use portfolio_runtime::{AgentRuntime, ExecutorConfig, ToolAgent};
use portfolio_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Duration;

/// TTL for cached market data responses
const MARKET_CACHE_TTL: Duration = Duration::from_secs(300);

/// The assembled agent hierarchy
pub struct AgentStack {
    /// The routing agent; processes user queries end to end
    pub supervisor: ToolAgent,
}

/// Build the three specialists and the supervisor over them
pub fn build_agents(
    provider: Arc<dyn LLMProvider>,
    rag_service: Arc<RagService>,
    chat_model: &str,
    today: NaiveDate,
) -> Result<AgentStack> {
    let runtime = AgentRuntime::new(provider.clone(), Arc::new(ToolRegistry::new()));
    let yahoo = Arc::new(YahooFinanceClient::new());
    let cache = MarketCache::new(MARKET_CACHE_TTL);
    let classifier = Arc::new(SentimentClassifier::new(provider.clone(), chat_model));

    let news_tools = Arc::new(ToolRegistry::new());
    news_tools.register(Arc::new(GetFinanceNewsTool::new(yahoo.clone())));
    news_tools.register(Arc::new(SummarizeNewsToneTool::new(
        yahoo.clone(),
        classifier,
    )));
    let news = runtime.create_tool_agent_with_registry(
        config(chat_model, prompts::news_prompt()),
        "news",
        news_tools,
    );

    let price_tools = Arc::new(ToolRegistry::new());
    price_tools.register(Arc::new(GetStockPriceTool::new(
        yahoo.clone(),
        cache.clone(),
    )));
    price_tools.register(Arc::new(GetPriceTrendTool::new(yahoo, cache)));
    let price = runtime.create_tool_agent_with_registry(
        config(chat_model, prompts::stock_prompt(today)?),
        "price",
        price_tools,
    );

    let rag_tools = Arc::new(ToolRegistry::new());
    rag_tools.register(Arc::new(AnswerInvestmentQuestionTool::new(rag_service)));
    let portfolio = runtime.create_tool_agent_with_registry(
        config(chat_model, prompts::rag_prompt()),
        "portfolio",
        rag_tools,
    );

    let supervisor_tools = Arc::new(ToolRegistry::new());
    supervisor_tools.register(Arc::new(AgentTool::new(
        Arc::new(news),
        "Latest headlines and sentiment for a stock. Use for news, tone and market perception questions.",
    )));
    supervisor_tools.register(Arc::new(AgentTool::new(
        Arc::new(price),
        "Closing prices by date and recent trends via Yahoo Finance. Use for price and performance questions.",
    )));
    supervisor_tools.register(Arc::new(AgentTool::new(
        Arc::new(portfolio),
        "Purchase info and commentary from the user's uploaded PDFs. Use for portfolio composition and purchase history questions.",
    )));
    let supervisor = runtime.create_tool_agent_with_registry(
        config(chat_model, prompts::supervisor_prompt(today)?),
        "supervisor",
        supervisor_tools,
    );

    Ok(AgentStack { supervisor })
}

fn config(model: &str, system_prompt: String) -> ExecutorConfig {
    ExecutorConfig {
        model: model.to_string(),
        system_prompt: Some(system_prompt),
        ..ExecutorConfig::default()
    }
}
