//! Tool agent implementation (wraps AgentExecutor)

use crate::executor::AgentExecutor;
use async_trait::async_trait;
use portfolio_core::{Agent, Context, Result};

/// An agent that drives the LLM loop with tool execution
///
/// ToolAgent wraps an AgentExecutor behind the Agent trait so that
/// specialists (news, stock, portfolio) and the supervisor all share the
/// same interface while differing only in their system prompt and tools.
///
/// # Example
///
/// ```no_run
/// use portfolio_runtime::{AgentRuntime, ExecutorConfig, ToolAgent};
/// use portfolio_core::{Agent, Context};
/// # use std::sync::Arc;
///
/// # async fn example(provider: Arc<dyn portfolio_llm::LLMProvider>) -> portfolio_core::Result<()> {
/// let runtime = AgentRuntime::builder().provider(provider).build()?;
/// let agent = runtime.create_tool_agent(ExecutorConfig::default(), "stock");
///
/// let mut context = Context::new();
/// let response = agent
///     .process("What's the price trend for AAPL?".to_string(), &mut context)
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ToolAgent {
    executor: AgentExecutor,
    name: String,
}

impl ToolAgent {
    /// Create a new tool agent
    pub fn new(executor: AgentExecutor, name: String) -> Self {
        Self { executor, name }
    }

    /// Create a tool agent from parts, accepting any string-like name
    pub fn from_parts(executor: AgentExecutor, name: impl Into<String>) -> Self {
        Self {
            executor,
            name: name.into(),
        }
    }

    /// Get a reference to the underlying executor
    pub fn executor(&self) -> &AgentExecutor {
        &self.executor
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        self.executor.run(input).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
