//! Adapter exposing an agent as a tool
//!
//! The supervisor routes by calling its specialists as tools. Each call
//! runs the wrapped agent's full LLM loop with a fresh context and
//! returns the specialist's final answer as the tool result.

use async_trait::async_trait;
use portfolio_core::{Agent, Context, Result as AgentResult};
use portfolio_llm::tools::schema;
use portfolio_tools::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct AgentParams {
    request: String,
}

/// Wraps an agent behind the tool interface
pub struct AgentTool {
    agent: Arc<dyn Agent>,
    description: String,
}

impl AgentTool {
    /// Wrap an agent, describing to the router when to delegate to it
    pub fn new(agent: Arc<dyn Agent>, description: impl Into<String>) -> Self {
        Self {
            agent,
            description: description.into(),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    async fn execute(&self, params: Value) -> AgentResult<Value> {
        let params: AgentParams = serde_json::from_value(params).map_err(|e| {
            portfolio_core::Error::ProcessingFailed(format!("Invalid parameters: {e}"))
        })?;

        debug!(agent = self.agent.name(), "delegating to specialist");
        let mut context = Context::new();
        let answer = self.agent.process(params.request, &mut context).await?;
        Ok(Value::String(answer))
    }

    fn name(&self) -> &str {
        self.agent.name()
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({
                "request": schema::string("The request to hand to this specialist, in plain language"),
            }),
            vec!["request"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UppercaseAgent;

    #[async_trait]
    impl Agent for UppercaseAgent {
        async fn process(&self, input: String, _context: &mut Context) -> AgentResult<String> {
            Ok(input.to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    #[tokio::test]
    async fn test_agent_tool_delegates() {
        let tool = AgentTool::new(Arc::new(UppercaseAgent), "uppercases requests");
        assert_eq!(tool.name(), "upper");

        let result = tool
            .execute(json!({"request": "hello"}))
            .await
            .unwrap();
        assert_eq!(result, Value::String("HELLO".to_string()));
    }

    #[tokio::test]
    async fn test_agent_tool_rejects_bad_params() {
        let tool = AgentTool::new(Arc::new(UppercaseAgent), "uppercases requests");
        assert!(tool.execute(json!({"wrong": 1})).await.is_err());
    }
}
