//! Agent executor for running the LLM ⇄ tool loop
//!
//! The loop: call the LLM with the conversation and tool definitions; if it
//! requests tool use, execute the tools, append the results, and loop; when
//! it stops naturally, return the final text.

use portfolio_core::Result;
use portfolio_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, StopReason, ToolDefinition,
};
use portfolio_tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for agent execution
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Maximum number of loop iterations (guards against runaway loops)
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: Some(0.2),
        }
    }
}

/// Executes an agent loop against a provider and a tool registry
pub struct AgentExecutor {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: ExecutorConfig,
}

impl AgentExecutor {
    /// Create a new agent executor
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Run the loop for a single user message
    pub async fn run(&self, user_message: String) -> Result<String> {
        self.run_conversation(vec![Message::user(user_message)])
            .await
    }

    /// Run the loop with prior conversation history
    pub async fn run_with_history(
        &self,
        user_message: String,
        history: Vec<Message>,
    ) -> Result<String> {
        let mut conversation = history;
        conversation.push(Message::user(user_message));
        self.run_conversation(conversation).await
    }

    async fn run_conversation(&self, initial_conversation: Vec<Message>) -> Result<String> {
        let mut conversation = initial_conversation;
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.config.max_iterations {
                warn!(
                    max_iterations = self.config.max_iterations,
                    "Max iterations reached, stopping"
                );
                return Ok("Max iterations reached without completion".to_string());
            }

            let tools = self.build_tool_definitions();
            debug!(
                iteration,
                tool_count = tools.len(),
                model = %self.config.model,
                "Agent iteration"
            );

            let mut request_builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .system(
                    self.config
                        .system_prompt
                        .clone()
                        .unwrap_or_else(|| "You are a helpful assistant.".to_string()),
                )
                .max_tokens(self.config.max_tokens);
            if let Some(temperature) = self.config.temperature {
                request_builder = request_builder.temperature(temperature);
            }
            if !tools.is_empty() {
                request_builder = request_builder.tools(tools);
            }

            let response = self
                .provider
                .complete(request_builder.build())
                .await
                .map_err(|e| portfolio_core::Error::ProcessingFailed(e.to_string()))?;

            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::EndTurn => {
                    let text = response.message.text().unwrap_or("No response").to_string();
                    info!(iteration, response_length = text.len(), "Agent completed");
                    return Ok(text);
                }

                StopReason::ToolUse => {
                    let tool_results = self.execute_tools(&response.message).await?;

                    if tool_results.is_empty() {
                        warn!("No tool results despite ToolUse stop reason");
                        return Ok("Tool execution failed".to_string());
                    }

                    for result in tool_results {
                        conversation.push(result);
                    }
                }

                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok("Response truncated due to token limit".to_string());
                }
            }
        }
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute every tool call in an assistant message
    ///
    /// A failing tool becomes an error tool-result rather than aborting the
    /// loop; the model sees the error text and can recover.
    async fn execute_tools(&self, message: &Message) -> Result<Vec<Message>> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            if let ContentBlock::ToolUse { id, name, input } = tool_use {
                info!(tool_name = %name, tool_id = %id, "Executing tool");

                let tool = self.tool_registry.get(name).ok_or_else(|| {
                    portfolio_core::Error::ProcessingFailed(format!("Tool not found: {name}"))
                })?;

                let start_time = std::time::Instant::now();
                match tool.execute(input.clone()).await {
                    Ok(result) => {
                        let result_str =
                            serde_json::to_string(&result).unwrap_or_else(|_| result.to_string());
                        info!(
                            tool_name = %name,
                            duration_ms = start_time.elapsed().as_millis() as u64,
                            result_length = result_str.len(),
                            "Tool execution succeeded"
                        );
                        results.push(Message::tool_result(id.clone(), result_str));
                    }
                    Err(e) => {
                        warn!(
                            tool_name = %name,
                            duration_ms = start_time.elapsed().as_millis() as u64,
                            error = %e,
                            "Tool execution failed"
                        );
                        results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                    }
                }
            }
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_llm::{CompletionResponse, MessageContent, Role, TokenUsage};
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Provider scripted to return a fixed sequence of responses
    struct ScriptedProvider {
        responses: Mutex<Vec<CompletionResponse>>,
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
            let mut responses = self.responses.lock().unwrap();
            Ok(responses.remove(0))
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }

    struct FixedTool;

    #[async_trait]
    impl portfolio_tools::Tool for FixedTool {
        async fn execute(&self, _params: Value) -> portfolio_core::Result<Value> {
            Ok(json!({"close": 150.0}))
        }

        fn name(&self) -> &'static str {
            "get_stock_price"
        }

        fn description(&self) -> &'static str {
            "Fetch a closing price"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }
    }

    fn text_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            message: Message::assistant(text),
            stop_reason: StopReason::EndTurn,
            usage: TokenUsage::default(),
        }
    }

    fn tool_use_response() -> CompletionResponse {
        CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: Some(MessageContent::Blocks(vec![ContentBlock::ToolUse {
                    id: "call_1".to_string(),
                    name: "get_stock_price".to_string(),
                    input: json!({"symbol": "AAPL", "date": "2024-05-10"}),
                }])),
            },
            stop_reason: StopReason::ToolUse,
            usage: TokenUsage::default(),
        }
    }

    #[tokio::test]
    async fn test_direct_answer() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![text_response("AAPL closed at $150.00")]),
        });
        let executor = AgentExecutor::new(
            provider,
            Arc::new(ToolRegistry::new()),
            ExecutorConfig::default(),
        );

        let answer = executor.run("price?".to_string()).await.unwrap();
        assert_eq!(answer, "AAPL closed at $150.00");
    }

    #[tokio::test]
    async fn test_tool_loop_round_trip() {
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![
                tool_use_response(),
                text_response("The close was $150.00"),
            ]),
        });
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(FixedTool));

        let executor = AgentExecutor::new(provider, registry, ExecutorConfig::default());
        let answer = executor
            .run("What was AAPL's price?".to_string())
            .await
            .unwrap();
        assert_eq!(answer, "The close was $150.00");
    }

    #[tokio::test]
    async fn test_max_iterations_guard() {
        // Every response requests another tool call; the guard must fire
        let provider = Arc::new(ScriptedProvider {
            responses: Mutex::new(vec![
                tool_use_response(),
                tool_use_response(),
                tool_use_response(),
            ]),
        });
        let registry = Arc::new(ToolRegistry::new());
        registry.register(Arc::new(FixedTool));

        let config = ExecutorConfig {
            max_iterations: 2,
            ..ExecutorConfig::default()
        };
        let executor = AgentExecutor::new(provider, registry, config);

        let answer = executor.run("loop".to_string()).await.unwrap();
        assert_eq!(answer, "Max iterations reached without completion");
    }
}
