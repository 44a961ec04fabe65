//! Runtime for constructing agents with shared dependencies
//!
//! `AgentRuntime` owns the LLM provider and tool registry and hands out
//! configured agents; nothing in the workspace reaches for a process-wide
//! singleton.

use portfolio_core::Result;
use portfolio_llm::LLMProvider;
use portfolio_tools::ToolRegistry;
use std::sync::Arc;

use crate::agents::ToolAgent;
use crate::executor::{AgentExecutor, ExecutorConfig};

/// Runtime holding the shared provider and tool registry
///
/// # Example
///
/// ```no_run
/// # use portfolio_runtime::{AgentRuntime, ExecutorConfig};
/// # use std::sync::Arc;
/// # fn example(provider: Arc<dyn portfolio_llm::LLMProvider>) -> portfolio_core::Result<()> {
/// let runtime = AgentRuntime::builder().provider(provider).build()?;
/// let agent = runtime.create_tool_agent(ExecutorConfig::default(), "news");
/// # Ok(())
/// # }
/// ```
pub struct AgentRuntime {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
}

impl AgentRuntime {
    /// Create a new agent runtime
    pub fn new(provider: Arc<dyn LLMProvider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            tool_registry,
        }
    }

    /// Create a new runtime builder
    pub fn builder() -> AgentRuntimeBuilder {
        AgentRuntimeBuilder::new()
    }

    /// Get a reference to the LLM provider
    pub fn provider(&self) -> &Arc<dyn LLMProvider> {
        &self.provider
    }

    /// Get a reference to the tool registry
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Create a tool-using agent backed by the shared registry
    pub fn create_tool_agent(&self, config: ExecutorConfig, name: impl Into<String>) -> ToolAgent {
        let executor =
            AgentExecutor::new(self.provider.clone(), self.tool_registry.clone(), config);
        ToolAgent::new(executor, name.into())
    }

    /// Create a tool-using agent with its own dedicated registry
    ///
    /// Each specialist agent sees only its own tools, so the model cannot
    /// call another specialist's tool directly.
    pub fn create_tool_agent_with_registry(
        &self,
        config: ExecutorConfig,
        name: impl Into<String>,
        registry: Arc<ToolRegistry>,
    ) -> ToolAgent {
        let executor = AgentExecutor::new(self.provider.clone(), registry, config);
        ToolAgent::new(executor, name.into())
    }
}

/// Builder for AgentRuntime
pub struct AgentRuntimeBuilder {
    provider: Option<Arc<dyn LLMProvider>>,
    tool_registry: Option<Arc<ToolRegistry>>,
}

impl AgentRuntimeBuilder {
    /// Create a new runtime builder
    pub fn new() -> Self {
        Self {
            provider: None,
            tool_registry: None,
        }
    }

    /// Set the LLM provider
    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the tool registry
    pub fn tool_registry(mut self, registry: Arc<ToolRegistry>) -> Self {
        self.tool_registry = Some(registry);
        self
    }

    /// Build the runtime
    ///
    /// # Errors
    ///
    /// Returns an error if the provider is not set.
    pub fn build(self) -> Result<AgentRuntime> {
        let provider = self.provider.ok_or_else(|| {
            portfolio_core::Error::InitializationFailed("Provider not set".to_string())
        })?;

        let tool_registry = self
            .tool_registry
            .unwrap_or_else(|| Arc::new(ToolRegistry::new()));

        Ok(AgentRuntime::new(provider, tool_registry))
    }
}

impl Default for AgentRuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_llm::{CompletionRequest, CompletionResponse};

    struct MockProvider;

    #[async_trait]
    impl LLMProvider for MockProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
            unreachable!("not called in these tests")
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = AgentRuntimeBuilder::new().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_with_default_registry() {
        let runtime = AgentRuntime::builder()
            .provider(Arc::new(MockProvider))
            .build()
            .unwrap();
        assert!(runtime.tools().is_empty());
    }
}
