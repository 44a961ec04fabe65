//! Tool trait definition

use async_trait::async_trait;
use portfolio_core::Result;
use serde_json::Value;

/// Trait for tools that agents can execute
///
/// A tool is a deterministic function exposed to the LLM. Each tool carries
/// a unique name, a description that tells the model when to use it, and a
/// JSON Schema for its input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Execute the tool with the given parameters
    ///
    /// `params` is a JSON value matching `input_schema`. Missing-data
    /// conditions (no headlines, no price row) are reported as sentinel
    /// strings in the output, not as errors; `Err` is reserved for
    /// infrastructure failures.
    async fn execute(&self, params: Value) -> Result<Value>;

    /// The tool's name; must be unique within a registry
    fn name(&self) -> &str;

    /// Description shown to the LLM
    fn description(&self) -> &str;

    /// JSON Schema describing the tool's input parameters
    fn input_schema(&self) -> Value;
}
