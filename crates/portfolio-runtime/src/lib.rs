//! Agent runtime for the portfolio assistant
//!
//! Provides the `AgentExecutor` that drives the LLM ⇄ tool loop, the
//! `AgentRuntime` that owns the shared provider and tool registry, and the
//! `ToolAgent` wrapper that exposes an executor through the `Agent` trait.

pub mod agents;
pub mod executor;
pub mod runtime;

pub use agents::ToolAgent;
pub use executor::{AgentExecutor, ExecutorConfig};
pub use runtime::{AgentRuntime, AgentRuntimeBuilder};
