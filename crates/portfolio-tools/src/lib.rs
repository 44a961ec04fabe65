//! Tool management framework for the portfolio assistant
//!
//! Defines the `Tool` trait implemented by every deterministic capability
//! the agents can call (news fetch, price lookup, portfolio retrieval) and
//! the registry that hands tools to the executor.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
