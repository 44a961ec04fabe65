//! Agent implementations built on the executor

mod tool;

pub use tool::ToolAgent;
