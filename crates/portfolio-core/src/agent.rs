//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Core trait implemented by every agent in the workspace
///
/// The input/output types are intentionally plain strings: the supervisor
/// hands a user question down to a specialist and relays the answer back up
/// without caring about its internal structure. Concrete implementations
/// parse or format as needed.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process a user input and return the agent's answer
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;
}
