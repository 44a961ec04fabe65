//! Execution context for agents
//!
//! `Context` is a key-value store passed down the agent call chain. The
//! supervisor uses it to share per-request state (session id, "today" for
//! date resolution) with the specialists it delegates to.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Session ID for tracking a conversation
    pub const SESSION_ID: &str = "session_id";
    /// The date to interpret "today"/"now" against (YYYY-MM-DD)
    pub const TODAY: &str = "today";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use portfolio_core::Context;
///
/// let ctx = Context::new()
///     .with_session_id("session-123")
///     .with_today("2024-05-10");
///
/// assert_eq!(ctx.session_id(), Some("session-123"));
/// assert_eq!(ctx.today(), Some("2024-05-10"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session ID
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.insert(keys::SESSION_ID, serde_json::json!(session_id.into()));
        self
    }

    /// Set the date "today" resolves to
    pub fn with_today(mut self, date: impl Into<String>) -> Self {
        self.insert(keys::TODAY, serde_json::json!(date.into()));
        self
    }

    /// Get the session ID
    pub fn session_id(&self) -> Option<&str> {
        self.get(keys::SESSION_ID).and_then(|v| v.as_str())
    }

    /// Get the date "today" resolves to
    pub fn today(&self) -> Option<&str> {
        self.get(keys::TODAY).and_then(|v| v.as_str())
    }

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value, serializing it to JSON first
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value, deserializing from the stored JSON
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_operations() {
        let mut ctx = Context::new();
        assert!(ctx.is_empty());

        ctx.insert("key", serde_json::json!("value"));
        assert_eq!(ctx.len(), 1);
        assert!(ctx.contains_key("key"));
        assert_eq!(ctx.get("key"), Some(&serde_json::json!("value")));
    }

    #[test]
    fn test_builder_chain() {
        let ctx = Context::new()
            .with_session_id("sess-123")
            .with_today("2024-05-10");

        assert_eq!(ctx.session_id(), Some("sess-123"));
        assert_eq!(ctx.today(), Some("2024-05-10"));
    }

    #[test]
    fn test_typed_round_trip() {
        #[derive(serde::Serialize, serde::Deserialize, PartialEq, Debug)]
        struct Holding {
            ticker: String,
            shares: i64,
        }

        let mut ctx = Context::new();
        let holding = Holding {
            ticker: "AAPL".to_string(),
            shares: 5,
        };
        ctx.insert_typed("holding", &holding).unwrap();

        let retrieved: Holding = ctx.get_typed("holding").unwrap().unwrap();
        assert_eq!(retrieved, holding);
    }

    #[test]
    fn test_get_typed_missing_key() {
        let ctx = Context::new();
        let result: crate::Result<Option<String>> = ctx.get_typed("missing");
        assert!(result.unwrap().is_none());
    }
}
