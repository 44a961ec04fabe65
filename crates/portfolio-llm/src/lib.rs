//! LLM provider abstraction layer
//!
//! Provider-agnostic types for talking to language models:
//!
//! - Message types with multimodal content (text, base64 images, tool use)
//! - Completion request/response types
//! - Tool definitions for function calling
//! - The `LLMProvider` trait plus concrete providers behind feature flags
//!   (`openai` for OpenAI-compatible chat APIs, `ollama` for a local
//!   Ollama `/api/generate` endpoint)

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod tools;

pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, ImageSource, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use tools::ToolDefinition;

#[cfg(any(feature = "openai", feature = "ollama"))]
pub mod providers;
