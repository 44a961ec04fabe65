//! Retrieval-augmented answering over ingested summaries
//!
//! Builds a cosine-similarity vector index over summary records plus a
//! side store mapping document IDs back to retrievable content, and wires
//! both into an answer chain that grounds a chat model on the retrieved
//! context only.
//!
//! The index and side store persist as JSON files in an index directory;
//! when both files exist, they are loaded instead of rebuilt.

pub mod chain;
pub mod docstore;
pub mod embedding;
pub mod error;
pub mod index;
pub mod retriever;
pub mod service;

pub use chain::RagChain;
pub use docstore::SideStore;
pub use embedding::{EmbeddingProvider, OpenAIEmbeddingProvider};
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use retriever::Retriever;
pub use service::RagService;
