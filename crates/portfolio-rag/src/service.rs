//! RagService: the retrieval surface the portfolio agent talks to
//!
//! Holds an optional retriever behind an async lock. Until a rebuild has
//! run, answering returns a fixed sentinel without touching the chat
//! model; after ingestion the service retrieves context and delegates to
//! the answer chain.

use crate::chain::RagChain;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::retriever::Retriever;
use portfolio_ingest::SummaryRecord;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Answer returned before any document has been ingested
pub const NO_DOCUMENTS_SENTINEL: &str = "No documents ingested yet. Please upload a PDF.";

/// Retrieval-augmented answering service over the summaries index
pub struct RagService {
    retriever: RwLock<Option<Retriever>>,
    chain: RagChain,
    embedder: Arc<dyn EmbeddingProvider>,
    index_dir: PathBuf,
    top_k: usize,
}

impl RagService {
    /// Create a service with no retriever built yet
    pub fn new(
        chain: RagChain,
        embedder: Arc<dyn EmbeddingProvider>,
        index_dir: impl Into<PathBuf>,
        top_k: usize,
    ) -> Self {
        Self {
            retriever: RwLock::new(None),
            chain,
            embedder,
            index_dir: index_dir.into(),
            top_k,
        }
    }

    /// Build (or load) the retriever from summary records
    ///
    /// Loads the persisted index pair when present, otherwise embeds the
    /// records and persists the result under the index directory.
    pub async fn rebuild(&self, records: &[SummaryRecord]) -> Result<()> {
        let retriever = Retriever::load_or_build(
            &self.index_dir,
            records,
            self.embedder.clone(),
            self.top_k,
        )
        .await?;
        info!(docs = retriever.len(), "retriever ready");
        *self.retriever.write().await = Some(retriever);
        Ok(())
    }

    /// Drop the persisted index pair so the next rebuild starts fresh
    ///
    /// Used when a new PDF replaces the previous upload.
    pub fn clear_index(&self) -> Result<()> {
        if self.index_dir.is_dir() {
            std::fs::remove_dir_all(&self.index_dir)?;
        }
        Ok(())
    }

    /// Answer a question from the indexed documents
    ///
    /// Returns the no-documents sentinel without calling the model when
    /// no retriever has been built.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let guard = self.retriever.read().await;
        let Some(retriever) = guard.as_ref() else {
            return Ok(NO_DOCUMENTS_SENTINEL.to_string());
        };

        let docs = retriever.retrieve(question).await?;
        self.chain.answer(question, docs).await
    }

    /// Whether a retriever has been built
    pub async fn is_ready(&self) -> bool {
        self.retriever.read().await.is_some()
    }

    /// The directory holding the persisted index pair
    pub fn index_dir(&self) -> &Path {
        &self.index_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retriever::tests::ByteEmbedder;
    use async_trait::async_trait;
    use portfolio_ingest::RecordSource;
    use portfolio_llm::{
        CompletionRequest, CompletionResponse, LLMProvider, Message, StopReason, TokenUsage,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    /// Counts completion calls; the sentinel path must never reach it
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LLMProvider for CountingProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> portfolio_llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                message: Message::assistant("grounded answer"),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn service_with(dir: &Path, provider: Arc<CountingProvider>) -> RagService {
        RagService::new(
            RagChain::new(provider, "gpt-4o-mini"),
            Arc::new(ByteEmbedder),
            dir,
            4,
        )
    }

    #[tokio::test]
    async fn test_sentinel_before_rebuild_skips_model() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let service = service_with(dir.path(), provider.clone());

        let answer = service.answer("When did I buy Apple?").await.unwrap();
        assert_eq!(answer, NO_DOCUMENTS_SENTINEL);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_answer_after_rebuild_calls_model() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let service = service_with(dir.path(), provider.clone());

        let records = vec![SummaryRecord::Text {
            source: RecordSource::Pdf,
            raw: "The portfolio holds AAPL and MSFT.".to_string(),
        }];
        service.rebuild(&records).await.unwrap();
        assert!(service.is_ready().await);

        let answer = service.answer("What do I hold?").await.unwrap();
        assert_eq!(answer, "grounded answer");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_index_removes_persisted_pair() {
        let dir = tempdir().unwrap();
        let index_dir = dir.path().join("vector_index");
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let service = service_with(&index_dir, provider);

        let records = vec![SummaryRecord::Text {
            source: RecordSource::Pdf,
            raw: "Commentary.".to_string(),
        }];
        service.rebuild(&records).await.unwrap();
        assert!(index_dir.is_dir());

        service.clear_index().unwrap();
        assert!(!index_dir.is_dir());
    }
}
