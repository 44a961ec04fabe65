//! Retriever: builds or loads the index pair and answers similarity queries
//!
//! Every summary record gets one index entry and one side-store entry
//! under a fresh v4 UUID, so both structures always hold exactly as many
//! documents as the summaries file has records. An indexed ID that fails
//! to resolve in the side store is reported as a corrupt index rather
//! than silently dropped.

use crate::docstore::SideStore;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use portfolio_ingest::SummaryRecord;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Retrieves summary content by embedding similarity
pub struct Retriever {
    index: VectorIndex,
    store: SideStore,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    /// Load the persisted index pair, or build it from summary records
    ///
    /// Loads when both `index.json` and `docstore.json` exist under
    /// `index_dir`; otherwise embeds all records and persists the result.
    pub async fn load_or_build(
        index_dir: impl AsRef<Path>,
        records: &[SummaryRecord],
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        let dir = index_dir.as_ref();
        if VectorIndex::exists(dir) && SideStore::exists(dir) {
            info!(dir = %dir.display(), "loading existing vector index and side store");
            return Ok(Self {
                index: VectorIndex::load(dir)?,
                store: SideStore::load(dir)?,
                embedder,
                top_k,
            });
        }

        info!(count = records.len(), "building vector index from summaries");
        let mut retriever = Self::build(records, embedder, top_k).await?;
        retriever.persist(dir)?;
        Ok(retriever)
    }

    /// Build an index pair in memory from summary records
    pub async fn build(
        records: &[SummaryRecord],
        embedder: Arc<dyn EmbeddingProvider>,
        top_k: usize,
    ) -> Result<Self> {
        let texts: Vec<String> = records.iter().map(SummaryRecord::embedding_text).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = embedder.embed_batch(&refs).await?;

        let mut index = VectorIndex::new();
        let mut store = SideStore::new();
        for (text, embedding) in texts.into_iter().zip(embeddings) {
            let doc_id = Uuid::new_v4();
            index.insert(doc_id, embedding);
            store.insert(doc_id, text);
        }

        Ok(Self {
            index,
            store,
            embedder,
            top_k,
        })
    }

    /// Persist both halves of the index pair under `dir`
    pub fn persist(&mut self, dir: impl AsRef<Path>) -> Result<()> {
        self.index.save(&dir)?;
        self.store.save(&dir)?;
        Ok(())
    }

    /// Retrieve the content of the `top_k` most similar documents
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CorruptIndex`] when a hit's document ID is
    /// missing from the side store.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let query = self.embedder.embed(question).await?;
        let hits = self.index.search(&query, self.top_k);

        let mut docs = Vec::with_capacity(hits.len());
        for (doc_id, _score) in hits {
            let content = self
                .store
                .get(&doc_id)
                .ok_or(RagError::CorruptIndex { doc_id })?;
            docs.push(content.to_string());
        }
        Ok(docs)
    }

    /// Number of indexed documents
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the retriever holds no documents
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use portfolio_ingest::RecordSource;
    use tempfile::tempdir;

    /// Deterministic embedder: maps text onto a small vector derived from
    /// its bytes so similar strings land near each other in tests.
    pub(crate) struct ByteEmbedder;

    #[async_trait]
    impl EmbeddingProvider for ByteEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; 8];
            for (i, b) in text.bytes().enumerate() {
                v[i % 8] += f32::from(b) / 255.0;
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            8
        }
    }

    fn sample_records() -> Vec<SummaryRecord> {
        vec![
            SummaryRecord::Text {
                source: RecordSource::Pdf,
                raw: "The portfolio favors large-cap tech.".to_string(),
            },
            SummaryRecord::Table {
                source: RecordSource::Pdf,
                summary: vec!["- MSFT: 10 shares @ 320.5 (bought 2024-05-10)".to_string()],
                raw: "| MSFT | 2024-05-10 | 320.50 | 10 |".to_string(),
            },
            SummaryRecord::PurchaseEntry {
                source: RecordSource::Markdown,
                summary: "- AAPL: 20 shares @ 145.3 (bought 2023-05-10)".to_string(),
                raw: "| AAPL | 2023-05-10 | 145.30 | 20 |".to_string(),
            },
        ]
    }

    #[tokio::test]
    async fn test_build_indexes_every_record() {
        let retriever = Retriever::build(&sample_records(), Arc::new(ByteEmbedder), 4)
            .await
            .unwrap();
        assert_eq!(retriever.len(), 3);
        assert_eq!(retriever.store.len(), 3);

        let indexed: std::collections::HashSet<_> = retriever.index.doc_ids().collect();
        let stored: std::collections::HashSet<_> = retriever.store.doc_ids().collect();
        assert_eq!(indexed, stored);
    }

    #[tokio::test]
    async fn test_load_or_build_persists_then_loads() {
        let dir = tempdir().unwrap();
        let records = sample_records();

        let built = Retriever::load_or_build(dir.path(), &records, Arc::new(ByteEmbedder), 4)
            .await
            .unwrap();
        assert_eq!(built.len(), 3);

        // Second call must load the persisted pair, even with no records
        let loaded = Retriever::load_or_build(dir.path(), &[], Arc::new(ByteEmbedder), 4)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 3);
    }

    #[tokio::test]
    async fn test_retrieve_returns_side_store_content() {
        let retriever = Retriever::build(&sample_records(), Arc::new(ByteEmbedder), 2)
            .await
            .unwrap();
        let docs = retriever.retrieve("When did I buy Apple?").await.unwrap();
        assert_eq!(docs.len(), 2);
    }

    /// Embedder with one dimension per vocabulary term, so similarity in
    /// tests follows shared wording instead of raw byte content.
    struct KeywordEmbedder;

    impl KeywordEmbedder {
        const VOCAB: [&'static [&'static str]; 4] = [
            &["buy", "bought"],
            &["shares"],
            &["grew"],
            &["apple", "aapl"],
        ];
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(Self::VOCAB
                .iter()
                .map(|terms| {
                    if terms.iter().any(|t| lower.contains(t)) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect())
        }

        fn dimensions(&self) -> usize {
            Self::VOCAB.len()
        }
    }

    #[tokio::test]
    async fn test_purchase_record_ranks_first_for_buy_question() {
        let records = vec![
            SummaryRecord::Text {
                source: RecordSource::Pdf,
                raw: "Apple grew 10%".to_string(),
            },
            SummaryRecord::Table {
                source: RecordSource::Pdf,
                summary: vec!["- AAPL: 5 shares @ 150.0 (bought 2023-05-10)".to_string()],
                raw: "| AAPL | 2023-05-10 | 150.0 | 5 |".to_string(),
            },
        ];

        let retriever = Retriever::build(&records, Arc::new(KeywordEmbedder), 1)
            .await
            .unwrap();
        let docs = retriever.retrieve("What did I buy?").await.unwrap();
        assert_eq!(docs, vec!["- AAPL: 5 shares @ 150.0 (bought 2023-05-10)"]);
    }

    #[tokio::test]
    async fn test_reloaded_retrieval_matches_in_memory() {
        let dir = tempdir().unwrap();
        let records = sample_records();

        let built = Retriever::load_or_build(dir.path(), &records, Arc::new(ByteEmbedder), 2)
            .await
            .unwrap();
        let before = built.retrieve("When did I buy Apple?").await.unwrap();

        let loaded = Retriever::load_or_build(dir.path(), &[], Arc::new(ByteEmbedder), 2)
            .await
            .unwrap();
        let after = loaded.retrieve("When did I buy Apple?").await.unwrap();

        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_missing_side_store_entry_is_corrupt() {
        let mut retriever = Retriever::build(&sample_records(), Arc::new(ByteEmbedder), 4)
            .await
            .unwrap();
        // Orphan an indexed document
        retriever.store = SideStore::new();

        let err = retriever.retrieve("anything").await.unwrap_err();
        assert!(matches!(err, RagError::CorruptIndex { .. }));
    }
}
