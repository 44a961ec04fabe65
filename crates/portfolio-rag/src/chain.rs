//! Answer chain: grounds a chat model on retrieved context
//!
//! Retrieved documents are split into text and base64 image payloads.
//! Texts are joined into the grounding prompt; images ride along as
//! additional content blocks for vision-capable models. The model's
//! answer is returned verbatim.

use crate::error::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use portfolio_llm::{CompletionRequest, ContentBlock, LLMProvider, Message};
use std::sync::Arc;
use tracing::debug;

/// Retrieved documents partitioned by modality
#[derive(Debug, Default)]
pub struct PartitionedContext {
    /// Plain text documents
    pub texts: Vec<String>,
    /// Base64 image payloads
    pub images: Vec<String>,
}

/// Split retrieved documents into texts and base64 images
///
/// A document counts as an image only when it strictly decodes as
/// base64; everything else is text. Empty documents are dropped.
pub fn partition_content(docs: Vec<String>) -> PartitionedContext {
    let mut out = PartitionedContext::default();
    for doc in docs {
        if doc.trim().is_empty() {
            continue;
        }
        if BASE64.decode(doc.trim()).is_ok() {
            out.images.push(doc.trim().to_string());
        } else {
            out.texts.push(doc);
        }
    }
    out
}

/// Builds the grounding prompt and calls the chat model
pub struct RagChain {
    provider: Arc<dyn LLMProvider>,
    model: String,
}

impl RagChain {
    /// Create a chain against the given provider and model
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Answer a question grounded on the retrieved documents
    pub async fn answer(&self, question: &str, docs: Vec<String>) -> Result<String> {
        let context = partition_content(docs);
        debug!(
            texts = context.texts.len(),
            images = context.images.len(),
            "answering with retrieved context"
        );

        let prompt = build_prompt(question, &context.texts);
        let mut blocks = vec![ContentBlock::text(prompt)];
        for image in &context.images {
            blocks.push(ContentBlock::jpeg_base64(image.clone()));
        }

        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::user_blocks(blocks))
            .max_tokens(1024)
            .build();

        let response = self.provider.complete(request).await?;
        Ok(response.message.text().unwrap_or_default().to_string())
    }
}

fn build_prompt(question: &str, texts: &[String]) -> String {
    format!(
        "Answer based only on the following context:\n{}\n\nQuestion: {question}",
        texts.join("\n")
    )
}
