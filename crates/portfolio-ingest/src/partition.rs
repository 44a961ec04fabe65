//! Client for a hi-res PDF layout partition service
//!
//! The service accepts a PDF upload and answers with a flat JSON array of
//! layout elements: tables, narrative text blocks and images. Image
//! elements carry their pixels as a base64 payload in the element
//! metadata, which is what the chart analysis pass consumes. The upload
//! never requests chunking: a chunked response folds images into
//! composite chunks instead of top-level `Image` elements, where the
//! chart pass cannot see them.

use crate::error::{IngestError, Result};
use reqwest::multipart;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const PARTITION_PATH: &str = "/general/v0/general";

/// One layout element returned by the partition service
#[derive(Debug, Clone, Deserialize)]
pub struct Element {
    /// Element category, e.g. "Table", "NarrativeText", "Image"
    #[serde(rename = "type")]
    pub category: String,

    /// Text content of the element, if any
    #[serde(default)]
    pub text: Option<String>,

    /// Element metadata
    #[serde(default)]
    pub metadata: ElementMetadata,
}

/// Metadata attached to a layout element
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ElementMetadata {
    /// Base64-encoded image payload for image elements
    #[serde(default)]
    pub image_base64: Option<String>,
}

/// HTTP client for the partition service
pub struct PartitionClient {
    client: reqwest::Client,
    base_url: String,
}

impl PartitionClient {
    /// Create a client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(300))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    /// Create a client from the `PARTITION_BASE_URL` environment variable
    ///
    /// Falls back to `http://localhost:8000` when unset.
    pub fn from_env() -> Self {
        let base_url = std::env::var("PARTITION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Partition a PDF into layout elements
    ///
    /// Uploads the file with the hi-res strategy and image payload
    /// extraction enabled for images and tables.
    #[instrument(skip_all, fields(pdf = %pdf_path.as_ref().display()))]
    pub async fn partition(&self, pdf_path: impl AsRef<Path>) -> Result<Vec<Element>> {
        let path = pdf_path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        let mut form = multipart::Form::new().part(
            "files",
            multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str("application/pdf")?,
        );
        for (key, value) in form_fields() {
            form = form.text(key, value);
        }

        let url = format!("{}{}", self.base_url.trim_end_matches('/'), PARTITION_PATH);
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::PartitionError(format!(
                "HTTP {status}: {body}"
            )));
        }

        let elements: Vec<Element> = response.json().await?;
        debug!(count = elements.len(), "partitioned document");
        Ok(elements)
    }
}

/// Settings sent with the PDF upload
///
/// No chunking strategy is requested; image payloads must stay on
/// top-level `Image` elements.
fn form_fields() -> [(&'static str, &'static str); 4] {
    [
        ("strategy", "hi_res"),
        ("extract_image_block_types", "[\"Image\", \"Table\"]"),
        ("extract_image_block_to_payload", "true"),
        ("languages", "[\"eng\"]"),
    ]
}

/// Collect base64 image payloads from partitioned elements
pub fn image_payloads(elements: &[Element]) -> Vec<&str> {
    elements
        .iter()
        .filter(|el| el.category == "Image")
        .filter_map(|el| el.metadata.image_base64.as_deref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_deserialization() {
        let json = r#"[
            {"type": "Table", "text": "| AAPL | 20 |"},
            {"type": "Image", "metadata": {"image_base64": "aGVsbG8="}},
            {"type": "NarrativeText", "text": "Commentary.", "metadata": {}}
        ]"#;
        let elements: Vec<Element> = serde_json::from_str(json).unwrap();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0].category, "Table");
        assert_eq!(elements[0].text.as_deref(), Some("| AAPL | 20 |"));
        assert!(elements[0].metadata.image_base64.is_none());
    }

    #[test]
    fn test_upload_requests_flat_elements() {
        let fields = form_fields();
        assert!(
            fields
                .iter()
                .any(|(k, v)| *k == "strategy" && *v == "hi_res")
        );
        assert!(
            fields
                .iter()
                .any(|(k, v)| *k == "extract_image_block_to_payload" && *v == "true")
        );
        assert!(fields.iter().all(|(k, _)| *k != "chunking_strategy"));
    }

    #[test]
    fn test_image_payloads_filters_by_category() {
        let json = r#"[
            {"type": "Image", "metadata": {"image_base64": "aW1n"}},
            {"type": "Table", "metadata": {"image_base64": "dGFibGU="}},
            {"type": "Image", "metadata": {}}
        ]"#;
        let elements: Vec<Element> = serde_json::from_str(json).unwrap();
        assert_eq!(image_payloads(&elements), vec!["aW1n"]);
    }
}
