//! Ingestion orchestrator
//!
//! Runs the three extraction passes over a PDF and writes the combined
//! records to a summaries JSON file.

use crate::chart::ChartAnalyzer;
use crate::error::Result;
use crate::extract::TableExtractor;
use crate::markdown;
use crate::partition::{self, PartitionClient};
use crate::summary::{RecordSource, SummaryRecord};
use std::path::Path;
use tracing::{info, instrument};

/// Orchestrates PDF ingestion into summary records
pub struct Ingestor {
    tables: TableExtractor,
    partition: PartitionClient,
    charts: ChartAnalyzer,
}

impl Ingestor {
    /// Create a new ingestor from its three extraction stages
    pub fn new(tables: TableExtractor, partition: PartitionClient, charts: ChartAnalyzer) -> Self {
        Self {
            tables,
            partition,
            charts,
        }
    }

    /// Ingest a PDF and write the records to `output_path`
    ///
    /// Returns the records that were written. The output file is always
    /// written, even when every extraction pass came back empty.
    #[instrument(skip_all, fields(pdf = %pdf_path.as_ref().display()))]
    pub async fn ingest(
        &self,
        pdf_path: impl AsRef<Path>,
        output_path: impl AsRef<Path>,
    ) -> Result<Vec<SummaryRecord>> {
        let pdf_path = pdf_path.as_ref();
        let mut records = Vec::new();

        // Pass 1: text layer, pipe-delimited tables into per-row entries
        let text = markdown::extract_text(pdf_path)?;
        let md_tables = markdown::extract_tables(&text);
        info!(count = md_tables.len(), "markdown tables found");

        for table in &md_tables {
            for bullet in self.tables.extract_bullets(table).await {
                records.push(SummaryRecord::PurchaseEntry {
                    source: RecordSource::Markdown,
                    summary: bullet,
                    raw: table.clone(),
                });
            }
        }

        // Pass 2: layout partition into tables and narrative blocks
        let elements = self.partition.partition(pdf_path).await?;
        for element in &elements {
            match element.category.as_str() {
                "Table" => {
                    let raw = element.text.clone().unwrap_or_default();
                    let summary = self.tables.extract_bullets(&raw).await;
                    records.push(SummaryRecord::Table {
                        source: RecordSource::Pdf,
                        summary,
                        raw,
                    });
                }
                "NarrativeText" | "CompositeElement" => {
                    records.push(SummaryRecord::Text {
                        source: RecordSource::Pdf,
                        raw: element.text.clone().unwrap_or_default(),
                    });
                }
                _ => {}
            }
        }

        // Pass 3: chart images into structured JSON
        for image in partition::image_payloads(&elements) {
            if let Some(extracted) = self.charts.analyze(image).await {
                records.push(SummaryRecord::Chart {
                    source: RecordSource::Image,
                    extracted,
                });
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(output_path.as_ref(), json).await?;
        info!(
            count = records.len(),
            output = %output_path.as_ref().display(),
            "saved summaries"
        );

        Ok(records)
    }
}

/// Load previously written summary records from a JSON file
pub fn load_summaries(path: impl AsRef<Path>) -> Result<Vec<SummaryRecord>> {
    let data = std::fs::read_to_string(path)?;
    let records = serde_json::from_str(&data)?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_summaries_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("summaries.json");

        let records = vec![
            SummaryRecord::Text {
                source: RecordSource::Pdf,
                raw: "Quarterly commentary.".to_string(),
            },
            SummaryRecord::PurchaseEntry {
                source: RecordSource::Markdown,
                summary: "- AAPL: 20 shares @ 145.3 (bought 2023-05-10)".to_string(),
                raw: "| AAPL | 2023-05-10 | 145.30 | 20 |".to_string(),
            },
        ];
        std::fs::write(&path, serde_json::to_string_pretty(&records).unwrap()).unwrap();

        let loaded = load_summaries(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(matches!(loaded[1], SummaryRecord::PurchaseEntry { .. }));
    }

    #[test]
    fn test_load_summaries_missing_file() {
        assert!(load_summaries("/nonexistent/summaries.json").is_err());
    }
}
