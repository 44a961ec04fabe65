//! Summary record types written by the ingestion pipeline
//!
//! The summaries file is a flat JSON array of tagged records. Each record
//! keeps its extraction source and, where applicable, the raw content it
//! was derived from so answers can be traced back to the document.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a record was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordSource {
    /// Markdown-style text extraction pass
    Markdown,
    /// Layout partition pass over the PDF
    Pdf,
    /// Chart image analysis pass
    Image,
}

/// A single extracted record in the summaries file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SummaryRecord {
    /// Narrative text block, stored as-is
    Text {
        /// Extraction source
        source: RecordSource,
        /// Block text
        raw: String,
    },

    /// A table with its per-row bullet summaries
    Table {
        /// Extraction source
        source: RecordSource,
        /// One bullet line per table row
        summary: Vec<String>,
        /// Original table text
        raw: String,
    },

    /// A single purchase row lifted out of a markdown table
    PurchaseEntry {
        /// Extraction source
        source: RecordSource,
        /// Bullet line for this row
        summary: String,
        /// The table the row came from
        raw: String,
    },

    /// Structured data interpreted from a chart image
    Chart {
        /// Extraction source
        source: RecordSource,
        /// Model-extracted JSON payload
        extracted: Value,
    },
}

impl SummaryRecord {
    /// The text that should be embedded for retrieval
    ///
    /// Text records embed their raw content; tables embed their joined
    /// bullets; charts embed the extracted JSON rendered as a string.
    pub fn embedding_text(&self) -> String {
        match self {
            SummaryRecord::Text { raw, .. } => raw.clone(),
            SummaryRecord::Table { summary, .. } => summary.join("\n"),
            SummaryRecord::PurchaseEntry { summary, .. } => summary.clone(),
            SummaryRecord::Chart { extracted, .. } => extracted.to_string(),
        }
    }
}

/// One purchase row as extracted by the table model
///
/// Every field is optional; the model omits what it cannot read rather
/// than inventing values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseEntry {
    /// Ticker symbol, e.g. "MSFT"
    pub ticker: Option<String>,
    /// Purchase date (YYYY-MM-DD)
    pub purchase_date: Option<NaiveDate>,
    /// Price per share at purchase
    pub price: Option<f64>,
    /// Number of shares bought
    pub shares: Option<i64>,
}

impl PurchaseEntry {
    /// Render the entry as a one-line bullet summary
    ///
    /// Unknown fields render as `unknown` so a partially-read row still
    /// produces a usable line.
    pub fn bullet(&self) -> String {
        let ticker = self.ticker.as_deref().unwrap_or("unknown");
        let shares = self
            .shares
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let price = self
            .price
            .map(|p| p.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let date = self
            .purchase_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("- {ticker}: {shares} shares @ {price} (bought {date})")
    }
}
