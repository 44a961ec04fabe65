//! PDF ingestion pipeline
//!
//! Turns an uploaded PDF into a flat list of [`SummaryRecord`]s saved as
//! JSON. Three extraction passes run over each document:
//!
//! 1. Markdown-style text extraction, with pipe-delimited tables parsed
//!    into per-row purchase entries by a local extraction model
//! 2. Layout partitioning via an external hi-res partition service,
//!    yielding tables and narrative text blocks
//! 3. Chart images (base64 payloads from the partition pass) interpreted
//!    by a vision model into structured JSON
//!
//! Extraction failures degrade to empty results with a warning; only
//! unreadable input files and unreachable services surface as errors.

pub mod chart;
pub mod error;
pub mod extract;
pub mod ingest;
pub mod markdown;
pub mod partition;
pub mod summary;

pub use chart::ChartAnalyzer;
pub use error::{IngestError, Result};
pub use extract::TableExtractor;
pub use ingest::{Ingestor, load_summaries};
pub use partition::{Element, PartitionClient};
pub use summary::{PurchaseEntry, RecordSource, SummaryRecord};
