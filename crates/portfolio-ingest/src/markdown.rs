//! Text extraction and pipe-table detection
//!
//! `pdf-extract` gives us the text layer of the document; tables authored
//! as pipe-delimited markdown (common in generated reports) survive that
//! pass intact, so we group consecutive lines containing `|` into table
//! blocks.

use crate::error::Result;
use std::path::Path;

/// Extract the text layer of a PDF
pub fn extract_text(pdf_path: impl AsRef<Path>) -> Result<String> {
    let text = pdf_extract::extract_text(pdf_path.as_ref())?;
    Ok(text)
}

/// Collect pipe-delimited table blocks from extracted text
///
/// Consecutive lines containing a `|` are grouped into one table; a table
/// ends at the first line without one. Blank lines between tables are
/// ignored.
pub fn extract_tables(text: &str) -> Vec<String> {
    let mut tables = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.contains('|') {
            current.push(line);
        } else if !current.is_empty() {
            tables.push(current.join("\n"));
            current.clear();
        }
    }
    if !current.is_empty() {
        tables.push(current.join("\n"));
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_table() {
        let text = "Intro paragraph.\n\n| Ticker | Shares |\n| MSFT | 10 |\n\nOutro.";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0], "| Ticker | Shares |\n| MSFT | 10 |");
    }

    #[test]
    fn test_multiple_tables_split_by_text() {
        let text = "| A | 1 |\nsome text\n| B | 2 |\n| B | 3 |";
        let tables = extract_tables(text);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[1], "| B | 2 |\n| B | 3 |");
    }

    #[test]
    fn test_table_at_end_of_input() {
        let text = "header\n| X | 9 |";
        let tables = extract_tables(text);
        assert_eq!(tables, vec!["| X | 9 |"]);
    }

    #[test]
    fn test_no_tables() {
        assert!(extract_tables("just prose, no pipes here").is_empty());
    }

    #[test]
    fn test_extract_text_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(extract_text(dir.path().join("missing.pdf")).is_err());
    }
}
