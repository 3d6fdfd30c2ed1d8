//! Result types returned by every extraction entry point.

use serde::{Deserialize, Serialize};

/// Extracted content plus the metadata of the file it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction<T> {
    /// Extracted text or structured rows.
    pub content: T,
    /// File suffix inferred from the path or URL.
    pub suffix: String,
    /// Size of the source file in bytes.
    pub size: u64,
}

impl<T> Extraction<T> {
    /// Create a new extraction result.
    pub fn new(content: T, suffix: impl Into<String>, size: u64) -> Self {
        Self {
            content,
            suffix: suffix.into(),
            size,
        }
    }

    /// Transform the content, keeping the metadata.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extraction<U> {
        Extraction {
            content: f(self.content),
            suffix: self.suffix,
            size: self.size,
        }
    }
}

/// Plain-text extraction.
pub type TextExtraction = Extraction<String>;

/// One flattened spreadsheet row: the first two cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

/// A whole sheet, header row included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetTable {
    /// Sheet name as shown in the workbook.
    pub name: String,
    /// Cell text, row by row.
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Render as text, one row per line with cells joined by ` | `.
    pub fn to_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.join(" | "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
