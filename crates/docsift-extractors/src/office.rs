//! Local readers for Word, Excel, PowerPoint and plain text documents.
//!
//! URL sources are downloaded to a scratch file first; local files are read
//! in place and never removed.

use async_trait::async_trait;
use docsift_core::{
    file_size, DocResult, Extraction, HttpFetcher, QaPair, SheetTable, Source, TextExtraction,
};
use tracing::debug;

use crate::{docx, parse_blocking, pptx, text, xlsx, Extractor};

/// Reader for the office formats parsed in-process.
#[derive(Debug, Clone)]
pub struct OfficeReader {
    fetcher: HttpFetcher,
}

impl OfficeReader {
    /// Create a reader downloading URL sources through `fetcher`.
    pub fn new(fetcher: HttpFetcher) -> Self {
        Self { fetcher }
    }

    /// Paragraph text of a `.docx` document.
    pub async fn word(&self, source: &Source) -> DocResult<TextExtraction> {
        self.read(source, docx::read_docx).await
    }

    /// Question/answer pairs from every sheet of a `.xlsx` workbook.
    pub async fn excel_pairs(&self, source: &Source) -> DocResult<Extraction<Vec<QaPair>>> {
        self.read(source, xlsx::read_pairs).await
    }

    /// Full tables, header rows included, from every sheet of a `.xlsx` workbook.
    pub async fn excel_tables(&self, source: &Source) -> DocResult<Extraction<Vec<SheetTable>>> {
        self.read(source, xlsx::read_tables).await
    }

    /// Slide text of a `.pptx` presentation.
    pub async fn presentation(&self, source: &Source) -> DocResult<TextExtraction> {
        self.read(source, pptx::read_pptx).await
    }

    /// Plain text with newlines flattened into spaces.
    pub async fn text(&self, source: &Source) -> DocResult<TextExtraction> {
        self.read(source, text::read_text).await
    }

    async fn read<T, F>(&self, source: &Source, parse: F) -> DocResult<Extraction<T>>
    where
        T: Send + 'static,
        F: FnOnce(&[u8]) -> DocResult<T> + Send + 'static,
    {
        let suffix = source.suffix()?;

        let (content, size) = match source {
            Source::Path(path) => {
                let size = file_size(path)?;
                (tokio::fs::read(path).await?, size)
            }
            Source::Url(url) => {
                let scratch = self.fetcher.download(url, &suffix).await?;
                let size = scratch.size()?;
                (tokio::fs::read(scratch.path()).await?, size)
            }
        };

        debug!(source = %source, suffix = %suffix, size, "Parsing office document");
        let parsed = parse_blocking(content, parse).await?;
        Ok(Extraction::new(parsed, suffix, size))
    }
}

#[async_trait]
impl Extractor for OfficeReader {
    async fn extract(&self, source: &Source) -> DocResult<TextExtraction> {
        let suffix = source.suffix()?.to_ascii_lowercase();
        match suffix.as_str() {
            "docx" => self.word(source).await,
            "xlsx" => self
                .excel_tables(source)
                .await
                .map(|e| e.map(|tables| render_tables(&tables))),
            "pptx" => self.presentation(source).await,
            "txt" | "md" | "csv" => self.text(source).await,
            other => Err(docsift_core::DocError::unsupported_format(other)),
        }
    }

    fn supported_suffixes(&self) -> &[&str] {
        &["docx", "xlsx", "pptx", "txt", "md", "csv"]
    }

    fn name(&self) -> &str {
        "office"
    }
}

/// One row per line across all sheets, cells joined with ` | `.
fn render_tables(tables: &[SheetTable]) -> String {
    tables
        .iter()
        .filter(|t| !t.rows.is_empty())
        .map(SheetTable::to_text)
        .collect::<Vec<_>>()
        .join("\n")
}
