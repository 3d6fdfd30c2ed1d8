//! docsift-extractors - OCR, vision and office-format extraction.
//!
//! Provides the OCR API client, the office-OCR client, the vision
//! describer and local readers for Word, Excel, PowerPoint and plain text,
//! all behind a suffix-routed [`Extractor`] trait.
//!
//! # Features
//!
//! - `vision` (default) - image description via an OpenAI-compatible vision model
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docsift_core::{DocsiftConfig, MemoryCache, Source};
//! use docsift_extractors::ExtractionPipeline;
//!
//! let config = DocsiftConfig::from_env();
//! let pipeline = ExtractionPipeline::from_config(&config, Arc::new(MemoryCache::new()))?;
//! let result = pipeline.extract(&Source::parse("https://example.com/report.pdf")).await?;
//! println!("{} ({} bytes)", result.content, result.size);
//! ```

mod factory;
mod ooxml;
mod pipeline;

pub mod docx;
pub mod office;
pub mod office_ocr;
pub mod ocr;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

#[cfg(feature = "vision")]
pub mod vision;

pub use factory::ExtractorFactory;
pub use office::OfficeReader;
pub use office_ocr::OfficeOcrClient;
pub use ocr::OcrClient;
pub use pipeline::ExtractionPipeline;

#[cfg(feature = "vision")]
pub use vision::VisionDescriber;

use async_trait::async_trait;
use docsift_core::{DocResult, Source, TextExtraction};

/// Suffixes routed to the image OCR paths.
pub const IMAGE_SUFFIXES: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Core Extractor trait - every extraction backend implements this.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the text of a local or remote document.
    async fn extract(&self, source: &Source) -> DocResult<TextExtraction>;

    /// File suffixes this extractor handles, lowercase.
    fn supported_suffixes(&self) -> &[&str];

    /// Check if this extractor handles the given suffix (case-insensitive).
    fn supports(&self, suffix: &str) -> bool {
        self.supported_suffixes()
            .iter()
            .any(|s| s.eq_ignore_ascii_case(suffix))
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}

/// Run a CPU-bound parser on the blocking pool.
pub(crate) async fn parse_blocking<T, F>(content: Vec<u8>, parse: F) -> DocResult<T>
where
    T: Send + 'static,
    F: FnOnce(&[u8]) -> DocResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || parse(&content))
        .await
        .map_err(|e| docsift_core::DocError::Internal(format!("Parser task failed: {}", e)))?
}
