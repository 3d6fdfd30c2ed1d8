//! Extraction pipeline routing sources to extractors by file suffix.

use std::sync::Arc;

use docsift_core::{DocError, DocResult, DocsiftConfig, Source, TextExtraction, TokenCache};
use tracing::debug;

use crate::Extractor;

/// Pipeline for extracting content using registered extractors.
///
/// A source goes to the first registered extractor that supports its
/// suffix; registration order is priority order.
pub struct ExtractionPipeline {
    extractors: Vec<Arc<dyn Extractor>>,
}

impl ExtractionPipeline {
    /// Create new empty pipeline.
    pub fn new() -> Self {
        Self {
            extractors: Vec::new(),
        }
    }

    /// Create a pipeline with every extractor the configuration enables.
    pub fn from_config(config: &DocsiftConfig, cache: Arc<dyn TokenCache>) -> DocResult<Self> {
        Ok(Self {
            extractors: crate::ExtractorFactory::all(config, cache)?,
        })
    }

    /// Add an extractor to the pipeline.
    pub fn add_extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Extract a source with the first extractor supporting its suffix.
    ///
    /// The suffix is resolved before any I/O, so unusable sources fail
    /// without touching the filesystem or network.
    pub async fn extract(&self, source: &Source) -> DocResult<TextExtraction> {
        let suffix = source.suffix()?;
        let extractor = self
            .extractor_for(&suffix)
            .ok_or_else(|| DocError::unsupported_format(&suffix))?;

        debug!(source = %source, extractor = extractor.name(), "Routing extraction");
        extractor.extract(source).await
    }

    /// The extractor a suffix would be routed to.
    pub fn extractor_for(&self, suffix: &str) -> Option<&Arc<dyn Extractor>> {
        self.extractors.iter().find(|e| e.supports(suffix))
    }

    /// Check if pipeline can handle a given suffix.
    pub fn supports(&self, suffix: &str) -> bool {
        self.extractor_for(suffix).is_some()
    }

    /// List all supported suffixes.
    pub fn supported_suffixes(&self) -> Vec<&str> {
        self.extractors
            .iter()
            .flat_map(|e| e.supported_suffixes().iter().copied())
            .collect()
    }

    /// Get the number of registered extractors.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the pipeline has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
