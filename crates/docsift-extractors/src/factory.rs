//! Factory for creating extractors from configuration.

use std::sync::Arc;

use docsift_core::{DocResult, DocsiftConfig, HttpFetcher, TokenCache};

use crate::{Extractor, OcrClient, OfficeOcrClient, OfficeReader};

#[cfg(feature = "vision")]
use crate::VisionDescriber;

/// Factory for creating extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// HTTP fetcher writing scratch files to the configured directory.
    pub fn fetcher(config: &DocsiftConfig) -> HttpFetcher {
        HttpFetcher::new(reqwest::Client::new(), &config.scratch_dir)
    }

    /// Create the local office reader.
    pub fn office(config: &DocsiftConfig) -> Arc<dyn Extractor> {
        Arc::new(OfficeReader::new(Self::fetcher(config)))
    }

    /// Create the OCR API client. Requires OCR credentials.
    pub fn ocr(
        config: &DocsiftConfig,
        cache: Arc<dyn TokenCache>,
    ) -> DocResult<Arc<dyn Extractor>> {
        Ok(Arc::new(OcrClient::from_config(
            Self::fetcher(config),
            config,
            cache,
        )?))
    }

    /// Create the office-OCR client. Requires an endpoint.
    pub fn office_ocr(config: &DocsiftConfig) -> DocResult<Arc<dyn Extractor>> {
        Ok(Arc::new(OfficeOcrClient::new(
            Self::fetcher(config),
            config.office_ocr.clone(),
        )?))
    }

    /// Create the vision describer. Requires an API key.
    #[cfg(feature = "vision")]
    pub fn vision(config: &DocsiftConfig) -> DocResult<VisionDescriber> {
        VisionDescriber::new(config.vision.clone())
    }

    /// Every extractor the configuration enables, in routing priority order:
    /// office reader, OCR client (with credentials), office-OCR client (with
    /// an endpoint).
    pub fn all(
        config: &DocsiftConfig,
        cache: Arc<dyn TokenCache>,
    ) -> DocResult<Vec<Arc<dyn Extractor>>> {
        let mut extractors = vec![Self::office(config)];

        if config.ocr.has_credentials() {
            extractors.push(Self::ocr(config, cache)?);
        }

        if config.office_ocr.endpoint.is_some() {
            extractors.push(Self::office_ocr(config)?);
        }

        Ok(extractors)
    }
}
