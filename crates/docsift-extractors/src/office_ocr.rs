//! Client for the alternate office-OCR service.
//!
//! The service only accepts URLs. Each remote file is downloaded once to
//! measure its size against the service ceilings; the scratch copy is
//! removed before the recognition request is sent.

use async_trait::async_trait;
use docsift_core::{
    resolve_suffix, DocError, DocResult, ErrorCode, HttpFetcher, OfficeOcrConfig, Source,
    TextExtraction,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Extractor, IMAGE_SUFFIXES};

const PROVIDER: &str = "office-ocr";

#[derive(Debug, Serialize)]
struct OfficeOcrRequest<'a> {
    url: &'a str,
    page_num: i64,
}

#[derive(Debug, Deserialize)]
struct OfficeOcrResponse {
    success: bool,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Vec<String>,
}

/// Office-OCR service client.
pub struct OfficeOcrClient {
    fetcher: HttpFetcher,
    endpoint: String,
    config: OfficeOcrConfig,
    suffixes: Vec<&'static str>,
}

impl OfficeOcrClient {
    /// Create a client; fails when no endpoint is configured.
    pub fn new(fetcher: HttpFetcher, config: OfficeOcrConfig) -> DocResult<Self> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            DocError::Configuration(
                "Office OCR endpoint not configured. Set DOCSIFT_OFFICE_OCR_URL or office_ocr.endpoint in config.".to_string(),
            )
        })?;
        let mut suffixes = IMAGE_SUFFIXES.to_vec();
        suffixes.push("pdf");
        Ok(Self {
            fetcher,
            endpoint,
            config,
            suffixes,
        })
    }

    /// Recognize a remote image.
    pub async fn image_url(&self, url: &str) -> DocResult<TextExtraction> {
        self.recognize_url(url, self.config.max_image_bytes, 0).await
    }

    /// Recognize a remote PDF, up to the configured page window.
    pub async fn pdf_url(&self, url: &str) -> DocResult<TextExtraction> {
        self.recognize_url(url, self.config.max_pdf_bytes, self.config.pdf_page_num)
            .await
    }

    async fn recognize_url(
        &self,
        url: &str,
        limit: u64,
        page_num: i64,
    ) -> DocResult<TextExtraction> {
        let suffix = resolve_suffix(url)?;

        let size = {
            let scratch = self.fetcher.download(url, &suffix).await?;
            scratch.size()?
        };
        if size > limit {
            return Err(DocError::too_large("File", size, limit));
        }

        debug!(url, size, page_num, "Sending office OCR request");
        let response: OfficeOcrResponse = self
            .fetcher
            .client()
            .post(&self.endpoint)
            .json(&OfficeOcrRequest { url, page_num })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| {
                DocError::invalid_response(PROVIDER, format!("Failed to parse response: {}", e))
            })?;

        if !response.success {
            return Err(DocError::remote(PROVIDER, response.msg));
        }

        let text = response.data.join(",").trim_matches(',').to_string();
        Ok(TextExtraction::new(text, suffix, size))
    }
}

#[async_trait]
impl Extractor for OfficeOcrClient {
    async fn extract(&self, source: &Source) -> DocResult<TextExtraction> {
        let url = match source {
            Source::Url(url) => url,
            Source::Path(path) => {
                return Err(DocError::validation(
                    ErrorCode::ValUrlRequired,
                    format!("Office OCR needs a URL, got local path {}", path.display()),
                ))
            }
        };
        if source.suffix()?.eq_ignore_ascii_case("pdf") {
            self.pdf_url(url).await
        } else {
            self.image_url(url).await
        }
    }

    fn supported_suffixes(&self) -> &[&str] {
        &self.suffixes
    }

    fn name(&self) -> &str {
        "office-ocr"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(reqwest::Client::new(), std::env::temp_dir())
    }

    #[test]
    fn test_endpoint_required() {
        let err = OfficeOcrClient::new(fetcher(), OfficeOcrConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.kind(), docsift_core::ErrorKind::Configuration);
    }

    #[tokio::test]
    async fn test_local_path_rejected() {
        let config = OfficeOcrConfig {
            endpoint: Some("http://127.0.0.1:1/ocr".to_string()),
            ..Default::default()
        };
        let client = OfficeOcrClient::new(fetcher(), config).unwrap();
        assert!(client.supports("PDF"));

        let err = client
            .extract(&Source::parse("/tmp/scan.png"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValUrlRequired);
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(OfficeOcrRequest {
            url: "https://example.com/a.pdf",
            page_num: 30,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"url": "https://example.com/a.pdf", "page_num": 30})
        );
    }
}
