//! OCR cloud API client for images and PDFs.
//!
//! Every recognition call is a form POST authorized by a token from the
//! [`TokenManager`]. PDFs are recognized one page per call, strictly in
//! order, with a fixed delay before each page.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use docsift_core::{
    file_size, resolve_suffix, DocError, DocResult, DocsiftConfig, ErrorCode, HttpFetcher,
    OcrConfig, Source, TextExtraction, TokenCache, TokenManager,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{pdf, Extractor};

const PROVIDER: &str = "ocr";

/// Flags sent with every recognition request.
const FLAGS: [(&str, &str); 4] = [
    ("detect_direction", "false"),
    ("detect_language", "false"),
    ("paragraph", "false"),
    ("probability", "false"),
];

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    words_result: Vec<WordResult>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WordResult {
    #[serde(default)]
    words: String,
}

/// OCR API client.
pub struct OcrClient {
    fetcher: HttpFetcher,
    tokens: TokenManager,
    config: OcrConfig,
}

impl OcrClient {
    /// Create a client from its parts.
    pub fn new(fetcher: HttpFetcher, tokens: TokenManager, config: OcrConfig) -> Self {
        Self {
            fetcher,
            tokens,
            config,
        }
    }

    /// Build a client from configuration without contacting the token issuer.
    pub fn from_config(
        fetcher: HttpFetcher,
        config: &DocsiftConfig,
        cache: Arc<dyn TokenCache>,
    ) -> DocResult<Self> {
        let tokens = TokenManager::new(
            fetcher.client().clone(),
            &config.ocr.token_url,
            config.ocr.credentials()?,
            cache,
            &config.ocr.cache_key_prefix,
        );
        Ok(Self::new(fetcher, tokens, config.ocr.clone()))
    }

    /// Build a client and obtain a token up front, so bad credentials fail here.
    pub async fn connect(
        fetcher: HttpFetcher,
        config: &DocsiftConfig,
        cache: Arc<dyn TokenCache>,
    ) -> DocResult<Self> {
        let client = Self::from_config(fetcher, config, cache)?;
        client.tokens.access_token().await?;
        info!(endpoint = %client.config.recognize_url, "OCR client connected");
        Ok(client)
    }

    /// Recognize a local image.
    pub async fn image(&self, path: &Path) -> DocResult<TextExtraction> {
        let suffix = resolve_suffix(&path.to_string_lossy())?;
        let size = file_size(path)?;
        let encoded = STANDARD.encode(tokio::fs::read(path).await?);
        self.check_payload(
            "Base64 image payload",
            &encoded,
            self.config.max_image_payload_bytes,
        )?;

        let text = self.recognize(&[("image", encoded.as_str())]).await?;
        Ok(TextExtraction::new(text, suffix, size))
    }

    /// Recognize a remote image by handing its URL to the API.
    ///
    /// The body is still fetched once to measure its size and enforce the
    /// payload ceiling.
    pub async fn image_url(&self, url: &str) -> DocResult<TextExtraction> {
        let suffix = resolve_suffix(url)?;
        if url.len() > self.config.max_url_len {
            return Err(DocError::validation(
                ErrorCode::ValUrlTooLong,
                format!(
                    "Image URL is {} bytes, limit is {} bytes",
                    url.len(),
                    self.config.max_url_len
                ),
            ));
        }

        let body = self.fetcher.fetch_bytes(url).await?;
        let size = body.len() as u64;
        let encoded = STANDARD.encode(&body);
        self.check_payload(
            "Base64 image payload",
            &encoded,
            self.config.max_image_payload_bytes,
        )?;

        let text = self.recognize(&[("url", url)]).await?;
        Ok(TextExtraction::new(text, suffix, size))
    }

    /// Recognize a local PDF page by page. The file is left in place.
    pub async fn pdf(&self, path: &Path) -> DocResult<TextExtraction> {
        let suffix = resolve_suffix(&path.to_string_lossy())?;
        self.pdf_file(path, suffix).await
    }

    /// Recognize a remote PDF through a scratch copy.
    pub async fn pdf_url(&self, url: &str) -> DocResult<TextExtraction> {
        let suffix = resolve_suffix(url)?;
        let scratch = self.fetcher.download(url, &suffix).await?;
        self.pdf_file(scratch.path(), suffix).await
    }

    async fn pdf_file(&self, path: &Path, suffix: String) -> DocResult<TextExtraction> {
        let pages = {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || pdf::page_count(&path))
                .await
                .map_err(|e| DocError::Internal(format!("Page count task failed: {}", e)))??
        };
        if pages > self.config.max_pdf_pages {
            return Err(DocError::too_many_pages(pages, self.config.max_pdf_pages));
        }

        let size = file_size(path)?;
        let encoded = STANDARD.encode(tokio::fs::read(path).await?);
        self.check_payload(
            "Base64 PDF payload",
            &encoded,
            self.config.max_pdf_payload_bytes,
        )?;

        let delay = self.config.page_delay();
        let mut text = String::new();
        for page in 1..=pages {
            tokio::time::sleep(delay).await;
            debug!(page, pages, "Recognizing PDF page");
            let page_number = page.to_string();
            text.push_str(
                &self
                    .recognize(&[
                        ("pdf_file", encoded.as_str()),
                        ("pdf_file_num", page_number.as_str()),
                    ])
                    .await?,
            );
        }

        Ok(TextExtraction::new(text, suffix, size))
    }

    /// Send one recognition request and join the recognized lines.
    pub async fn recognize(&self, fields: &[(&str, &str)]) -> DocResult<String> {
        let token = self.tokens.access_token().await?;

        let mut form: Vec<(&str, &str)> = FLAGS.to_vec();
        form.extend_from_slice(fields);

        let body = self
            .fetcher
            .client()
            .post(&self.config.recognize_url)
            .query(&[("access_token", token.as_str())])
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let response: RecognizeResponse = serde_json::from_str(&body).map_err(|e| {
            DocError::invalid_response(
                PROVIDER,
                format!("Failed to parse recognition response: {}", e),
            )
        })?;

        if let Some(code) = response.error_code.filter(|c| *c != 0) {
            return Err(DocError::remote(
                PROVIDER,
                format!("{}: {}", code, response.error_msg.unwrap_or_default()),
            ));
        }

        let lines: Vec<&str> = response
            .words_result
            .iter()
            .map(|w| w.words.as_str())
            .collect();
        Ok(lines.join(" ").trim_end().to_string())
    }

    fn check_payload(&self, what: &str, encoded: &str, limit: u64) -> DocResult<()> {
        let len = encoded.len() as u64;
        if len > limit {
            return Err(DocError::too_large(what, len, limit));
        }
        Ok(())
    }
}

#[async_trait]
impl Extractor for OcrClient {
    async fn extract(&self, source: &Source) -> DocResult<TextExtraction> {
        let is_pdf = source.suffix()?.eq_ignore_ascii_case("pdf");
        match (source, is_pdf) {
            (Source::Path(path), true) => self.pdf(path).await,
            (Source::Path(path), false) => self.image(path).await,
            (Source::Url(url), true) => self.pdf_url(url).await,
            (Source::Url(url), false) => self.image_url(url).await,
        }
    }

    fn supported_suffixes(&self) -> &[&str] {
        &OCR_SUFFIXES
    }

    fn name(&self) -> &str {
        "ocr"
    }
}

const OCR_SUFFIXES: [&str; 9] = [
    "jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp", "pdf",
];
