//! Configuration system for docsift.
//!
//! Endpoint URLs, size ceilings and credentials are injected here at
//! construction time; nothing in the library reads process-wide globals.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{DocError, DocResult};
use crate::token::Credentials;

const MIB: u64 = 1024 * 1024;

/// OCR cloud API configuration (token issuer + recognition endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// OAuth-style client-credentials token endpoint.
    pub token_url: String,
    /// Recognition endpoint; the access token is appended as a query parameter.
    pub recognize_url: String,
    /// Client id issued by the OCR provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Client secret issued by the OCR provider.
    #[serde(skip_serializing)]
    pub api_secret: Option<SecretString>,
    /// Namespace prepended to the hashed client id to form the cache key.
    pub cache_key_prefix: String,
    /// Delay awaited before every per-page PDF call.
    pub page_delay_ms: u64,
    /// Maximum number of PDF pages sent for recognition.
    pub max_pdf_pages: usize,
    /// Ceiling for the base64 payload of a single image.
    pub max_image_payload_bytes: u64,
    /// Ceiling for the base64 payload of a PDF.
    pub max_pdf_payload_bytes: u64,
    /// Longest image URL the recognition endpoint accepts.
    pub max_url_len: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            token_url: "https://aip.baidubce.com/oauth/2.0/token".to_string(),
            recognize_url: "https://aip.baidubce.com/rest/2.0/ocr/v1/general_basic".to_string(),
            api_key: None,
            api_secret: None,
            cache_key_prefix: "docsift:ocr:".to_string(),
            page_delay_ms: 300,
            max_pdf_pages: 20,
            max_image_payload_bytes: 8 * MIB,
            max_pdf_payload_bytes: 5 * MIB,
            max_url_len: 1024,
        }
    }
}

impl OcrConfig {
    /// Delay between sequential page calls.
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Whether both halves of the credential pair are present.
    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }

    /// Credential pair for the token issuer.
    pub fn credentials(&self) -> DocResult<Credentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Ok(Credentials::new(key.clone(), secret.clone())),
            _ => Err(DocError::Configuration(
                "OCR credentials not found. Set DOCSIFT_OCR_API_KEY and DOCSIFT_OCR_API_SECRET or provide ocr.api_key/ocr.api_secret in config.".to_string(),
            )),
        }
    }
}

/// Alternate office-OCR service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficeOcrConfig {
    /// JSON endpoint accepting `{url, page_num}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Largest image the service accepts.
    pub max_image_bytes: u64,
    /// Largest PDF the service accepts.
    pub max_pdf_bytes: u64,
    /// Page window requested for PDFs.
    pub pdf_page_num: i64,
}

impl Default for OfficeOcrConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_image_bytes: 10 * MIB,
            max_pdf_bytes: 20 * MIB,
            pdf_page_num: 30,
        }
    }
}

/// Vision language model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    /// API key for the OpenAI-compatible endpoint.
    #[serde(skip_serializing)]
    pub api_key: Option<SecretString>,
    /// Base URL override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Vision-capable model name.
    pub model: String,
    /// System instruction sent ahead of the image.
    pub system_prompt: String,
    /// Question sent alongside the image.
    pub user_prompt: String,
    /// Max tokens for the description.
    pub max_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: "gpt-4o".to_string(),
            system_prompt: "You are an image recognition assistant.".to_string(),
            user_prompt: "What is the content of this image?".to_string(),
            max_tokens: 1000,
        }
    }
}

/// Main docsift configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsiftConfig {
    /// OCR cloud API.
    pub ocr: OcrConfig,
    /// Alternate office-OCR service.
    pub office_ocr: OfficeOcrConfig,
    /// Vision language model.
    pub vision: VisionConfig,
    /// Directory that holds downloaded scratch files.
    pub scratch_dir: PathBuf,
}

impl Default for DocsiftConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            office_ocr: OfficeOcrConfig::default(),
            vision: VisionConfig::default(),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl DocsiftConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> DocResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| DocError::Configuration(e.to_string()))
            }
            Some("json") => {
                serde_json::from_str(&content).map_err(|e| DocError::Configuration(e.to_string()))
            }
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&content).map_err(|e| DocError::Configuration(e.to_string()))
            }
            _ => Err(DocError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Overlay environment variables onto an existing configuration.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("DOCSIFT_OCR_API_KEY") {
            self.ocr.api_key = Some(key);
        }
        if let Ok(secret) = std::env::var("DOCSIFT_OCR_API_SECRET") {
            self.ocr.api_secret = Some(SecretString::new(secret));
        }
        if let Ok(url) = std::env::var("DOCSIFT_OCR_TOKEN_URL") {
            self.ocr.token_url = url;
        }
        if let Ok(url) = std::env::var("DOCSIFT_OCR_RECOGNIZE_URL") {
            self.ocr.recognize_url = url;
        }
        if let Some(delay) = std::env::var("DOCSIFT_OCR_PAGE_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.ocr.page_delay_ms = delay;
        }

        if let Ok(url) = std::env::var("DOCSIFT_OFFICE_OCR_URL") {
            self.office_ocr.endpoint = Some(url);
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.vision.api_key = Some(SecretString::new(api_key));
        }
        if let Ok(url) = std::env::var("DOCSIFT_VISION_BASE_URL") {
            self.vision.base_url = Some(url);
        }
        if let Ok(model) = std::env::var("DOCSIFT_VISION_MODEL") {
            self.vision.model = model;
        }

        if let Ok(dir) = std::env::var("DOCSIFT_SCRATCH_DIR") {
            self.scratch_dir = PathBuf::from(dir);
        }
    }

    /// Set OCR credentials.
    pub fn with_ocr_credentials(
        mut self,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
    ) -> Self {
        self.ocr.api_key = Some(api_key.into());
        self.ocr.api_secret = Some(SecretString::new(api_secret.into()));
        self
    }

    /// Set the scratch directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }
}
