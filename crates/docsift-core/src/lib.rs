//! docsift-core - shared plumbing for document-to-text extraction.
//!
//! Provides the error taxonomy, injected configuration, the token cache
//! capability, the OCR access-token manager, HTTP fetching with scratch
//! files, and the result types used by `docsift-extractors`.
//!
//! # Features
//!
//! - `redis` - Redis-backed [`TokenCache`] implementation
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use docsift_core::{MemoryCache, TokenManager, DocsiftConfig};
//!
//! let config = DocsiftConfig::from_env();
//! let cache = Arc::new(MemoryCache::new());
//! let tokens = TokenManager::new(
//!     reqwest::Client::new(),
//!     &config.ocr.token_url,
//!     config.ocr.credentials()?,
//!     cache,
//!     &config.ocr.cache_key_prefix,
//! );
//! let token = tokens.access_token().await?;
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod source;
pub mod token;
pub mod types;

pub use cache::{MemoryCache, TokenCache};
#[cfg(feature = "redis")]
pub use cache::RedisCache;
pub use config::{DocsiftConfig, OcrConfig, OfficeOcrConfig, VisionConfig};
pub use error::{DocError, DocResult, ErrorCode, ErrorKind};
pub use fetch::{HttpFetcher, ScratchFile};
pub use source::{file_size, resolve_suffix, Source};
pub use token::{Credentials, TokenManager};
pub use types::{Extraction, QaPair, SheetTable, TextExtraction};
