//! Error types for docsift operations.
//!
//! Every failure carries a coarse [`ErrorKind`] (validation, transport,
//! remote API, cache, ...) and a stable [`ErrorCode`] so callers can branch
//! on the category without parsing messages.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for docsift operations.
pub type DocResult<T> = Result<T, DocError>;

/// Main error type for all docsift operations.
#[derive(Error, Debug)]
pub enum DocError {
    /// Input rejected before any remote call was made.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
    },

    /// Fetch or post failed at the transport level.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote service answered, but with a failure.
    #[error("Remote API error ({provider}): {message}")]
    RemoteApi {
        message: String,
        code: ErrorCode,
        provider: String,
    },

    /// Token cache operation failed.
    #[error("Cache error: {message}")]
    Cache {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A local document could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Transport,
    RemoteApi,
    Cache,
    Parse,
    Configuration,
    Internal,
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValMissingSuffix,
    ValFileTooLarge,
    ValTooManyPages,
    ValInvalidEncoding,
    ValUrlTooLong,
    ValUnsupportedFormat,
    ValUrlRequired,

    // Network (NET_xxx)
    NetRequestFailed,
    NetBadStatus,

    // Remote API (API_xxx)
    ApiRejected,
    ApiInvalidResponse,
    ApiEmptyResult,

    // Cache (CACHE_xxx)
    CacheReadFailed,
    CacheWriteFailed,

    // Parse (PARSE_xxx)
    ParseCorruptDocument,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValMissingSuffix => "VAL_001",
            ErrorCode::ValFileTooLarge => "VAL_002",
            ErrorCode::ValTooManyPages => "VAL_003",
            ErrorCode::ValInvalidEncoding => "VAL_004",
            ErrorCode::ValUrlTooLong => "VAL_005",
            ErrorCode::ValUnsupportedFormat => "VAL_006",
            ErrorCode::ValUrlRequired => "VAL_007",
            ErrorCode::NetRequestFailed => "NET_001",
            ErrorCode::NetBadStatus => "NET_002",
            ErrorCode::ApiRejected => "API_001",
            ErrorCode::ApiInvalidResponse => "API_002",
            ErrorCode::ApiEmptyResult => "API_003",
            ErrorCode::CacheReadFailed => "CACHE_001",
            ErrorCode::CacheWriteFailed => "CACHE_002",
            ErrorCode::ParseCorruptDocument => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl DocError {
    /// Create a validation error with an explicit code.
    pub fn validation(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code,
            details: HashMap::new(),
        }
    }

    /// Error for a path or URL with no usable suffix.
    pub fn missing_suffix(input: &str) -> Self {
        let mut details = HashMap::new();
        details.insert("input".to_string(), input.to_string());
        Self::Validation {
            message: format!(
                "'{}' has no file suffix or ends with a dot",
                input
            ),
            code: ErrorCode::ValMissingSuffix,
            details,
        }
    }

    /// Error for a payload over its size ceiling.
    pub fn too_large(what: &str, size: u64, limit: u64) -> Self {
        let mut details = HashMap::new();
        details.insert("size".to_string(), size.to_string());
        details.insert("limit".to_string(), limit.to_string());
        Self::Validation {
            message: format!("{} is {} bytes, limit is {} bytes", what, size, limit),
            code: ErrorCode::ValFileTooLarge,
            details,
        }
    }

    /// Error for a PDF over the page cap.
    pub fn too_many_pages(pages: usize, limit: usize) -> Self {
        let mut details = HashMap::new();
        details.insert("pages".to_string(), pages.to_string());
        details.insert("limit".to_string(), limit.to_string());
        Self::Validation {
            message: format!("PDF has {} pages, at most {} are allowed", pages, limit),
            code: ErrorCode::ValTooManyPages,
            details,
        }
    }

    /// Error for a suffix no extractor handles.
    pub fn unsupported_format(suffix: &str) -> Self {
        Self::validation(
            ErrorCode::ValUnsupportedFormat,
            format!("Unsupported file suffix: {}", suffix),
        )
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            code: ErrorCode::NetRequestFailed,
            source: None,
        }
    }

    /// Create a remote API error for the given provider.
    pub fn remote(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            message: message.into(),
            code: ErrorCode::ApiRejected,
            provider: provider.into(),
        }
    }

    /// Create a remote API error for a body that could not be understood.
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteApi {
            message: message.into(),
            code: ErrorCode::ApiInvalidResponse,
            provider: provider.into(),
        }
    }

    /// Create a cache read error.
    pub fn cache_read(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            code: ErrorCode::CacheReadFailed,
            source: None,
        }
    }

    /// Create a cache write error.
    pub fn cache_write(message: impl Into<String>) -> Self {
        Self::Cache {
            message: message.into(),
            code: ErrorCode::CacheWriteFailed,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseCorruptDocument,
        }
    }

    /// Get the coarse error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::RemoteApi { .. } => ErrorKind::RemoteApi,
            Self::Cache { .. } => ErrorKind::Cache,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Io(_) | Self::Serialization(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::Transport { code, .. } => *code,
            Self::RemoteApi { code, .. } => *code,
            Self::Cache { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Human-readable text without the category prefix, when there is one.
    pub fn display_message(&self) -> Option<&str> {
        match self {
            Self::Validation { message, .. }
            | Self::Transport { message, .. }
            | Self::RemoteApi { message, .. }
            | Self::Cache { message, .. }
            | Self::Parse { message, .. } => Some(message),
            Self::Configuration(message) | Self::Internal(message) => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DocError {
    fn from(err: reqwest::Error) -> Self {
        let code = if err.is_status() {
            ErrorCode::NetBadStatus
        } else {
            ErrorCode::NetRequestFailed
        };
        Self::Transport {
            message: err.to_string(),
            code,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_suffix_error() {
        let err = DocError::missing_suffix("https://example.com/file");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), ErrorCode::ValMissingSuffix);
        assert!(err.to_string().contains("https://example.com/file"));
    }

    #[test]
    fn test_too_large_details() {
        let err = DocError::too_large("image payload", 10, 5);
        match err {
            DocError::Validation { details, code, .. } => {
                assert_eq!(code, ErrorCode::ValFileTooLarge);
                assert_eq!(details.get("size").map(String::as_str), Some("10"));
                assert_eq!(details.get("limit").map(String::as_str), Some("5"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_remote_error_kind() {
        let err = DocError::remote("ocr", "invalid_client");
        assert_eq!(err.kind(), ErrorKind::RemoteApi);
        assert_eq!(err.display_message(), Some("invalid_client"));
        assert!(err.to_string().contains("(ocr)"));
    }

    #[test]
    fn test_cache_codes() {
        assert_eq!(DocError::cache_read("down").code(), ErrorCode::CacheReadFailed);
        assert_eq!(DocError::cache_write("down").code(), ErrorCode::CacheWriteFailed);
        assert_eq!(DocError::cache_write("down").kind(), ErrorKind::Cache);
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValMissingSuffix.as_str(), "VAL_001");
        assert_eq!(ErrorCode::CacheWriteFailed.as_str(), "CACHE_002");
        assert_eq!(ErrorCode::Internal.as_str(), "INT_001");
    }
}
