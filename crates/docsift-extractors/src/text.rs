//! Plain text reading.

use docsift_core::{DocError, DocResult, ErrorCode};

/// Decode UTF-8 text, flattening newlines into spaces.
pub fn read_text(content: &[u8]) -> DocResult<String> {
    let text = std::str::from_utf8(content).map_err(|e| {
        DocError::validation(
            ErrorCode::ValInvalidEncoding,
            format!("File is not valid UTF-8: {}", e),
        )
    })?;
    Ok(text.replace('\n', " "))
}
