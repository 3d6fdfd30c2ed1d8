//! Input sources and the small resolution steps every pipeline starts with.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{DocError, DocResult};

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// Local file path.
    Path(PathBuf),
    /// Remote HTTP(S) URL.
    Url(String),
}

impl Source {
    /// Interpret a CLI-style argument: `http(s)://` prefixes are URLs,
    /// anything else is a path.
    pub fn parse(input: &str) -> Self {
        match url::Url::parse(input) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Source::Url(input.to_string()),
            _ => Source::Path(PathBuf::from(input)),
        }
    }

    /// The raw string form used for suffix resolution.
    pub fn as_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            Source::Path(p) => p.to_string_lossy(),
            Source::Url(u) => std::borrow::Cow::Borrowed(u.as_str()),
        }
    }

    /// Suffix of this source.
    pub fn suffix(&self) -> DocResult<String> {
        resolve_suffix(&self.as_str())
    }

    /// Check if this source is remote.
    pub fn is_url(&self) -> bool {
        matches!(self, Source::Url(_))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(p) => write!(f, "{}", p.display()),
            Source::Url(u) => f.write_str(u),
        }
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

/// Substring after the last `.` of the final path segment.
///
/// For an HTTP(S) URL the segment comes from the URL path, so the host and
/// the query string never contribute; for anything else it is the file
/// name. Fails when that segment has no `.` or ends in one.
pub fn resolve_suffix(input: &str) -> DocResult<String> {
    let name = match url::Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default()
            .to_string(),
        _ => input
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(input)
            .to_string(),
    };

    match name.rfind('.') {
        Some(idx) if idx + 1 < name.len() => Ok(name[idx + 1..].to_string()),
        _ => Err(DocError::missing_suffix(input)),
    }
}

/// Size in bytes of a local file.
pub fn file_size(path: &Path) -> DocResult<u64> {
    Ok(std::fs::metadata(path)?.len())
}
