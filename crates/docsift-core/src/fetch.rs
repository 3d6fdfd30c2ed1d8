//! HTTP fetching and scratch-file management for URL sources.

use reqwest::Client;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{DocError, DocResult};

/// Local copy of a remote resource, removed when dropped.
///
/// Scratch names are derived from the URL alone, so two concurrent
/// requests for the same URL share (and race on) one file.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Path of the downloaded file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the downloaded file in bytes.
    pub fn size(&self) -> DocResult<u64> {
        crate::source::file_size(&self.path)
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) => debug!(path = %self.path.display(), error = %e, "Scratch file already gone"),
        }
    }
}

/// GET-side HTTP helper shared by every extractor.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    scratch_dir: PathBuf,
}

impl HttpFetcher {
    /// Create a fetcher writing scratch files under `scratch_dir`.
    pub fn new(client: Client, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Deterministic scratch file name for a URL.
    pub fn scratch_name(url: &str, suffix: &str) -> String {
        format!("temporary{:x}.{}", md5::compute(url.as_bytes()), suffix)
    }

    /// Fetch a remote body into memory.
    pub async fn fetch_bytes(&self, url: &str) -> DocResult<Vec<u8>> {
        debug!(url, "Fetching remote body");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport(url, e))?
            .error_for_status()
            .map_err(|e| transport(url, e))?;

        let bytes = response.bytes().await.map_err(|e| transport(url, e))?;
        Ok(bytes.to_vec())
    }

    /// Download a remote file into the scratch directory.
    pub async fn download(&self, url: &str, suffix: &str) -> DocResult<ScratchFile> {
        let body = self.fetch_bytes(url).await?;
        let target = self.scratch_dir.join(Self::scratch_name(url, suffix));

        let mut tmp = tempfile::NamedTempFile::new_in(&self.scratch_dir)?;
        tmp.write_all(&body)?;
        tmp.persist(&target).map_err(|e| DocError::Io(e.error))?;

        debug!(url, path = %target.display(), bytes = body.len(), "Saved scratch file");
        Ok(ScratchFile { path: target })
    }
}

fn transport(url: &str, err: reqwest::Error) -> DocError {
    let mut converted = DocError::from(err);
    if let DocError::Transport { message, .. } = &mut converted {
        *message = format!("Failed to fetch {}: {}", url, message);
    }
    converted
}
