//! Blob stasher: local filesystem storage for uploaded material files.
//!
//! Files land under the configured upload root and are served back through
//! the site's own `/static/uploads/` path, so the retrieval URL is built
//! from the site's public base URL rather than a separate storage service.

use std::path::{Path, PathBuf};

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

/// Public path under which stashed files are served.
const PUBLIC_PREFIX: &str = "/static/uploads";

/// Errors from stashing or removing blobs.
#[derive(Debug, Error)]
pub enum StashError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The filename sanitized down to nothing, or tried to escape the
    /// upload root.
    #[error("unusable filename: {0:?}")]
    InvalidFilename(String),
}

/// A stashed blob: its stored name and its public URL.
#[derive(Debug, Clone)]
pub struct StashedFile {
    pub file_name: String,
    pub url: String,
}

/// Filesystem-backed blob storage.
#[derive(Debug, Clone)]
pub struct BlobStash {
    root: PathBuf,
    public_base: String,
}

impl BlobStash {
    /// Create the stash, ensuring the upload root exists.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the root directory cannot be created.
    pub async fn new(root: impl Into<PathBuf>, base_url: &str) -> Result<Self, StashError> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base: format!("{}{PUBLIC_PREFIX}", base_url.trim_end_matches('/')),
        })
    }

    /// Save uploaded bytes under a collision-resistant name.
    ///
    /// The original name is sanitized and prefixed with a second-granularity
    /// timestamp; two uploads of `notes.pdf` in different seconds coexist.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilename` if nothing usable remains of the original
    /// name, or an I/O error if the write fails.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn stash(&self, original_name: &str, bytes: &[u8]) -> Result<StashedFile, StashError> {
        let safe = sanitize_filename(original_name);
        if safe.is_empty() {
            return Err(StashError::InvalidFilename(original_name.to_owned()));
        }

        let file_name = format!("{}{safe}", Utc::now().format("%Y%m%d_%H%M%S_"));
        tokio::fs::write(self.root.join(&file_name), bytes).await?;

        let url = format!("{}/{file_name}", self.public_base);
        tracing::debug!(%file_name, "stashed upload");
        Ok(StashedFile { file_name, url })
    }

    /// Remove a stashed blob by stored name.
    ///
    /// Returns `Ok(false)` when the file is already absent; a concurrent
    /// delete or a document whose blob never landed is not an error.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilename` for names that would resolve outside the
    /// upload root, or an I/O error for any other removal failure.
    #[instrument(skip(self))]
    pub async fn remove(&self, file_name: &str) -> Result<bool, StashError> {
        // Stored names are already sanitized; re-check so a tampered
        // document cannot point the removal outside the root.
        if sanitize_filename(file_name) != file_name {
            return Err(StashError::InvalidFilename(file_name.to_owned()));
        }

        match tokio::fs::remove_file(self.root.join(file_name)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// The upload root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Reduce an uploaded filename to a safe single path component.
///
/// Takes the final component of any path the browser sent, keeps ASCII
/// alphanumerics plus `.`, `-` and `_`, maps everything else to `_`, and
/// strips leading dots so the result can never be a dotfile or traverse
/// upward.
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    let last = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let cleaned: String = last
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.').to_owned();
    // A name of only separators and dots carries no information; callers
    // treat the empty string as invalid.
    if cleaned.chars().all(|c| c == '_' || c == '.') {
        String::new()
    } else {
        cleaned
    }
}
