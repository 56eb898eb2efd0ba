//! Request-scoped scratch files handed to the external classifier.
//!
//! Every upload is written to `<scratch_dir>/<uuid>-<sanitized name>`, so concurrent requests that
//! upload files with the same name never share a path. The file is removed by
//! [`ScratchFile::release`] on the normal path and by `Drop` if the owning future is cancelled or
//! panics before releasing it. Removal failures are logged and never returned.

use std::io;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const MAX_NAME_LEN: usize = 100;

#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
    released: bool,
}

impl ScratchFile {
    /// Write `contents` to a fresh file in `dir`, creating the directory if needed.
    pub async fn create(dir: &Path, original_filename: &str, contents: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(scratch_name(Uuid::new_v4(), original_filename));
        let mut file = tokio::fs::OpenOptions::new().write(true).create_new(true).open(&path).await?;

        // From here on the guard owns the path, so a failed write still removes the partial file
        let scratch = Self { path, released: false };
        file.write_all(contents).await?;
        file.flush().await?;

        debug!(path = %scratch.path.display(), bytes = contents.len(), "Wrote scratch file");
        Ok(scratch)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file. Failures are logged, never propagated.
    pub async fn release(mut self) {
        self.released = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => debug!(path = %self.path.display(), "Removed scratch file"),
            Err(e) => log_removal_failure(&self.path, &e),
        }
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            log_removal_failure(&self.path, &e);
        }
    }
}

fn log_removal_failure(path: &Path, error: &io::Error) {
    if error.kind() == io::ErrorKind::NotFound {
        debug!(path = %path.display(), "Scratch file already gone");
    } else {
        warn!(path = %path.display(), error = %error, "Failed to remove scratch file");
    }
}

/// Build a scratch file name that keeps the original extension but cannot escape the scratch
/// directory or collide with another request.
pub fn scratch_name(request_id: Uuid, original_filename: &str) -> String {
    format!("{}-{}", request_id.simple(), sanitize_filename(original_filename))
}

/// Reduce an uploaded file name to its final path component using `[A-Za-z0-9._-]` only.
pub fn sanitize_filename(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        return "upload".to_string();
    }

    // Keep the tail so the extension survives truncation
    let skip = cleaned.len().saturating_sub(MAX_NAME_LEN);
    cleaned[skip..].to_string()
}
