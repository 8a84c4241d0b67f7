//! Photo uploads.
//!
//! Photos are buffered in memory while the form is read, validated as a
//! whole, and only then written to a per-request temporary directory. The
//! directory is removed when the [`UploadBatch`] is dropped, whatever the
//! outcome of the request.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::UploadLimits;
use crate::error::PublishError;

/// A photo received in the form, not yet on disk.
#[derive(Debug, Clone)]
pub struct PendingFile {
    pub file_name: String,
    /// Full size as sent by the client.
    pub size: usize,
    bytes: Vec<u8>,
}

impl PendingFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            size: 0,
            bytes: Vec::new(),
        }
    }

    /// Record a chunk. Content past `limit` bytes is counted, not kept.
    pub fn push(&mut self, chunk: &[u8], limit: usize) {
        self.size = self.size.saturating_add(chunk.len());
        if self.size <= limit {
            self.bytes.extend_from_slice(chunk);
        }
    }

    fn extension(&self) -> String {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }
}

/// Check count, then size, then extension.
pub fn validate(files: &[PendingFile], limits: &UploadLimits) -> Result<(), PublishError> {
    if files.len() > limits.max_files {
        return Err(PublishError::BadRequest(format!(
            "at most {} files are allowed",
            limits.max_files
        )));
    }
    for file in files {
        if file.size > limits.max_file_size {
            return Err(PublishError::BadRequest(format!(
                "file {} exceeds {} MB",
                file.file_name,
                limits.max_file_size / (1024 * 1024)
            )));
        }
        if !limits.allows(&file.file_name) {
            return Err(PublishError::BadRequest(format!(
                "unsupported file type: {}",
                file.file_name
            )));
        }
    }
    Ok(())
}

/// Photos of one request, written to disk.
#[derive(Debug, Default)]
pub struct UploadBatch {
    dir: Option<TempDir>,
    paths: Vec<PathBuf>,
}

impl UploadBatch {
    /// Write `files` into a fresh directory below `upload_dir`.
    ///
    /// Files are stored as `photo<N>.<ext>`; client-supplied names never
    /// reach the filesystem.
    pub async fn persist(files: Vec<PendingFile>, upload_dir: &Path) -> std::io::Result<Self> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let dir = tempfile::Builder::new()
            .prefix("telepost-")
            .tempdir_in(upload_dir)?;
        let root = dir.path().to_path_buf();
        // Any early return drops the batch and with it the directory.
        let mut batch = Self {
            dir: Some(dir),
            paths: Vec::with_capacity(files.len()),
        };
        for (index, file) in files.into_iter().enumerate() {
            let path = root.join(format!("photo{index}.{}", file.extension()));
            tokio::fs::write(&path, &file.bytes).await?;
            batch.paths.push(path);
        }
        debug!(dir = %root.display(), files = batch.paths.len(), "stored uploads");
        Ok(batch)
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl Drop for UploadBatch {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = dir.path().to_path_buf();
        match dir.close() {
            Ok(()) => debug!(dir = %path.display(), "removed uploads"),
            Err(err) => warn!(dir = %path.display(), error = %err, "failed to remove uploads"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, size: usize) -> PendingFile {
        let mut file = PendingFile::new(name);
        file.push(&vec![0u8; size], usize::MAX);
        file
    }

    fn message(result: Result<(), PublishError>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_push_stops_keeping_bytes_past_limit() {
        let mut file = PendingFile::new("a.png");
        file.push(&[1; 8], 10);
        file.push(&[2; 8], 10);
        assert_eq!(file.size, 16);
        assert_eq!(file.bytes.len(), 8);
    }

    #[test]
    fn test_validate_count_first() {
        let limits = UploadLimits::default();
        let files: Vec<_> = (0..5).map(|i| file(&format!("{i}.exe"), 1)).collect();
        assert_eq!(message(validate(&files, &limits)), "at most 4 files are allowed");
    }

    #[test]
    fn test_validate_size_and_extension() {
        let limits = UploadLimits {
            max_file_size: 1024 * 1024,
            ..UploadLimits::default()
        };
        assert_eq!(
            message(validate(&[file("big.png", 1024 * 1024 + 1)], &limits)),
            "file big.png exceeds 1 MB"
        );
        assert_eq!(
            message(validate(&[file("notes.txt", 3)], &limits)),
            "unsupported file type: notes.txt"
        );
        assert!(validate(&[file("a.PNG", 3), file("b.jpeg", 3)], &limits).is_ok());
        assert!(validate(&[], &limits).is_ok());
    }

    #[tokio::test]
    async fn test_persist_and_cleanup() {
        let root = tempfile::tempdir().unwrap();
        let batch = UploadBatch::persist(vec![file("../../evil.PNG", 4), file("b.gif", 2)], root.path())
            .await
            .unwrap();

        let paths = batch.paths().to_vec();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("photo0.png"));
        assert!(paths[1].ends_with("photo1.gif"));
        assert!(paths.iter().all(|p| p.starts_with(root.path()) && p.exists()));
        assert_eq!(std::fs::read(&paths[0]).unwrap().len(), 4);

        drop(batch);
        assert!(paths.iter().all(|p| !p.exists()));
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_no_files_no_directory() {
        let root = tempfile::tempdir().unwrap();
        let batch = UploadBatch::persist(Vec::new(), root.path()).await.unwrap();
        assert!(batch.paths().is_empty());
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }
}
