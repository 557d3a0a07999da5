//! Local filesystem storage for uploaded media.
//!
//! A single flat directory holds every uploaded file; the filename is the
//! only identity. Uploads are written through [`UploadWriter`] in fixed-size
//! blocks so multi-gigabyte bodies never materialize in memory.

use crate::{StorageError, StorageResult};
use bytes::BytesMut;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    /// Final stored filename (possibly disambiguated)
    pub filename: String,
    /// Total bytes written
    pub size_bytes: u64,
}

/// Local filesystem storage rooted at a single flat directory.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    chunk_size: usize,
}

/// Strip the supplied name down to its final path component.
///
/// Both `/` and `\` are treated as separators so a Windows-style path sent by
/// a browser cannot smuggle directory components. Empty results, `.`/`..`,
/// and NUL bytes are rejected.
pub fn sanitize_filename(raw: &str) -> StorageResult<String> {
    let base = raw
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return Err(StorageError::InvalidFilename(
            "Missing or invalid filename".to_string(),
        ));
    }

    Ok(base)
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating the directory if needed.
    ///
    /// # Arguments
    /// * `base_path` - Flat directory for uploaded files (e.g., "./uploads")
    /// * `chunk_size` - Write granularity in bytes (reference: 4 MiB)
    pub async fn new(base_path: impl Into<PathBuf>, chunk_size: usize) -> StorageResult<Self> {
        let base_path = base_path.into();

        if chunk_size == 0 {
            return Err(StorageError::ConfigError(
                "chunk_size must be greater than 0".to_string(),
            ));
        }

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            chunk_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve the destination path for an upload, disambiguating collisions.
    ///
    /// If `name` is taken, probes `stem(1).ext`, `stem(2).ext`, ... from 1
    /// until an unused name is found. The probe and the later file creation
    /// are not atomic across requests; concurrent uploads racing past the
    /// existence check with identical names is an accepted limitation.
    async fn resolve_destination(&self, name: &str) -> (PathBuf, String) {
        let candidate = self.base_path.join(name);
        if !fs::try_exists(&candidate).await.unwrap_or(false) {
            return (candidate, name.to_string());
        }

        let (stem, ext) = match name.rfind('.') {
            // A leading dot is part of the stem, not an extension separator.
            Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
            _ => (name, ""),
        };

        let mut counter = 1u32;
        loop {
            let probe = format!("{}({}){}", stem, counter, ext);
            let path = self.base_path.join(&probe);
            if !fs::try_exists(&path).await.unwrap_or(false) {
                return (path, probe);
            }
            counter += 1;
        }
    }

    /// Open a streaming upload session for `raw_filename`.
    ///
    /// Sanitizes the name, resolves a collision-free destination, and creates
    /// the file. The returned writer must be driven to [`UploadWriter::finish`]
    /// or explicitly aborted; dropping it midway removes the partial file.
    pub async fn begin_upload(&self, raw_filename: &str) -> StorageResult<UploadWriter> {
        let name = sanitize_filename(raw_filename)?;
        let (path, resolved_name) = self.resolve_destination(&name).await;

        let file = fs::File::create(&path).await.map_err(|e| {
            StorageError::CreateFailed(format!("Failed to create {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            requested = %raw_filename,
            resolved = %resolved_name,
            "Upload session opened"
        );

        Ok(UploadWriter {
            file: Some(file),
            path,
            filename: resolved_name,
            buf: BytesMut::new(),
            chunk_size: self.chunk_size,
            written: 0,
        })
    }

    /// Sorted filenames of regular files in the storage directory.
    ///
    /// Dotfiles and subdirectories are excluded; the directory is flat by
    /// contract, anything else was put there by external housekeeping.
    pub async fn list_files(&self) -> StorageResult<Vec<String>> {
        let mut entries = fs::read_dir(&self.base_path)
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                if !name.starts_with('.') {
                    files.push(name);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Absolute path of a stored file, or None if it does not exist.
    ///
    /// The name is sanitized first so a traversal attempt can never resolve
    /// outside the storage directory.
    pub async fn path_for(&self, raw_filename: &str) -> StorageResult<Option<PathBuf>> {
        let name = sanitize_filename(raw_filename)?;
        let path = self.base_path.join(&name);
        if fs::try_exists(&path).await.unwrap_or(false) {
            Ok(Some(path))
        } else {
            Ok(None)
        }
    }
}

/// One in-flight upload: resolved destination, open handle, byte counter.
///
/// Incoming data is coalesced into `chunk_size` blocks; each block is flushed
/// before the next is accepted. On failure or drop the partial file is
/// removed (best effort) so no dangling partials survive a broken transfer.
pub struct UploadWriter {
    file: Option<tokio::fs::File>,
    path: PathBuf,
    filename: String,
    buf: BytesMut,
    chunk_size: usize,
    written: u64,
}

impl UploadWriter {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Append body bytes, writing out full blocks as they accumulate.
    pub async fn write_chunk(&mut self, data: &[u8]) -> StorageResult<()> {
        self.buf.extend_from_slice(data);

        while self.buf.len() >= self.chunk_size {
            let block = self.buf.split_to(self.chunk_size);
            self.write_block(&block).await?;
        }

        Ok(())
    }

    async fn write_block(&mut self, block: &[u8]) -> StorageResult<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| StorageError::WriteFailed("Upload already closed".to_string()))?;

        file.write_all(block).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        file.flush().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to flush {}: {}", self.path.display(), e))
        })?;

        self.written += block.len() as u64;
        Ok(())
    }

    /// Drain the remaining buffer, sync to disk, and return the final name
    /// and byte count. The file is fully durable when this returns.
    pub async fn finish(mut self) -> StorageResult<StoredUpload> {
        if !self.buf.is_empty() {
            let rest = self.buf.split();
            self.write_block(&rest).await?;
        }

        let file = self
            .file
            .take()
            .ok_or_else(|| StorageError::WriteFailed("Upload already closed".to_string()))?;

        if let Err(e) = file.sync_all().await {
            // The handle is already out of self, so Drop will not clean up.
            if let Err(rm) = fs::remove_file(&self.path).await {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %rm,
                    "Failed to remove partial upload"
                );
            }
            return Err(StorageError::WriteFailed(format!(
                "Failed to sync {}: {}",
                self.path.display(),
                e
            )));
        }

        tracing::info!(
            filename = %self.filename,
            size_bytes = self.written,
            "Upload stored"
        );

        Ok(StoredUpload {
            filename: std::mem::take(&mut self.filename),
            size_bytes: self.written,
        })
    }

    /// Remove the partial file after a failed transfer.
    ///
    /// Removal failure is logged and swallowed so it never masks the error
    /// that aborted the upload.
    pub async fn abort(mut self) {
        self.file.take();
        if let Err(e) = fs::remove_file(&self.path).await {
            tracing::debug!(
                path = %self.path.display(),
                error = %e,
                "Failed to remove partial upload"
            );
        } else {
            tracing::debug!(path = %self.path.display(), "Partial upload removed");
        }
    }
}

impl Drop for UploadWriter {
    fn drop(&mut self) {
        // Dropped without finish(): the transfer broke somewhere above us.
        if self.file.take().is_some() {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
