//! Physical byte storage for uploads.
//!
//! Files are stored flat under a single root directory:
//! ```text
//! {base_path}/
//! ├── report.pdf_0b5c1a9e-6f3e-4b8e-9d8d-1d2f3a4b5c6d
//! ├── photo.png_9c1e7a2b-0d4f-4e6a-8b1c-2e3f4a5b6c7d
//! └── ...
//! ```
//! The locator returned by a write is the entry name relative to the root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::app_data_dir;
use crate::{Result, ShelfError};

/// Storage directory name used when no root is configured.
const DEFAULT_STORAGE_DIR: &str = "Storage";

/// Suffix for in-flight writes.
const PARTIAL_SUFFIX: &str = ".part";

/// A backend that persists upload bytes and hands back a locator.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Stream `source` into storage under a fresh, unique locator.
    ///
    /// Fails with [`ShelfError::StorageWrite`] if the bytes cannot be fully
    /// persisted or if fewer/more than `expected_len` bytes arrive.
    async fn write(
        &self,
        name: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
        expected_len: u64,
    ) -> Result<String>;

    /// Read back the full byte content for a locator.
    async fn read(&self, locator: &str) -> Result<Vec<u8>>;
}

/// Resolve the storage root: the configured path, or `Storage` under the
/// per-user application data directory.
pub fn resolve_storage_root(configured: Option<&str>) -> PathBuf {
    match configured {
        Some(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => app_data_dir().join(DEFAULT_STORAGE_DIR),
    }
}

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct FileStorage {
    /// Root directory for stored bytes.
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new FileStorage with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Check if a locator refers to stored bytes.
    pub fn exists(&self, locator: &str) -> bool {
        !locator.trim().is_empty() && self.base_path.join(locator).is_file()
    }

    /// Build a new locator from a declared file name.
    fn new_locator(name: &str) -> String {
        format!("{name}_{}", Uuid::new_v4())
    }

    async fn copy_into(
        &self,
        partial: &Path,
        source: &mut (dyn AsyncRead + Send + Unpin),
        expected_len: u64,
    ) -> io::Result<()> {
        let mut file = tokio::fs::File::create(partial).await?;
        let written = tokio::io::copy(source, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;

        if written != expected_len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {expected_len} bytes, received {written}"),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileStorage {
    async fn write(
        &self,
        name: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
        expected_len: u64,
    ) -> Result<String> {
        // The name is not sanitised: separators such as `../` escape base_path.
        let locator = Self::new_locator(name);
        let final_path = self.base_path.join(&locator);
        let partial = self.base_path.join(format!("{locator}{PARTIAL_SUFFIX}"));

        if let Err(e) = self.copy_into(&partial, source, expected_len).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(error = %cleanup, "Failed to remove partial upload");
                }
            }
            return Err(ShelfError::StorageWrite(format!("{locator}: {e}")));
        }

        tokio::fs::rename(&partial, &final_path)
            .await
            .map_err(|e| ShelfError::StorageWrite(format!("{locator}: {e}")))?;

        debug!(locator = %locator, bytes = expected_len, "Stored upload");
        Ok(locator)
    }

    async fn read(&self, locator: &str) -> Result<Vec<u8>> {
        if locator.trim().is_empty() {
            return Err(ShelfError::StorageRead("empty locator".to_string()));
        }

        let path = self.base_path.join(locator);
        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(ShelfError::StorageRead(
                format!("no stored bytes for {locator}"),
            )),
            Err(e) => Err(ShelfError::StorageRead(format!("{locator}: {e}"))),
        }
    }
}
