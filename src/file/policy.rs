//! Upload size and content-type policy.

use crate::config::FilesConfig;
use crate::{Result, ShelfError};

use super::upload::UploadHandle;

/// Size and content-type rules an upload must satisfy before any side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    max_size_bytes: u64,
    allowed_types: Vec<String>,
}

impl UploadPolicy {
    /// Build a policy from a maximum size and a comma-separated allow-list.
    ///
    /// Entries are trimmed and empty entries dropped. Fails with
    /// [`ShelfError::Configuration`] if the maximum is zero or no entry remains.
    pub fn new(max_size_bytes: u64, allowed_types: &str) -> Result<Self> {
        if max_size_bytes == 0 {
            return Err(ShelfError::Configuration(
                "max_file_size must be a positive number of bytes".to_string(),
            ));
        }

        let allowed_types: Vec<String> = allowed_types
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect();

        if allowed_types.is_empty() {
            return Err(ShelfError::Configuration(
                "allowed_file_types is empty; provide comma-separated values".to_string(),
            ));
        }

        Ok(Self {
            max_size_bytes,
            allowed_types,
        })
    }

    /// Build a policy from the `[files]` configuration section.
    pub fn from_config(config: &FilesConfig) -> Result<Self> {
        Self::new(config.max_file_size, &config.allowed_file_types)
    }

    /// Maximum accepted upload size in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_bytes
    }

    /// Accepted content-type substrings.
    pub fn allowed_types(&self) -> &[String] {
        &self.allowed_types
    }

    /// Check an upload against the policy.
    ///
    /// Matching is a case-sensitive substring test on the declared content
    /// type, so `"image"` accepts `"image/png"` and `"pdf"` accepts
    /// `"application/pdf"`.
    pub fn validate(&self, upload: &UploadHandle) -> Result<()> {
        if upload.file_name.trim().is_empty() {
            return Err(ShelfError::InvalidInput(
                "file name must not be blank".to_string(),
            ));
        }

        if upload.length == 0 || upload.length > self.max_size_bytes {
            return Err(ShelfError::SizeOutOfRange {
                size: upload.length,
                max: self.max_size_bytes,
            });
        }

        if !self
            .allowed_types
            .iter()
            .any(|t| upload.content_type.contains(t.as_str()))
        {
            return Err(ShelfError::UnsupportedType(upload.content_type.clone()));
        }

        Ok(())
    }
}
