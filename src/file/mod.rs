//! File intake and retrieval for fileshelf.
//!
//! This module provides:
//! - Upload validation against a size and content-type policy
//! - Physical byte storage with collision-free locators
//! - File record persistence scoped by owner
//! - The [`FileService`] that composes the three

mod metadata;
mod policy;
mod service;
mod storage;
mod upload;

pub use metadata::{FileRecord, FileRepository, FileSummary, MetadataStore, MetadataTx, NewFileRecord};
pub use policy::UploadPolicy;
pub use service::FileService;
pub use storage::{resolve_storage_root, FileStorage, StorageBackend};
pub use upload::UploadHandle;

/// Default maximum upload size in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10000;

/// Default comma-separated content-type allow-list.
pub const DEFAULT_ALLOWED_FILE_TYPES: &str = "pdf,images";
