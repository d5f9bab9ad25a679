//! fileshelf - owner-scoped file upload and retrieval
//!
//! Authenticated principals upload files subject to a size and content-type
//! policy, list the files they own, and read back the bytes of any one of them.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use config::Config;
pub use db::Database;
pub use error::{Result, ShelfError};
pub use file::{
    FileRecord, FileRepository, FileService, FileStorage, FileSummary, MetadataStore,
    StorageBackend, UploadHandle, UploadPolicy,
};
