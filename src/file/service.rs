//! File service composing upload policy, byte storage and metadata.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::FilesConfig;
use crate::{Result, ShelfError};

use super::metadata::{FileRecord, FileSummary, MetadataStore, NewFileRecord};
use super::policy::UploadPolicy;
use super::storage::StorageBackend;
use super::upload::UploadHandle;

/// Owner-scoped file operations.
///
/// The service holds no per-request state and is shared behind an `Arc`.
#[derive(Clone)]
pub struct FileService {
    storage: Arc<dyn StorageBackend>,
    metadata: Arc<dyn MetadataStore>,
    policy: UploadPolicy,
}

impl FileService {
    /// Create a new FileService from its collaborators.
    pub fn new(
        storage: Arc<dyn StorageBackend>,
        metadata: Arc<dyn MetadataStore>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            storage,
            metadata,
            policy,
        }
    }

    /// Create a new FileService, building the policy from configuration.
    ///
    /// Fails with [`ShelfError::Configuration`] if the allow-list is blank
    /// or the maximum size is zero.
    pub fn from_config(
        storage: Arc<dyn StorageBackend>,
        metadata: Arc<dyn MetadataStore>,
        config: &FilesConfig,
    ) -> Result<Self> {
        let policy = UploadPolicy::from_config(config)?;
        Ok(Self::new(storage, metadata, policy))
    }

    /// The active upload policy.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// List the files owned by `owner_id`.
    pub async fn list_files(&self, owner_id: i64) -> Result<Vec<FileSummary>> {
        check_owner(owner_id)?;

        let records = self.metadata.list_by_owner(owner_id).await?;
        debug!(owner_id, count = records.len(), "Listed files");

        Ok(records.into_iter().map(FileSummary::from).collect())
    }

    /// Read the bytes of a file owned by `owner_id`.
    ///
    /// A file owned by someone else is indistinguishable from a missing one.
    pub async fn read_file(&self, file_id: i64, owner_id: i64) -> Result<Vec<u8>> {
        check_owner(owner_id)?;

        let record = self
            .metadata
            .get_by_id_and_owner(file_id, owner_id)
            .await?
            .ok_or(ShelfError::FileNotFound)?;

        debug!(owner_id, file_id, locator = %record.locator, "Reading file");
        self.storage.read(&record.locator).await
    }

    /// Validate, store and register an upload for `owner_id`.
    ///
    /// Nothing is written when validation fails. If the metadata commit fails
    /// after the bytes are stored, the bytes stay in storage unreferenced.
    pub async fn upload_file(
        &self,
        owner_id: i64,
        upload: Option<UploadHandle>,
    ) -> Result<FileSummary> {
        check_owner(owner_id)?;
        let mut upload = upload
            .ok_or_else(|| ShelfError::InvalidInput("no file was provided".to_string()))?;

        self.policy.validate(&upload)?;

        let length = upload.length;
        let name = upload.file_name.clone();
        let locator = self
            .storage
            .write(&name, upload.source_mut(), length)
            .await?;
        debug!(owner_id, locator = %locator, bytes = length, "Upload stored");

        let new_record = NewFileRecord::new(
            upload.file_name,
            upload.content_type,
            locator.clone(),
            owner_id,
        );

        let record = match self.register(&new_record).await {
            Ok(record) => record,
            Err(e) => {
                warn!(owner_id, error = %e, "Metadata commit failed; stored bytes are orphaned");
                return Err(e);
            }
        };

        info!(owner_id, file_id = record.id, bytes = length, "File uploaded");
        Ok(FileSummary::from(record))
    }

    async fn register(&self, record: &NewFileRecord) -> Result<FileRecord> {
        let mut tx = self.metadata.begin().await?;
        let inserted = tx.insert(record).await?;
        tx.commit().await?;
        Ok(inserted)
    }
}

impl std::fmt::Debug for FileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileService")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn check_owner(owner_id: i64) -> Result<()> {
    if owner_id <= 0 {
        return Err(ShelfError::InvalidInput(format!(
            "owner id must be positive, got {owner_id}"
        )));
    }
    Ok(())
}
