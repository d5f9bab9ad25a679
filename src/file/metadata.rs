//! File record types and the owner-scoped metadata repository.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{Sqlite, Transaction};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::{Result, ShelfError};

/// A persisted file record.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID, assigned on insert.
    pub id: i64,
    /// Declared file name.
    pub file_name: String,
    /// Declared MIME type.
    pub content_type: String,
    /// Storage backend locator.
    pub locator: String,
    /// Owning principal.
    pub owner_id: i64,
}

/// Data for inserting a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    pub file_name: String,
    pub content_type: String,
    pub locator: String,
    pub owner_id: i64,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        locator: impl Into<String>,
        owner_id: i64,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            locator: locator.into(),
            owner_id,
        }
    }
}

/// The externally visible projection of a file record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: i64,
    pub file_name: String,
    pub content_type: String,
}

impl From<&FileRecord> for FileSummary {
    fn from(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            file_name: record.file_name.clone(),
            content_type: record.content_type.clone(),
        }
    }
}

impl From<FileRecord> for FileSummary {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            file_name: record.file_name,
            content_type: record.content_type,
        }
    }
}

/// Owner-scoped persistence for file records.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// List every record owned by `owner_id`. Order is implementation-defined.
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>>;

    /// Look up a record by id, visible only to its owner.
    async fn get_by_id_and_owner(&self, file_id: i64, owner_id: i64)
        -> Result<Option<FileRecord>>;

    /// Start a unit of work for inserts.
    async fn begin(&self) -> Result<Box<dyn MetadataTx>>;
}

/// A metadata unit of work. Inserts become visible only after [`commit`].
///
/// Dropping the unit of work without committing discards its inserts.
///
/// [`commit`]: MetadataTx::commit
#[async_trait]
pub trait MetadataTx: Send {
    /// Stage a new record and return it with its assigned id.
    async fn insert(&mut self, record: &NewFileRecord) -> Result<FileRecord>;

    /// Make staged inserts durable.
    async fn commit(self: Box<Self>) -> Result<()>;
}

/// SQLite-backed metadata repository.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: DbPool,
}

impl FileRepository {
    /// Create a new FileRepository over a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Count all records regardless of owner.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM files")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShelfError::Database(e.to_string()))?;

        Ok(count)
    }
}

#[async_trait]
impl MetadataStore for FileRepository {
    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<FileRecord>> {
        let records = sqlx::query_as::<_, FileRecord>(
            "SELECT id, file_name, content_type, locator, owner_id
             FROM files WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ShelfError::Database(e.to_string()))?;

        Ok(records)
    }

    async fn get_by_id_and_owner(
        &self,
        file_id: i64,
        owner_id: i64,
    ) -> Result<Option<FileRecord>> {
        let record = sqlx::query_as::<_, FileRecord>(
            "SELECT id, file_name, content_type, locator, owner_id
             FROM files WHERE id = ? AND owner_id = ?",
        )
        .bind(file_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ShelfError::Database(e.to_string()))?;

        Ok(record)
    }

    async fn begin(&self) -> Result<Box<dyn MetadataTx>> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ShelfError::Database(e.to_string()))?;

        Ok(Box::new(SqliteFileTx { tx }))
    }
}

/// Unit of work backed by a SQLite transaction.
struct SqliteFileTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl MetadataTx for SqliteFileTx {
    async fn insert(&mut self, record: &NewFileRecord) -> Result<FileRecord> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO files (file_name, content_type, locator, owner_id)
             VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(&record.file_name)
        .bind(&record.content_type)
        .bind(&record.locator)
        .bind(record.owner_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| ShelfError::Database(e.to_string()))?;

        Ok(FileRecord {
            id,
            file_name: record.file_name.clone(),
            content_type: record.content_type.clone(),
            locator: record.locator.clone(),
            owner_id: record.owner_id,
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| ShelfError::Database(e.to_string()))
    }
}
