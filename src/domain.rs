use crate::errors::{RepoError, StorageError};
use crate::models::{MemeRecord, NewMeme};
use async_trait::async_trait;

/// Trait defining operations for storing and retrieving meme records.
///
/// Every operation maps to a single auto-committed statement.
#[async_trait]
pub trait MemeRepository: Send + Sync + 'static {
    /// Inserts a record, returning it with its newly assigned id.
    async fn insert(&self, new_meme: &NewMeme) -> Result<MemeRecord, RepoError>;

    /// Lists all records in insertion order.
    async fn list_all(&self) -> Result<Vec<MemeRecord>, RepoError>;

    /// Returns `RepoError::NotFound` if no record has this id.
    async fn get_by_id(&self, id: i64) -> Result<MemeRecord, RepoError>;

    /// Returns `RepoError::NotFound`, leaving the table untouched, if no record has this id.
    async fn delete_by_id(&self, id: i64) -> Result<(), RepoError>;
}

/// Trait defining operations for the scratch file area rendered images live in.
#[async_trait]
pub trait FileStorage: Send + Sync + 'static {
    /// Creates or overwrites `filename`.
    async fn write(&self, filename: &str, data: Vec<u8>) -> Result<(), StorageError>;

    async fn read(&self, filename: &str) -> Result<Vec<u8>, StorageError>;
}
