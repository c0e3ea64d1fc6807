//! Ports for backup storage and whole-dataset snapshots.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Backup, BackupId, BackupSnapshot};

use super::{Listing, RepositoryError};

/// Port for stored backups: metadata plus snapshot bytes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupRepository: Send + Sync {
    /// Return one page of backup metadata, newest first.
    async fn list(&self, page: &PageRequest) -> Result<Listing<Backup>, RepositoryError>;

    /// Fetch backup metadata.
    async fn find(&self, id: &BackupId) -> Result<Option<Backup>, RepositoryError>;

    /// Fetch the stored snapshot bytes.
    async fn payload(&self, id: &BackupId) -> Result<Option<Vec<u8>>, RepositoryError>;

    /// Store a new backup.
    async fn insert(&self, backup: &Backup, payload: &[u8]) -> Result<(), RepositoryError>;

    /// Remove a backup. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &BackupId) -> Result<bool, RepositoryError>;
}

/// Port for capturing and replacing every record table at once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordSnapshotStore: Send + Sync {
    /// Capture every record table.
    async fn export(&self) -> Result<BackupSnapshot, RepositoryError>;

    /// Replace every record table with the snapshot contents, atomically
    /// where the adapter supports it.
    async fn restore(&self, snapshot: &BackupSnapshot) -> Result<(), RepositoryError>;
}
