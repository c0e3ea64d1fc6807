//! Driving ports for backup administration.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Backup, BackupId, Error, Principal};

/// Payload of a backup download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupDownload {
    /// Suggested attachment filename.
    pub filename: String,
    /// Snapshot bytes as stored.
    pub body: Vec<u8>,
}

/// Summary returned after a successful restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// The backup that was restored.
    pub backup: Backup,
    /// Number of records written back.
    pub restored_records: u64,
}

/// Read-side backup operations. Admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupQuery: Send + Sync {
    /// List backup metadata, newest first.
    async fn list(&self, principal: &Principal, page: PageRequest) -> Result<Page<Backup>, Error>;

    /// Fetch the stored snapshot for download.
    async fn download(&self, principal: &Principal, id: &BackupId)
    -> Result<BackupDownload, Error>;
}

/// Write-side backup operations. Admin only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackupCommand: Send + Sync {
    /// Snapshot every record collection.
    async fn create(&self, principal: &Principal, label: Option<String>) -> Result<Backup, Error>;

    /// Replace current records with the snapshot after verifying its
    /// checksum.
    async fn restore(&self, principal: &Principal, id: &BackupId)
    -> Result<RestoreOutcome, Error>;

    /// Delete a stored backup.
    async fn delete(&self, principal: &Principal, id: &BackupId) -> Result<(), Error>;
}
