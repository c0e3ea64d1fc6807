//! In-memory backup storage.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{BackupRepository, Listing, RepositoryError};
use crate::domain::{Backup, BackupId};

use super::table::{Row, Table};

#[derive(Clone)]
struct StoredBackup {
    backup: Backup,
    payload: Vec<u8>,
}

impl Row for StoredBackup {
    type Key = BackupId;

    fn key(&self) -> BackupId {
        self.backup.id
    }
}

/// Backup metadata and snapshot bytes held in process memory.
#[derive(Default)]
pub struct MemoryBackupRepository {
    backups: Table<StoredBackup>,
}

impl MemoryBackupRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BackupRepository for MemoryBackupRepository {
    async fn list(&self, page: &PageRequest) -> Result<Listing<Backup>, RepositoryError> {
        let listing = self
            .backups
            .page(
                |_| true,
                |left, right| {
                    right
                        .backup
                        .created_at
                        .cmp(&left.backup.created_at)
                        .then_with(|| left.backup.id.cmp(&right.backup.id))
                },
                page,
            )
            .await;
        Ok(Listing::new(
            listing.items.into_iter().map(|row| row.backup).collect(),
            listing.total,
        ))
    }

    async fn find(&self, id: &BackupId) -> Result<Option<Backup>, RepositoryError> {
        Ok(self.backups.find(id).await.map(|row| row.backup))
    }

    async fn payload(&self, id: &BackupId) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(self.backups.find(id).await.map(|row| row.payload))
    }

    async fn insert(&self, backup: &Backup, payload: &[u8]) -> Result<(), RepositoryError> {
        self.backups
            .insert(&StoredBackup {
                backup: backup.clone(),
                payload: payload.to_vec(),
            })
            .await
    }

    async fn delete(&self, id: &BackupId) -> Result<bool, RepositoryError> {
        Ok(self.backups.remove(id).await)
    }
}
