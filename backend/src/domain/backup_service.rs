//! Backup domain service.
//!
//! Admins snapshot every record table into a checksummed JSON payload,
//! download it, and restore it later. Restores verify the checksum before
//! replacing anything.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::{info, warn};

use super::ports::{
    BackupCommand, BackupDownload, BackupQuery, BackupRepository, RecordSnapshotStore,
    RestoreOutcome, map_repository_error,
};
use super::service_support::found;
use super::{
    Backup, BackupId, BackupSnapshot, Error, Principal, SNAPSHOT_FORMAT_VERSION, SnapshotError,
    checksum,
};

const ENTITY: &str = "Backup";

/// Backup service implementing the backup driving ports.
#[derive(Clone)]
pub struct BackupService<B, S> {
    backups: Arc<B>,
    records: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<B, S> BackupService<B, S> {
    /// Create a new service.
    pub fn new(backups: Arc<B>, records: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            backups,
            records,
            clock,
        }
    }
}

fn require_admin(principal: &Principal) -> Result<(), Error> {
    if principal.is_admin() {
        Ok(())
    } else {
        Err(Error::forbidden("Only admins can manage backups"))
    }
}

fn map_snapshot_error(err: SnapshotError) -> Error {
    match err {
        SnapshotError::Malformed { .. } | SnapshotError::ChecksumMismatch { .. } => {
            warn!(error = %err, "backup failed verification");
            Error::conflict("Backup failed integrity verification").with_details([err.to_string()])
        }
        SnapshotError::UnsupportedVersion { .. } => Error::conflict(err.to_string()),
    }
}

impl<B, S> BackupService<B, S>
where
    B: BackupRepository,
    S: RecordSnapshotStore,
{
    async fn load(&self, id: &BackupId) -> Result<(Backup, Vec<u8>), Error> {
        let backup = found(
            self.backups.find(id).await.map_err(map_repository_error)?,
            ENTITY,
        )?;
        let payload = self
            .backups
            .payload(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found("Backup payload not found"))?;
        Ok((backup, payload))
    }
}

#[async_trait]
impl<B, S> BackupQuery for BackupService<B, S>
where
    B: BackupRepository,
    S: RecordSnapshotStore,
{
    async fn list(&self, principal: &Principal, page: PageRequest) -> Result<Page<Backup>, Error> {
        require_admin(principal)?;
        let listing = self
            .backups
            .list(&page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn download(
        &self,
        principal: &Principal,
        id: &BackupId,
    ) -> Result<BackupDownload, Error> {
        require_admin(principal)?;
        let (backup, body) = self.load(id).await?;
        Ok(BackupDownload {
            filename: format!("backup-{}.json", backup.created_at.format("%Y%m%dT%H%M%SZ")),
            body,
        })
    }
}

#[async_trait]
impl<B, S> BackupCommand for BackupService<B, S>
where
    B: BackupRepository,
    S: RecordSnapshotStore,
{
    async fn create(&self, principal: &Principal, label: Option<String>) -> Result<Backup, Error> {
        require_admin(principal)?;
        let mut snapshot = self.records.export().await.map_err(map_repository_error)?;
        snapshot.format_version = SNAPSHOT_FORMAT_VERSION;
        let payload = snapshot
            .encode()
            .map_err(|err| Error::internal(err.to_string()))?;
        let now = self.clock.utc();
        let backup = Backup {
            id: BackupId::random(),
            label: label
                .map(|label| label.trim().to_owned())
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| format!("Backup {}", now.format("%Y-%m-%d %H:%M"))),
            created_by: principal.user_id,
            created_at: now,
            size_bytes: payload.len() as u64,
            checksum: checksum(&payload),
            record_count: snapshot.record_count(),
        };
        self.backups
            .insert(&backup, &payload)
            .await
            .map_err(map_repository_error)?;
        info!(
            backup_id = %backup.id,
            records = backup.record_count,
            bytes = backup.size_bytes,
            "backup created"
        );
        Ok(backup)
    }

    async fn restore(
        &self,
        principal: &Principal,
        id: &BackupId,
    ) -> Result<RestoreOutcome, Error> {
        require_admin(principal)?;
        let (backup, payload) = self.load(id).await?;
        let snapshot =
            BackupSnapshot::decode_verified(&payload, &backup.checksum).map_err(map_snapshot_error)?;
        self.records
            .restore(&snapshot)
            .await
            .map_err(map_repository_error)?;
        let restored_records = snapshot.record_count();
        info!(backup_id = %backup.id, restored_records, "backup restored");
        Ok(RestoreOutcome {
            backup,
            restored_records,
        })
    }

    async fn delete(&self, principal: &Principal, id: &BackupId) -> Result<(), Error> {
        require_admin(principal)?;
        if !self
            .backups
            .delete(id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Backup not found"));
        }
        info!(backup_id = %id, "backup deleted");
        Ok(())
    }
}
