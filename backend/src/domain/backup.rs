//! Data backups.
//!
//! A backup is a JSON snapshot of every hostel record table (users, hostels
//! and preferences are owned elsewhere and excluded). The snapshot bytes are
//! stored next to metadata carrying their SHA-256 checksum, which is verified
//! before any restore.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{
    BackupId, Complaint, Event, LeaveRequest, MessAttendance, MessFeedback, MessMenu, Notification,
    UserId,
};

/// Snapshot layout version written by this build.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Backup metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    /// Identifier.
    pub id: BackupId,
    /// Human-readable label.
    pub label: String,
    /// Admin who took the backup.
    pub created_by: UserId,
    /// When it was taken.
    pub created_at: DateTime<Utc>,
    /// Snapshot size in bytes.
    pub size_bytes: u64,
    /// SHA-256 hex digest of the snapshot bytes.
    pub checksum: String,
    /// Number of records captured.
    pub record_count: u64,
}

/// Every record table at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    /// Layout version.
    pub format_version: u32,
    /// Events.
    pub events: Vec<Event>,
    /// Complaints.
    pub complaints: Vec<Complaint>,
    /// Leave requests.
    pub leave_requests: Vec<LeaveRequest>,
    /// Notifications.
    pub notifications: Vec<Notification>,
    /// Mess menus.
    pub mess_menus: Vec<MessMenu>,
    /// Mess attendance marks.
    pub mess_attendance: Vec<MessAttendance>,
    /// Mess feedback.
    pub mess_feedback: Vec<MessFeedback>,
}

/// Failures while encoding, decoding or verifying a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnapshotError {
    /// The snapshot could not be serialised or parsed.
    #[error("backup snapshot is malformed: {message}")]
    Malformed {
        /// Parser message.
        message: String,
    },
    /// The stored bytes do not match the recorded checksum.
    #[error("backup checksum mismatch: expected {expected}, computed {actual}")]
    ChecksumMismatch {
        /// Checksum in the metadata.
        expected: String,
        /// Checksum of the stored bytes.
        actual: String,
    },
    /// The snapshot was written by an unknown layout version.
    #[error("unsupported backup format version {version}")]
    UnsupportedVersion {
        /// Version found in the payload.
        version: u32,
    },
}

impl BackupSnapshot {
    /// Total number of captured records.
    pub fn record_count(&self) -> u64 {
        [
            self.events.len(),
            self.complaints.len(),
            self.leave_requests.len(),
            self.notifications.len(),
            self.mess_menus.len(),
            self.mess_attendance.len(),
            self.mess_feedback.len(),
        ]
        .into_iter()
        .map(|len| len as u64)
        .sum()
    }

    /// Serialise to the stored byte form.
    pub fn encode(&self) -> Result<Vec<u8>, SnapshotError> {
        serde_json::to_vec_pretty(self).map_err(|err| SnapshotError::Malformed {
            message: err.to_string(),
        })
    }

    /// Verify `bytes` against `expected_checksum` and parse them.
    pub fn decode_verified(bytes: &[u8], expected_checksum: &str) -> Result<Self, SnapshotError> {
        let actual = checksum(bytes);
        if !actual.eq_ignore_ascii_case(expected_checksum) {
            return Err(SnapshotError::ChecksumMismatch {
                expected: expected_checksum.to_owned(),
                actual,
            });
        }
        let snapshot: Self = serde_json::from_slice(bytes).map_err(|err| SnapshotError::Malformed {
            message: err.to_string(),
        })?;
        if snapshot.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                version: snapshot.format_version,
            });
        }
        Ok(snapshot)
    }
}

/// SHA-256 hex digest of `bytes`.
///
/// # Examples
/// ```
/// use hostel_backend::domain::checksum;
///
/// assert_eq!(
///     checksum(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn empty_snapshot() -> BackupSnapshot {
        BackupSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            ..BackupSnapshot::default()
        }
    }

    #[rstest]
    fn verified_decode_accepts_matching_checksum() {
        let bytes = empty_snapshot().encode().expect("encode");
        let decoded = BackupSnapshot::decode_verified(&bytes, &checksum(&bytes)).expect("decode");
        assert_eq!(decoded, empty_snapshot());
        assert_eq!(decoded.record_count(), 0);
    }

    #[rstest]
    fn tampered_bytes_are_rejected() {
        let bytes = empty_snapshot().encode().expect("encode");
        let expected = checksum(&bytes);
        let mut tampered = bytes;
        tampered.push(b' ');
        let err = BackupSnapshot::decode_verified(&tampered, &expected).expect_err("tampered");
        assert!(matches!(err, SnapshotError::ChecksumMismatch { .. }));
    }

    #[rstest]
    fn unknown_versions_are_rejected() {
        let snapshot = BackupSnapshot {
            format_version: 99,
            ..BackupSnapshot::default()
        };
        let bytes = snapshot.encode().expect("encode");
        let err = BackupSnapshot::decode_verified(&bytes, &checksum(&bytes)).expect_err("version");
        assert_eq!(err, SnapshotError::UnsupportedVersion { version: 99 });
    }

    #[rstest]
    fn snapshot_keys_are_camel_case() {
        let json = serde_json::to_value(empty_snapshot()).expect("serialise");
        assert_eq!(json["formatVersion"], 1);
        assert!(json.get("leaveRequests").is_some());
        assert!(json.get("messAttendance").is_some());
    }
}
