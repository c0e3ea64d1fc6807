//! PostgreSQL-backed backup storage and record snapshots.
//!
//! [`DieselBackupRepository`] keeps backup metadata and payloads in the
//! `backups` table. [`DieselRecordSnapshotStore`] exports every record table
//! and restores them inside one transaction: either every table is replaced
//! or none is.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::PageRequest;

use crate::domain::ports::{BackupRepository, Listing, RecordSnapshotStore, RepositoryError};
use crate::domain::{
    Backup, BackupId, BackupSnapshot, Complaint, Event, LeaveRequest, MessAttendance,
    MessFeedback, MessMenu, Notification, SNAPSHOT_FORMAT_VERSION,
};

use super::diesel_helpers::{
    cast_count, cast_count_for_db, map_diesel_error, map_pool_error, page_bounds,
};
use super::models::{
    BackupRow, ComplaintRow, EventRow, LeaveRequestRow, MessAttendanceRow, MessFeedbackRow,
    MessMenuRow, NewBackupRow, NotificationRow,
};
use super::pool::DbPool;
use super::schema::{
    backups, complaints, events, leave_requests, mess_attendance, mess_feedback, mess_menus,
    notifications,
};

/// Rows per `INSERT` during a restore. Keeps every statement well below the
/// Postgres bind-parameter limit.
const RESTORE_CHUNK: usize = 1_000;

/// Diesel-backed backup storage.
#[derive(Clone)]
pub struct DieselBackupRepository {
    pool: DbPool,
}

impl DieselBackupRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BackupRepository for DieselBackupRepository {
    async fn list(&self, page: &PageRequest) -> Result<Listing<Backup>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = backups::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<BackupRow> = backups::table
            .select(BackupRow::as_select())
            .order((backups::created_at.desc(), backups::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(Listing::new(
            rows.into_iter().map(Backup::from).collect(),
            cast_count(total),
        ))
    }

    async fn find(&self, id: &BackupId) -> Result<Option<Backup>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<BackupRow> = backups::table
            .find(id.as_uuid())
            .select(BackupRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(Backup::from))
    }

    async fn payload(&self, id: &BackupId) -> Result<Option<Vec<u8>>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        backups::table
            .find(id.as_uuid())
            .select(backups::payload)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn insert(&self, backup: &Backup, payload: &[u8]) -> Result<(), RepositoryError> {
        let row = NewBackupRow {
            id: *backup.id.as_uuid(),
            label: &backup.label,
            created_by: *backup.created_by.as_uuid(),
            created_at: backup.created_at,
            size_bytes: cast_count_for_db(backup.size_bytes)?,
            checksum: &backup.checksum,
            record_count: cast_count_for_db(backup.record_count)?,
            payload,
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(backups::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &BackupId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(backups::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

/// Diesel-backed export and restore of every record table.
#[derive(Clone)]
pub struct DieselRecordSnapshotStore {
    pool: DbPool,
}

impl DieselRecordSnapshotStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn convert<R, T>(rows: Vec<R>) -> Result<Vec<T>, RepositoryError>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Owned rows for every record table, ready to insert.
struct RestoreRows {
    events: Vec<EventRow>,
    complaints: Vec<ComplaintRow>,
    leave_requests: Vec<LeaveRequestRow>,
    notifications: Vec<NotificationRow>,
    mess_menus: Vec<MessMenuRow>,
    mess_attendance: Vec<MessAttendanceRow>,
    mess_feedback: Vec<MessFeedbackRow>,
}

impl From<&BackupSnapshot> for RestoreRows {
    fn from(snapshot: &BackupSnapshot) -> Self {
        Self {
            events: snapshot.events.iter().map(EventRow::from).collect(),
            complaints: snapshot.complaints.iter().map(ComplaintRow::from).collect(),
            leave_requests: snapshot
                .leave_requests
                .iter()
                .map(LeaveRequestRow::from)
                .collect(),
            notifications: snapshot
                .notifications
                .iter()
                .map(NotificationRow::from)
                .collect(),
            mess_menus: snapshot.mess_menus.iter().map(MessMenuRow::from).collect(),
            mess_attendance: snapshot
                .mess_attendance
                .iter()
                .map(MessAttendanceRow::from)
                .collect(),
            mess_feedback: snapshot
                .mess_feedback
                .iter()
                .map(MessFeedbackRow::from)
                .collect(),
        }
    }
}

macro_rules! reload_table {
    ($conn:expr, $table:path, $rows:expr) => {{
        diesel::delete($table).execute($conn).await?;
        for chunk in $rows.chunks(RESTORE_CHUNK) {
            diesel::insert_into($table).values(chunk).execute($conn).await?;
        }
    }};
}

async fn replace_records(
    conn: &mut AsyncPgConnection,
    rows: RestoreRows,
) -> Result<(), diesel::result::Error> {
    conn.transaction(|conn| {
        async move {
            reload_table!(conn, events::table, rows.events);
            reload_table!(conn, complaints::table, rows.complaints);
            reload_table!(conn, leave_requests::table, rows.leave_requests);
            reload_table!(conn, notifications::table, rows.notifications);
            reload_table!(conn, mess_menus::table, rows.mess_menus);
            reload_table!(conn, mess_attendance::table, rows.mess_attendance);
            reload_table!(conn, mess_feedback::table, rows.mess_feedback);
            Ok(())
        }
        .scope_boxed()
    })
    .await
}

#[async_trait]
impl RecordSnapshotStore for DieselRecordSnapshotStore {
    async fn export(&self) -> Result<BackupSnapshot, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let event_rows: Vec<EventRow> = events::table
            .select(EventRow::as_select())
            .order(events::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let complaint_rows: Vec<ComplaintRow> = complaints::table
            .select(ComplaintRow::as_select())
            .order(complaints::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let leave_rows: Vec<LeaveRequestRow> = leave_requests::table
            .select(LeaveRequestRow::as_select())
            .order(leave_requests::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let notification_rows: Vec<NotificationRow> = notifications::table
            .select(NotificationRow::as_select())
            .order(notifications::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let menu_rows: Vec<MessMenuRow> = mess_menus::table
            .select(MessMenuRow::as_select())
            .order(mess_menus::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let attendance_rows: Vec<MessAttendanceRow> = mess_attendance::table
            .select(MessAttendanceRow::as_select())
            .order(mess_attendance::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let feedback_rows: Vec<MessFeedbackRow> = mess_feedback::table
            .select(MessFeedbackRow::as_select())
            .order(mess_feedback::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(BackupSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            events: convert::<_, Event>(event_rows)?,
            complaints: convert::<_, Complaint>(complaint_rows)?,
            leave_requests: convert::<_, LeaveRequest>(leave_rows)?,
            notifications: convert::<_, Notification>(notification_rows)?,
            mess_menus: convert::<_, MessMenu>(menu_rows)?,
            mess_attendance: convert::<_, MessAttendance>(attendance_rows)?,
            mess_feedback: convert::<_, MessFeedback>(feedback_rows)?,
        })
    }

    async fn restore(&self, snapshot: &BackupSnapshot) -> Result<(), RepositoryError> {
        let rows = RestoreRows::from(snapshot);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        replace_records(&mut conn, rows)
            .await
            .map_err(map_diesel_error)
    }
}
