//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and never
//! leave it. Each row converts to its domain record with `TryFrom`, which
//! rejects stored values the domain no longer accepts; domain records convert
//! back with `From`.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::ports::{RepositoryError, UserAccount};
use crate::domain::{
    AttendanceId, Backup, BackupId, Complaint, ComplaintId, Event, EventId, FeedbackId, Hostel,
    HostelId, LanguageTag, LeaveRequest, LeaveRequestId, MessAttendance, MessFeedback, MessMenu,
    MessMenuId, Notification, NotificationId, PasswordDigest, Rating, User, UserId,
    UserPreferences,
};

use super::diesel_helpers::{
    cast_count, cast_revision, cast_revision_for_db, corrupt_row,
};
use super::schema::{
    backups, complaints, events, hostels, leave_requests, mess_attendance, mess_feedback,
    mess_menus, notifications, user_preferences, users,
};

fn parse_column<T>(column: &str, raw: &str) -> Result<T, RepositoryError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|err| corrupt_row(column, err))
}

fn user_id(raw: Uuid) -> UserId {
    UserId::from_uuid(raw)
}

fn hostel_id(raw: Option<Uuid>) -> Option<HostelId> {
    raw.map(HostelId::from_uuid)
}

fn raw_hostel(id: Option<HostelId>) -> Option<Uuid> {
    id.map(|id| *id.as_uuid())
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Row in the hostels table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = hostels)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HostelRow {
    pub id: Uuid,
    pub name: String,
    pub warden_id: Option<Uuid>,
    pub capacity: i32,
}

impl From<HostelRow> for Hostel {
    fn from(row: HostelRow) -> Self {
        Self {
            id: HostelId::from_uuid(row.id),
            name: row.name,
            warden_id: row.warden_id.map(UserId::from_uuid),
            capacity: u32::try_from(row.capacity).unwrap_or_default(),
        }
    }
}

/// Row in the users table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub role: String,
    pub hostel_id: Option<Uuid>,
    pub room_number: Option<String>,
    pub password_digest: String,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user: User {
                id: user_id(row.id),
                username: row.username,
                display_name: row.display_name,
                role: parse_column("role", &row.role)?,
                hostel_id: hostel_id(row.hostel_id),
                room_number: row.room_number,
            },
            password_digest: PasswordDigest::parse(row.password_digest)
                .map_err(|err| corrupt_row("password_digest", err))?,
        })
    }
}

impl From<&UserAccount> for UserRow {
    fn from(account: &UserAccount) -> Self {
        let user = &account.user;
        Self {
            id: *user.id.as_uuid(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            role: user.role.as_str().to_owned(),
            hostel_id: raw_hostel(user.hostel_id),
            room_number: user.room_number.clone(),
            password_digest: account.password_digest.as_str().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Row in the events table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct EventRow {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub location: Option<String>,
    pub event_type: String,
    pub hostel_id: Option<Uuid>,
    pub created_by: Uuid,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = RepositoryError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EventId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            start_date: row.start_date,
            end_date: row.end_date,
            location: row.location,
            event_type: parse_column("event_type", &row.event_type)?,
            hostel_id: hostel_id(row.hostel_id),
            created_by: user_id(row.created_by),
            revision: cast_revision(row.revision),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Event> for EventRow {
    fn from(event: &Event) -> Self {
        Self {
            id: *event.id.as_uuid(),
            title: event.title.clone(),
            description: event.description.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            location: event.location.clone(),
            event_type: event.event_type.as_str().to_owned(),
            hostel_id: raw_hostel(event.hostel_id),
            created_by: *event.created_by.as_uuid(),
            revision: cast_revision_for_db(event.revision),
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Complaints
// ---------------------------------------------------------------------------

/// Row in the complaints table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = complaints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ComplaintRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub hostel_id: Uuid,
    pub room_number: Option<String>,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub resolution: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ComplaintRow> for Complaint {
    type Error = RepositoryError;

    fn try_from(row: ComplaintRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ComplaintId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            category: parse_column("category", &row.category)?,
            priority: parse_column("priority", &row.priority)?,
            status: parse_column("status", &row.status)?,
            hostel_id: HostelId::from_uuid(row.hostel_id),
            room_number: row.room_number,
            created_by: user_id(row.created_by),
            assigned_to: row.assigned_to.map(UserId::from_uuid),
            resolution: row.resolution,
            resolved_at: row.resolved_at,
            revision: cast_revision(row.revision),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&Complaint> for ComplaintRow {
    fn from(complaint: &Complaint) -> Self {
        Self {
            id: *complaint.id.as_uuid(),
            title: complaint.title.clone(),
            description: complaint.description.clone(),
            category: complaint.category.as_str().to_owned(),
            priority: complaint.priority.as_str().to_owned(),
            status: complaint.status.as_str().to_owned(),
            hostel_id: *complaint.hostel_id.as_uuid(),
            room_number: complaint.room_number.clone(),
            created_by: *complaint.created_by.as_uuid(),
            assigned_to: complaint.assigned_to.map(|id| *id.as_uuid()),
            resolution: complaint.resolution.clone(),
            resolved_at: complaint.resolved_at,
            revision: cast_revision_for_db(complaint.revision),
            created_at: complaint.created_at,
            updated_at: complaint.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Leave requests
// ---------------------------------------------------------------------------

/// Row in the leave_requests table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = leave_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LeaveRequestRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub hostel_id: Option<Uuid>,
    pub leave_type: String,
    pub reason: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub destination: Option<String>,
    pub status: String,
    pub approved_by: Option<Uuid>,
    pub remarks: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = RepositoryError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: LeaveRequestId::from_uuid(row.id),
            student_id: user_id(row.student_id),
            hostel_id: hostel_id(row.hostel_id),
            leave_type: parse_column("leave_type", &row.leave_type)?,
            reason: row.reason,
            start_date: row.start_date,
            end_date: row.end_date,
            destination: row.destination,
            status: parse_column("status", &row.status)?,
            approved_by: row.approved_by.map(UserId::from_uuid),
            remarks: row.remarks,
            decided_at: row.decided_at,
            revision: cast_revision(row.revision),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&LeaveRequest> for LeaveRequestRow {
    fn from(request: &LeaveRequest) -> Self {
        Self {
            id: *request.id.as_uuid(),
            student_id: *request.student_id.as_uuid(),
            hostel_id: raw_hostel(request.hostel_id),
            leave_type: request.leave_type.as_str().to_owned(),
            reason: request.reason.clone(),
            start_date: request.start_date,
            end_date: request.end_date,
            destination: request.destination.clone(),
            status: request.status.as_str().to_owned(),
            approved_by: request.approved_by.map(|id| *id.as_uuid()),
            remarks: request.remarks.clone(),
            decided_at: request.decided_at,
            revision: cast_revision_for_db(request.revision),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// Row in the notifications table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct NotificationRow {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub hostel_id: Option<Uuid>,
    pub title: String,
    pub message: String,
    pub category: String,
    pub created_by: Uuid,
    pub read_by: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = RepositoryError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: NotificationId::from_uuid(row.id),
            user_id: row.user_id.map(UserId::from_uuid),
            hostel_id: hostel_id(row.hostel_id),
            title: row.title,
            message: row.message,
            category: parse_column("category", &row.category)?,
            created_by: user_id(row.created_by),
            read_by: row.read_by.into_iter().map(UserId::from_uuid).collect(),
            created_at: row.created_at,
        })
    }
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: *notification.id.as_uuid(),
            user_id: notification.user_id.map(|id| *id.as_uuid()),
            hostel_id: raw_hostel(notification.hostel_id),
            title: notification.title.clone(),
            message: notification.message.clone(),
            category: notification.category.as_str().to_owned(),
            created_by: *notification.created_by.as_uuid(),
            read_by: notification.read_by.iter().map(|id| *id.as_uuid()).collect(),
            created_at: notification.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Mess
// ---------------------------------------------------------------------------

/// Row in the mess_menus table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = mess_menus)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct MessMenuRow {
    pub id: Uuid,
    pub hostel_id: Option<Uuid>,
    pub date: NaiveDate,
    pub meal: String,
    pub items: Vec<String>,
    pub created_by: Uuid,
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<MessMenuRow> for MessMenu {
    type Error = RepositoryError;

    fn try_from(row: MessMenuRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MessMenuId::from_uuid(row.id),
            hostel_id: hostel_id(row.hostel_id),
            date: row.date,
            meal: parse_column("meal", &row.meal)?,
            items: row.items,
            created_by: user_id(row.created_by),
            revision: cast_revision(row.revision),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl From<&MessMenu> for MessMenuRow {
    fn from(menu: &MessMenu) -> Self {
        Self {
            id: *menu.id.as_uuid(),
            hostel_id: raw_hostel(menu.hostel_id),
            date: menu.date,
            meal: menu.meal.as_str().to_owned(),
            items: menu.items.clone(),
            created_by: *menu.created_by.as_uuid(),
            revision: cast_revision_for_db(menu.revision),
            created_at: menu.created_at,
            updated_at: menu.updated_at,
        }
    }
}

/// Row in the mess_attendance table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = mess_attendance)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessAttendanceRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub hostel_id: Option<Uuid>,
    pub date: NaiveDate,
    pub meal: String,
    pub present: bool,
    pub recorded_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessAttendanceRow> for MessAttendance {
    type Error = RepositoryError;

    fn try_from(row: MessAttendanceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttendanceId::from_uuid(row.id),
            student_id: user_id(row.student_id),
            hostel_id: hostel_id(row.hostel_id),
            date: row.date,
            meal: parse_column("meal", &row.meal)?,
            present: row.present,
            recorded_by: user_id(row.recorded_by),
            created_at: row.created_at,
        })
    }
}

impl From<&MessAttendance> for MessAttendanceRow {
    fn from(mark: &MessAttendance) -> Self {
        Self {
            id: *mark.id.as_uuid(),
            student_id: *mark.student_id.as_uuid(),
            hostel_id: raw_hostel(mark.hostel_id),
            date: mark.date,
            meal: mark.meal.as_str().to_owned(),
            present: mark.present,
            recorded_by: *mark.recorded_by.as_uuid(),
            created_at: mark.created_at,
        }
    }
}

/// Row in the mess_feedback table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = mess_feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MessFeedbackRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub hostel_id: Option<Uuid>,
    pub date: NaiveDate,
    pub meal: Option<String>,
    pub rating: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<MessFeedbackRow> for MessFeedback {
    type Error = RepositoryError;

    fn try_from(row: MessFeedbackRow) -> Result<Self, Self::Error> {
        let rating = u8::try_from(row.rating)
            .ok()
            .and_then(|value| Rating::new(value).ok())
            .ok_or_else(|| corrupt_row("rating", row.rating))?;
        Ok(Self {
            id: FeedbackId::from_uuid(row.id),
            student_id: user_id(row.student_id),
            hostel_id: hostel_id(row.hostel_id),
            date: row.date,
            meal: row
                .meal
                .as_deref()
                .map(|meal| parse_column("meal", meal))
                .transpose()?,
            rating,
            comment: row.comment,
            created_at: row.created_at,
        })
    }
}

impl From<&MessFeedback> for MessFeedbackRow {
    fn from(feedback: &MessFeedback) -> Self {
        Self {
            id: *feedback.id.as_uuid(),
            student_id: *feedback.student_id.as_uuid(),
            hostel_id: raw_hostel(feedback.hostel_id),
            date: feedback.date,
            meal: feedback.meal.map(|meal| meal.as_str().to_owned()),
            rating: i16::from(u8::from(feedback.rating)),
            comment: feedback.comment.clone(),
            created_at: feedback.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// Row in the user_preferences table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = user_preferences)]
#[diesel(primary_key(user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserPreferencesRow {
    pub user_id: Uuid,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub theme: String,
    pub language: String,
    pub revision: i32,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserPreferencesRow> for UserPreferences {
    type Error = RepositoryError;

    fn try_from(row: UserPreferencesRow) -> Result<Self, Self::Error> {
        Ok(UserPreferences::builder(user_id(row.user_id))
            .email_notifications(row.email_notifications)
            .sms_notifications(row.sms_notifications)
            .push_notifications(row.push_notifications)
            .theme(parse_column("theme", &row.theme)?)
            .language(LanguageTag::new(row.language).map_err(|err| corrupt_row("language", err))?)
            .revision(cast_revision(row.revision))
            .updated_at(row.updated_at)
            .build())
    }
}

impl From<&UserPreferences> for UserPreferencesRow {
    fn from(preferences: &UserPreferences) -> Self {
        Self {
            user_id: *preferences.user_id.as_uuid(),
            email_notifications: preferences.email_notifications,
            sms_notifications: preferences.sms_notifications,
            push_notifications: preferences.push_notifications,
            theme: preferences.theme.as_str().to_owned(),
            language: preferences.language.as_str().to_owned(),
            revision: cast_revision_for_db(preferences.revision),
            updated_at: preferences.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

/// Backup metadata columns, excluding the payload.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = backups)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BackupRow {
    pub id: Uuid,
    pub label: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub checksum: String,
    pub record_count: i64,
}

impl From<BackupRow> for Backup {
    fn from(row: BackupRow) -> Self {
        Self {
            id: BackupId::from_uuid(row.id),
            label: row.label,
            created_by: user_id(row.created_by),
            created_at: row.created_at,
            size_bytes: cast_count(row.size_bytes),
            checksum: row.checksum,
            record_count: cast_count(row.record_count),
        }
    }
}

/// Insertable backup including its payload.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = backups)]
pub(crate) struct NewBackupRow<'a> {
    pub id: Uuid,
    pub label: &'a str,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub size_bytes: i64,
    pub checksum: &'a str,
    pub record_count: i64,
    pub payload: &'a [u8],
}
