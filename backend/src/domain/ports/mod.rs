//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`UserDirectory`], [`RecordSnapshotStore`])
//! are implemented by outbound adapters. Driving ports (`*Query`,
//! `*Command`, [`LoginService`], [`ReportQuery`]) are implemented by domain
//! services and consumed by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod backup_repository;
mod backup_use_cases;
mod complaint_repository;
mod complaint_use_cases;
mod event_repository;
mod event_use_cases;
mod leave_request_repository;
mod leave_request_use_cases;
mod login_service;
mod mess_repository;
mod mess_use_cases;
mod notification_repository;
mod notification_use_cases;
mod report_query;
mod repository;
mod user_directory;
mod user_preferences_command;
mod user_preferences_query;
mod user_preferences_repository;
mod user_profile_query;

pub use backup_repository::{BackupRepository, RecordSnapshotStore};
#[cfg(test)]
pub use backup_repository::{MockBackupRepository, MockRecordSnapshotStore};
pub use backup_use_cases::{BackupCommand, BackupDownload, BackupQuery, RestoreOutcome};
#[cfg(test)]
pub use backup_use_cases::{MockBackupCommand, MockBackupQuery};
pub use complaint_repository::ComplaintRepository;
#[cfg(test)]
pub use complaint_repository::MockComplaintRepository;
pub use complaint_use_cases::{ComplaintCommand, ComplaintQuery};
#[cfg(test)]
pub use complaint_use_cases::{MockComplaintCommand, MockComplaintQuery};
pub use event_repository::EventRepository;
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_use_cases::{EventCommand, EventQuery};
#[cfg(test)]
pub use event_use_cases::{MockEventCommand, MockEventQuery};
pub use leave_request_repository::LeaveRequestRepository;
#[cfg(test)]
pub use leave_request_repository::MockLeaveRequestRepository;
pub use leave_request_use_cases::{LeaveRequestCommand, LeaveRequestQuery};
#[cfg(test)]
pub use leave_request_use_cases::{MockLeaveRequestCommand, MockLeaveRequestQuery};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use mess_repository::{
    MockMessAttendanceRepository, MockMessFeedbackRepository, MockMessMenuRepository,
};
pub use mess_repository::{MessAttendanceRepository, MessFeedbackRepository, MessMenuRepository};
pub use mess_use_cases::{MessCommand, MessQuery};
#[cfg(test)]
pub use mess_use_cases::{MockMessCommand, MockMessQuery};
#[cfg(test)]
pub use notification_repository::MockNotificationRepository;
pub use notification_repository::NotificationRepository;
#[cfg(test)]
pub use notification_use_cases::{MockNotificationCommand, MockNotificationQuery};
pub use notification_use_cases::{NotificationCommand, NotificationQuery};
#[cfg(test)]
pub use report_query::MockReportQuery;
pub use report_query::{ReportQuery, ReportRequest};
pub use repository::{Listing, RepositoryError, map_repository_error, revision_conflict};
#[cfg(test)]
pub use user_directory::MockUserDirectory;
pub use user_directory::{UserAccount, UserDirectory};
#[cfg(test)]
pub use user_preferences_command::MockUserPreferencesCommand;
pub use user_preferences_command::{UpdatePreferencesRequest, UserPreferencesCommand};
#[cfg(test)]
pub use user_preferences_query::MockUserPreferencesQuery;
pub use user_preferences_query::UserPreferencesQuery;
#[cfg(test)]
pub use user_preferences_repository::MockUserPreferencesRepository;
pub use user_preferences_repository::{UserPreferencesRepository, UserPreferencesRepositoryError};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
