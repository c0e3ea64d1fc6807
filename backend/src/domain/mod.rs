//! Domain primitives, aggregates and services.
//!
//! Purpose: Define strongly typed hostel records and the rules that govern
//! them, independent of HTTP and storage. Inbound adapters call the driving
//! ports in [`ports`]; outbound adapters implement the driven ones.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - Principal: the authenticated caller, resolved per request.
//! - HostelFilter / RecordScope / Audience: role-based visibility.
//! - complaint_transition / leave_transition: status rules.
//! - render_report: CSV and printable HTML exports.
//! - `*Service`: implementations of the driving ports.

pub mod error;
pub mod ports;
pub mod trace_id;

mod auth;
mod backup;
mod backup_service;
mod choice;
mod complaint;
mod complaint_service;
mod event;
mod event_service;
mod export;
mod hostel;
mod identity_service;
mod ids;
mod leave_request;
mod leave_request_service;
mod mess;
mod mess_service;
mod notification;
mod notification_service;
mod preferences;
mod preferences_service;
mod report_service;
mod service_support;
#[cfg(test)]
mod test_support;
mod transitions;
mod user;
mod validation;
mod visibility;

pub use self::auth::{
    LoginCredentials, LoginValidationError, PasswordDigest, PasswordDigestFormatError,
    PasswordHashError, Principal,
};
pub use self::backup::{
    Backup, BackupSnapshot, SNAPSHOT_FORMAT_VERSION, SnapshotError, checksum,
};
pub use self::backup_service::BackupService;
pub(crate) use self::choice::choice_enum;
pub use self::choice::{Choice, ParseChoiceError};
pub use self::complaint::{
    Complaint, ComplaintCategory, ComplaintCriteria, ComplaintFilter, ComplaintPatch,
    ComplaintPriority, ComplaintStatus, NewComplaint,
};
pub use self::complaint_service::ComplaintService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event::{Event, EventCriteria, EventFilter, EventPatch, EventType, NewEvent};
pub use self::event_service::EventService;
pub use self::export::{
    CellValue, EMPTY_REPORT_PLACEHOLDER, Exportable, FlatRecord, ParsePeriodError, RenderError,
    RenderedReport, ReportEntity, ReportFormat, ReportPeriod, header_for, render_csv,
    render_html, render_report,
};
pub use self::hostel::Hostel;
pub use self::identity_service::IdentityService;
pub use self::ids::{
    AttendanceId, BackupId, ComplaintId, EventId, FeedbackId, HostelId, IdParseError,
    LeaveRequestId, MessMenuId, NotificationId, UserId,
};
pub use self::leave_request::{
    LeaveCriteria, LeaveFilter, LeavePatch, LeaveRequest, LeaveStatus, LeaveType,
    NewLeaveRequest,
};
pub use self::leave_request_service::LeaveRequestService;
pub use self::mess::{
    Meal, MessAttendance, MessAttendanceCriteria, MessAttendanceFilter, MessFeedback,
    MessFeedbackCriteria, MessFeedbackFilter, MessMenu, MessMenuCriteria, MessMenuFilter,
    MessMenuPatch, NewMessAttendance, NewMessFeedback, NewMessMenu, Rating, RatingOutOfRange,
};
pub use self::mess_service::{MessRepositories, MessService};
pub use self::notification::{
    NewNotification, Notification, NotificationCategory, NotificationCriteria,
    NotificationFilter,
};
pub use self::notification_service::NotificationService;
pub use self::preferences::{
    LanguageTag, LanguageTagError, PreferencesPatch, Theme, UserPreferences,
    UserPreferencesBuilder,
};
pub use self::preferences_service::UserPreferencesService;
pub use self::report_service::{ReportService, ReportSources};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transitions::{
    TransitionDenied, complaint_transition, leave_dates_editable, leave_transition,
};
pub use self::user::{ParseRoleError, Role, User};
pub use self::validation::{
    DATE_ORDER_MESSAGE, FieldErrors, VALIDATION_FAILED_MESSAGE, parse_choice, parse_day,
    parse_timestamp,
};
pub use self::visibility::{Audience, HostelFilter, RecordScope};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use hostel_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
