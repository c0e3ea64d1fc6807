//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every `/api/v1` handler, the health probes, the
//! schema wrappers from [`crate::inbound::http::schemas`] and the session
//! cookie security scheme. Swagger UI serves it in debug builds and
//! `openapi-dump` prints it for external tooling.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::backups::CreateBackupRequest;
use crate::inbound::http::complaints::{CreateComplaintRequest, UpdateComplaintRequest};
use crate::inbound::http::events::{CreateEventRequest, UpdateEventRequest};
use crate::inbound::http::leave_requests::{CreateLeaveRequest, UpdateLeaveRequest};
use crate::inbound::http::mess::{
    CreateMenuRequest, MarkAttendanceRequest, SubmitFeedbackRequest, UpdateMenuRequest,
};
use crate::inbound::http::notifications::{
    CreateNotificationRequest, NotificationResponse, ReadStateRequest,
};
use crate::inbound::http::preferences::{PreferencesRequest, UserPreferencesResponse};
use crate::inbound::http::schemas::{
    BackupPageSchema, BackupSchema, ComplaintPageSchema, ComplaintSchema, ErrorCodeSchema,
    ErrorSchema, EventPageSchema, EventSchema, HostelSchema, LeaveRequestPageSchema,
    LeaveRequestSchema, MessAttendancePageSchema, MessAttendanceSchema, MessFeedbackPageSchema,
    MessFeedbackSchema, MessMenuPageSchema, MessMenuSchema, MessageSchema, NotificationPageSchema,
    RestoreSchema, UserSchema,
};
use crate::inbound::http::users::LoginRequest;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Hostel management API",
        description = "Events, complaints, leave, notifications, mess, preferences, \
                       backups and reports for hostel residents and staff."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::list_hostels,
        crate::inbound::http::preferences::get_preferences,
        crate::inbound::http::preferences::update_preferences,
        crate::inbound::http::events::list_events,
        crate::inbound::http::events::create_event,
        crate::inbound::http::events::update_event,
        crate::inbound::http::events::delete_event,
        crate::inbound::http::complaints::list_complaints,
        crate::inbound::http::complaints::create_complaint,
        crate::inbound::http::complaints::update_complaint,
        crate::inbound::http::complaints::delete_complaint,
        crate::inbound::http::leave_requests::list_leave_requests,
        crate::inbound::http::leave_requests::create_leave_request,
        crate::inbound::http::leave_requests::update_leave_request,
        crate::inbound::http::leave_requests::delete_leave_request,
        crate::inbound::http::notifications::list_notifications,
        crate::inbound::http::notifications::create_notification,
        crate::inbound::http::notifications::update_notification,
        crate::inbound::http::notifications::mark_all_read,
        crate::inbound::http::notifications::delete_notification,
        crate::inbound::http::mess::list_menus,
        crate::inbound::http::mess::create_menu,
        crate::inbound::http::mess::update_menu,
        crate::inbound::http::mess::delete_menu,
        crate::inbound::http::mess::list_attendance,
        crate::inbound::http::mess::mark_attendance,
        crate::inbound::http::mess::delete_attendance,
        crate::inbound::http::mess::list_feedback,
        crate::inbound::http::mess::submit_feedback,
        crate::inbound::http::mess::delete_feedback,
        crate::inbound::http::backups::list_backups,
        crate::inbound::http::backups::create_backup,
        crate::inbound::http::backups::download_backup,
        crate::inbound::http::backups::restore_backup,
        crate::inbound::http::backups::delete_backup,
        crate::inbound::http::reports::export_report,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        MessageSchema,
        UserSchema,
        HostelSchema,
        LoginRequest,
        PreferencesRequest,
        UserPreferencesResponse,
        EventSchema,
        EventPageSchema,
        CreateEventRequest,
        UpdateEventRequest,
        ComplaintSchema,
        ComplaintPageSchema,
        CreateComplaintRequest,
        UpdateComplaintRequest,
        LeaveRequestSchema,
        LeaveRequestPageSchema,
        CreateLeaveRequest,
        UpdateLeaveRequest,
        NotificationResponse,
        NotificationPageSchema,
        CreateNotificationRequest,
        ReadStateRequest,
        MessMenuSchema,
        MessMenuPageSchema,
        CreateMenuRequest,
        UpdateMenuRequest,
        MessAttendanceSchema,
        MessAttendancePageSchema,
        MarkAttendanceRequest,
        MessFeedbackSchema,
        MessFeedbackPageSchema,
        SubmitFeedbackRequest,
        BackupSchema,
        BackupPageSchema,
        CreateBackupRequest,
        RestoreSchema,
    )),
    tags(
        (name = "users", description = "Sessions, profile, hostels and preferences"),
        (name = "events", description = "Hostel and global events"),
        (name = "complaints", description = "Maintenance and conduct complaints"),
        (name = "leave-requests", description = "Student leave requests"),
        (name = "notifications", description = "Broadcast and direct notifications"),
        (name = "mess", description = "Menus, attendance and feedback"),
        (name = "backups", description = "Record snapshots"),
        (name = "reports", description = "CSV and HTML exports"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn property_names(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        match components.schemas.get(name) {
            Some(RefOr::T(Schema::Object(object))) => object.properties.keys().cloned().collect(),
            other => panic!("expected object schema for {name}, got {other:?}"),
        }
    }

    #[rstest]
    fn error_envelope_is_registered() {
        let fields = property_names("Error");
        for field in ["error", "code", "details", "traceId"] {
            assert!(fields.iter().any(|f| f == field), "missing {field}");
        }
    }

    #[rstest]
    #[case("/api/v1/events")]
    #[case("/api/v1/notifications/mark-all-read")]
    #[case("/api/v1/backups/restore")]
    #[case("/api/v1/reports/{entity}")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_declared() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
