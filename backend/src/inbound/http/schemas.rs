//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialized shape of their domain types but
//! live in the inbound adapter layer where framework concerns belong.

#![expect(
    dead_code,
    reason = "Schema wrappers exist only for OpenAPI generation via utoipa"
)]

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The write lost a revision race or hit a uniqueness rule.
    #[schema(rename = "conflict")]
    Conflict,
    /// The requested status change is not allowed from the current status.
    #[schema(rename = "invalid_transition")]
    InvalidTransition,
    /// Storage is temporarily unreachable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error)]
#[schema(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Human-readable message returned to clients.
    #[schema(example = "End date must be after start date")]
    error: String,
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Every failing field message, present for validation failures.
    details: Option<Vec<String>>,
    /// Correlation identifier echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
}

/// OpenAPI schema for [`crate::domain::User`].
#[derive(ToSchema)]
#[schema(as = User)]
#[schema(rename_all = "camelCase")]
pub struct UserSchema {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    #[schema(example = "asha.n")]
    username: String,
    #[schema(example = "Asha Nair")]
    display_name: String,
    #[schema(example = "student")]
    role: String,
    hostel_id: Option<String>,
    #[schema(example = "N-101")]
    room_number: Option<String>,
}

/// OpenAPI schema for [`crate::domain::Hostel`].
#[derive(ToSchema)]
#[schema(as = Hostel)]
#[schema(rename_all = "camelCase")]
pub struct HostelSchema {
    id: String,
    #[schema(example = "North Hall")]
    name: String,
    warden_id: Option<String>,
    #[schema(example = 120)]
    capacity: u32,
}

/// OpenAPI schema for [`crate::domain::Event`].
#[derive(ToSchema)]
#[schema(as = Event)]
#[schema(rename_all = "camelCase")]
pub struct EventSchema {
    id: String,
    #[schema(example = "Movie night")]
    title: String,
    description: Option<String>,
    #[schema(example = "2024-02-01T18:00:00Z")]
    start_date: String,
    #[schema(example = "2024-02-01T21:00:00Z")]
    end_date: String,
    location: Option<String>,
    /// One of `academic`, `cultural`, `sports`, `meeting`, `maintenance`, `other`.
    #[schema(rename = "type")]
    #[schema(example = "cultural")]
    event_type: String,
    /// `null` for events shown in every hostel.
    hostel_id: Option<String>,
    created_by: String,
    revision: u32,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::Complaint`].
#[derive(ToSchema)]
#[schema(as = Complaint)]
#[schema(rename_all = "camelCase")]
pub struct ComplaintSchema {
    id: String,
    title: String,
    description: String,
    #[schema(example = "plumbing")]
    category: String,
    #[schema(example = "high")]
    priority: String,
    /// One of `pending`, `in-progress`, `resolved`, `rejected`.
    #[schema(example = "pending")]
    status: String,
    hostel_id: String,
    room_number: Option<String>,
    created_by: String,
    assigned_to: Option<String>,
    resolution: Option<String>,
    resolved_at: Option<String>,
    revision: u32,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::LeaveRequest`].
#[derive(ToSchema)]
#[schema(as = LeaveRequest)]
#[schema(rename_all = "camelCase")]
pub struct LeaveRequestSchema {
    id: String,
    student_id: String,
    hostel_id: Option<String>,
    #[schema(rename = "type")]
    #[schema(example = "home")]
    leave_type: String,
    reason: String,
    start_date: String,
    end_date: String,
    destination: Option<String>,
    /// One of `pending`, `approved`, `rejected`.
    #[schema(example = "pending")]
    status: String,
    approved_by: Option<String>,
    remarks: Option<String>,
    decided_at: Option<String>,
    revision: u32,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::MessMenu`].
#[derive(ToSchema)]
#[schema(as = MessMenu)]
#[schema(rename_all = "camelCase")]
pub struct MessMenuSchema {
    id: String,
    hostel_id: Option<String>,
    #[schema(example = "2024-03-15")]
    date: String,
    #[schema(example = "lunch")]
    meal: String,
    items: Vec<String>,
    created_by: String,
    revision: u32,
    created_at: String,
    updated_at: String,
}

/// OpenAPI schema for [`crate::domain::MessAttendance`].
#[derive(ToSchema)]
#[schema(as = MessAttendance)]
#[schema(rename_all = "camelCase")]
pub struct MessAttendanceSchema {
    id: String,
    student_id: String,
    hostel_id: Option<String>,
    date: String,
    meal: String,
    present: bool,
    recorded_by: String,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::MessFeedback`].
#[derive(ToSchema)]
#[schema(as = MessFeedback)]
#[schema(rename_all = "camelCase")]
pub struct MessFeedbackSchema {
    id: String,
    student_id: String,
    hostel_id: Option<String>,
    date: String,
    meal: Option<String>,
    #[schema(minimum = 1, maximum = 5, example = 4)]
    rating: u8,
    comment: Option<String>,
    created_at: String,
}

/// OpenAPI schema for [`crate::domain::Backup`].
#[derive(ToSchema)]
#[schema(as = Backup)]
#[schema(rename_all = "camelCase")]
pub struct BackupSchema {
    id: String,
    #[schema(example = "before term start")]
    label: String,
    created_by: String,
    created_at: String,
    size_bytes: u64,
    /// Hex-encoded SHA-256 of the snapshot payload.
    checksum: String,
    record_count: u64,
}

/// Response body for `POST /api/v1/backups/restore`.
#[derive(ToSchema)]
#[schema(as = RestoreOutcome)]
#[schema(rename_all = "camelCase")]
pub struct RestoreSchema {
    #[schema(example = "Backup restored successfully")]
    message: String,
    backup: BackupSchema,
    /// Records written back into storage.
    restored_records: u64,
}

/// Confirmation body returned by delete endpoints.
#[derive(ToSchema)]
#[schema(as = MessageResponse)]
pub struct MessageSchema {
    #[schema(example = "Event deleted successfully")]
    message: String,
}

macro_rules! page_schema {
    ($name:ident, $alias:ident, $item:ty) => {
        #[doc = concat!("Paginated envelope of `", stringify!($item), "` items.")]
        #[derive(ToSchema)]
        #[schema(as = $alias)]
        pub struct $name {
            items: Vec<$item>,
            #[schema(example = 1)]
            page: u32,
            #[schema(example = 10)]
            limit: u32,
            total: u64,
            pages: u64,
        }
    };
}

page_schema!(EventPageSchema, EventPage, EventSchema);
page_schema!(ComplaintPageSchema, ComplaintPage, ComplaintSchema);
page_schema!(LeaveRequestPageSchema, LeaveRequestPage, LeaveRequestSchema);
page_schema!(
    NotificationPageSchema,
    NotificationPage,
    crate::inbound::http::notifications::NotificationResponse
);
page_schema!(MessMenuPageSchema, MessMenuPage, MessMenuSchema);
page_schema!(MessAttendancePageSchema, MessAttendancePage, MessAttendanceSchema);
page_schema!(MessFeedbackPageSchema, MessFeedbackPage, MessFeedbackSchema);
page_schema!(BackupPageSchema, BackupPage, BackupSchema);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;
    use utoipa::openapi::{RefOr, schema::Schema};

    fn object_properties(schema: RefOr<Schema>) -> Vec<String> {
        match schema {
            RefOr::T(Schema::Object(object)) => object.properties.keys().cloned().collect(),
            other => panic!("expected an object schema, got {other:?}"),
        }
    }

    #[rstest]
    fn error_schema_matches_the_envelope() {
        let mut fields = object_properties(ErrorSchema::schema());
        fields.sort();
        assert_eq!(fields, ["code", "details", "error", "traceId"]);
    }

    #[rstest]
    fn page_schema_carries_pagination_fields() {
        let mut fields = object_properties(EventPageSchema::schema());
        fields.sort();
        assert_eq!(fields, ["items", "limit", "page", "pages", "total"]);
    }

    #[rstest]
    fn event_schema_uses_type_key() {
        let fields = object_properties(EventSchema::schema());
        assert!(fields.iter().any(|field| field == "type"));
        assert!(fields.iter().any(|field| field == "startDate"));
    }
}
