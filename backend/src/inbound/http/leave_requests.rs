//! Leave request endpoints.
//!
//! ```text
//! GET    /api/v1/leave-requests?status&type&studentId&hostelId&page&limit
//! GET    /api/v1/leave-requests?id=<uuid>
//! POST   /api/v1/leave-requests
//! PUT    /api/v1/leave-requests?id=<uuid>
//! DELETE /api/v1/leave-requests?id=<uuid>
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    FieldErrors, HostelId, LeaveCriteria, LeavePatch, LeaveRequestId, LeaveStatus, LeaveType,
    NewLeaveRequest, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{
    ErrorSchema, LeaveRequestPageSchema, LeaveRequestSchema, MessageSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IdQuery, PLACE_MAX, TEXT_MAX, nullable, optional_id, page_request, patch_text, rejected,
    require_id,
};

/// Query parameters accepted by `GET /api/v1/leave-requests`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaveListQuery {
    /// Fetch a single request instead of a page.
    pub id: Option<String>,
    pub status: Option<String>,
    /// Leave type.
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    /// Only this student's requests; ignored for students.
    pub student_id: Option<String>,
    /// Hostel to list; ignored for hostel-bound callers.
    pub hostel_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl LeaveListQuery {
    fn into_parts(self) -> ApiResult<(LeaveCriteria, PageRequest)> {
        let mut errors = FieldErrors::default();
        let status = errors.optional_choice::<LeaveStatus>("status", self.status.as_deref());
        let leave_type = errors.optional_choice::<LeaveType>("type", self.leave_type.as_deref());
        let student_id = optional_id::<UserId>(&mut errors, self.student_id.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let page = page_request(&mut errors, self.page.as_deref(), self.limit.as_deref());
        match (status, leave_type, student_id, hostel_id, page) {
            (Some(status), Some(leave_type), Some(student_id), Some(hostel_id), Some(page)) => Ok((
                LeaveCriteria {
                    hostel_id,
                    student_id,
                    status,
                    leave_type,
                },
                page,
            )),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `POST /api/v1/leave-requests`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaveRequest {
    #[serde(rename = "type")]
    #[schema(example = "home")]
    pub leave_type: Option<String>,
    #[schema(example = "Sister's wedding")]
    pub reason: Option<String>,
    #[schema(example = "2024-04-10")]
    pub start_date: Option<String>,
    #[schema(example = "2024-04-14")]
    pub end_date: Option<String>,
    pub destination: Option<String>,
}

impl CreateLeaveRequest {
    fn validate(self) -> ApiResult<NewLeaveRequest> {
        let mut errors = FieldErrors::default();
        let leave_type = errors.required_choice::<LeaveType>("type", self.leave_type.as_deref());
        let reason = errors.required_text("reason", self.reason.as_deref(), TEXT_MAX);
        let start_date = errors.required_timestamp("startDate", self.start_date.as_deref());
        let end_date = errors.required_timestamp("endDate", self.end_date.as_deref());
        let destination =
            errors.optional_text("destination", self.destination.as_deref(), PLACE_MAX);
        errors.date_order(start_date, end_date);
        match (leave_type, reason, start_date, end_date, destination) {
            (
                Some(leave_type),
                Some(reason),
                Some(start_date),
                Some(end_date),
                Some(destination),
            ) if errors.is_empty() => Ok(NewLeaveRequest {
                leave_type,
                reason,
                start_date,
                end_date,
                destination,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `PUT /api/v1/leave-requests?id=`.
///
/// Students edit their pending request; staff decide it with `status` and
/// optional `remarks`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeaveRequest {
    #[serde(rename = "type")]
    pub leave_type: Option<String>,
    pub reason: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub destination: Option<Option<String>>,
    #[schema(example = "approved")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub remarks: Option<Option<String>>,
    /// Revision the client last saw; a mismatch yields 409.
    pub expected_revision: Option<u32>,
}

impl UpdateLeaveRequest {
    fn validate(self) -> ApiResult<LeavePatch> {
        let mut errors = FieldErrors::default();
        let leave_type = errors.optional_choice::<LeaveType>("type", self.leave_type.as_deref());
        let reason = match self.reason.as_deref() {
            None => Some(None),
            raw => errors.required_text("reason", raw, TEXT_MAX).map(Some),
        };
        let start_date = errors.optional_timestamp("startDate", self.start_date.as_deref());
        let end_date = errors.optional_timestamp("endDate", self.end_date.as_deref());
        let destination = patch_text(
            &mut errors,
            "destination",
            self.destination.as_ref().map(Option::as_deref),
            PLACE_MAX,
        );
        let status = errors.optional_choice::<LeaveStatus>("status", self.status.as_deref());
        let remarks = patch_text(
            &mut errors,
            "remarks",
            self.remarks.as_ref().map(Option::as_deref),
            TEXT_MAX,
        );
        errors.date_order(start_date.flatten(), end_date.flatten());
        match (leave_type, reason, start_date, end_date, destination, status, remarks) {
            (
                Some(leave_type),
                Some(reason),
                Some(start_date),
                Some(end_date),
                Some(destination),
                Some(status),
                Some(remarks),
            ) if errors.is_empty() => Ok(LeavePatch {
                leave_type,
                reason,
                start_date,
                end_date,
                destination,
                status,
                remarks,
                expected_revision: self.expected_revision,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// List leave requests visible to the caller, or fetch one with `?id=`.
#[utoipa::path(
    get,
    path = "/api/v1/leave-requests",
    params(LeaveListQuery),
    responses(
        (status = 200, description = "A page of leave requests, or one request when `id` is given", body = LeaveRequestPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Request belongs to someone else", body = ErrorSchema),
        (status = 404, description = "No such request", body = ErrorSchema)
    ),
    tags = ["leave-requests"],
    operation_id = "listLeaveRequests"
)]
#[get("/leave-requests")]
pub async fn list_leave_requests(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<LeaveListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let principal = caller.principal();
    if query.id.is_some() {
        let id: LeaveRequestId = require_id(&IdQuery { id: query.id })?;
        let request = state.leave_requests_query.get(&principal, &id).await?;
        return Ok(HttpResponse::Ok().json(request));
    }
    let (criteria, page) = query.into_parts()?;
    let requests = state
        .leave_requests_query
        .list(&principal, criteria, page)
        .await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Request leave.
#[utoipa::path(
    post,
    path = "/api/v1/leave-requests",
    request_body = CreateLeaveRequest,
    responses(
        (status = 201, description = "Leave requested", body = LeaveRequestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only students request leave", body = ErrorSchema)
    ),
    tags = ["leave-requests"],
    operation_id = "createLeaveRequest"
)]
#[post("/leave-requests")]
pub async fn create_leave_request(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateLeaveRequest>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner().validate()?;
    let request = state.leave_requests.create(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(request))
}

/// Edit or decide a leave request.
#[utoipa::path(
    put,
    path = "/api/v1/leave-requests",
    params(("id" = String, Query, description = "Leave request identifier")),
    request_body = UpdateLeaveRequest,
    responses(
        (status = 200, description = "Leave request updated", body = LeaveRequestSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such request", body = ErrorSchema),
        (status = 409, description = "Revision mismatch or decision already made", body = ErrorSchema)
    ),
    tags = ["leave-requests"],
    operation_id = "updateLeaveRequest"
)]
#[put("/leave-requests")]
pub async fn update_leave_request(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateLeaveRequest>,
) -> ApiResult<HttpResponse> {
    let id: LeaveRequestId = require_id(&query)?;
    let patch = payload.into_inner().validate()?;
    let request = state
        .leave_requests
        .update(&caller.principal(), &id, patch)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Withdraw or remove a leave request.
#[utoipa::path(
    delete,
    path = "/api/v1/leave-requests",
    params(("id" = String, Query, description = "Leave request identifier")),
    responses(
        (status = 200, description = "Leave request deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such request", body = ErrorSchema)
    ),
    tags = ["leave-requests"],
    operation_id = "deleteLeaveRequest"
)]
#[delete("/leave-requests")]
pub async fn delete_leave_request(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: LeaveRequestId = require_id(&query)?;
    state.leave_requests.delete(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Leave request deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HostelWorld, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    fn inverted_dates_fail_validation() {
        let request = CreateLeaveRequest {
            leave_type: Some("home".to_owned()),
            reason: Some("Family visit".to_owned()),
            start_date: Some("2024-04-14".to_owned()),
            end_date: Some("2024-04-10".to_owned()),
            destination: None,
        };
        let err = request.validate().expect_err("inverted range");
        assert_eq!(err.message(), "End date must be after start date");
    }

    #[rstest]
    fn decisions_carry_remarks() {
        let request: UpdateLeaveRequest =
            serde_json::from_str(r#"{"status":"approved","remarks":"Travel safely"}"#)
                .expect("json");
        let patch = request.validate().expect("valid patch");
        assert_eq!(patch.status, Some(LeaveStatus::Approved));
        assert_eq!(patch.remarks, Some(Some("Travel safely".to_owned())));
        assert_eq!(patch.start_date, None);
    }

    #[rstest]
    #[actix_web::test]
    async fn roommates_cannot_read_each_others_leave() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let student = login_cookie(&app, &world.north_student.username).await;
        let roommate = login_cookie(&app, &world.north_roommate.username).await;
        let warden = login_cookie(&app, &world.north_warden.username).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/leave-requests")
                .cookie(student)
                .set_json(json!({
                    "type": "home",
                    "reason": "Family visit",
                    "startDate": "2024-04-10",
                    "endDate": "2024-04-14"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["studentId"], world.north_student.id.to_string());
        assert_eq!(created["hostelId"], world.north.id.to_string());
        let uri = format!(
            "/api/v1/leave-requests?id={}",
            created["id"].as_str().expect("leave id")
        );

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).cookie(roommate).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(&uri).cookie(warden).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }
}
