//! Complaint endpoints.
//!
//! ```text
//! GET    /api/v1/complaints?status&category&priority&hostelId&page&limit
//! GET    /api/v1/complaints?id=<uuid>
//! POST   /api/v1/complaints
//! PUT    /api/v1/complaints?id=<uuid>
//! DELETE /api/v1/complaints?id=<uuid>
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ComplaintCategory, ComplaintCriteria, ComplaintId, ComplaintPatch, ComplaintPriority,
    ComplaintStatus, FieldErrors, HostelId, NewComplaint, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{
    ComplaintPageSchema, ComplaintSchema, ErrorSchema, MessageSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IdQuery, PLACE_MAX, TEXT_MAX, TITLE_MAX, nullable, optional_id, page_request, patch_text,
    rejected, require_id,
};

/// Query parameters accepted by `GET /api/v1/complaints`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ComplaintListQuery {
    /// Fetch a single complaint instead of a page.
    pub id: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    /// Hostel to list; ignored for hostel-bound callers.
    pub hostel_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ComplaintListQuery {
    fn into_parts(self) -> ApiResult<(ComplaintCriteria, PageRequest)> {
        let mut errors = FieldErrors::default();
        let status = errors.optional_choice::<ComplaintStatus>("status", self.status.as_deref());
        let category =
            errors.optional_choice::<ComplaintCategory>("category", self.category.as_deref());
        let priority =
            errors.optional_choice::<ComplaintPriority>("priority", self.priority.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let page = page_request(&mut errors, self.page.as_deref(), self.limit.as_deref());
        match (status, category, priority, hostel_id, page) {
            (Some(status), Some(category), Some(priority), Some(hostel_id), Some(page)) => Ok((
                ComplaintCriteria {
                    hostel_id,
                    status,
                    category,
                    priority,
                },
                page,
            )),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `POST /api/v1/complaints`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComplaintRequest {
    #[schema(example = "Leaking tap")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "plumbing")]
    pub category: Option<String>,
    /// Defaults to `medium`.
    #[schema(example = "high")]
    pub priority: Option<String>,
    /// Required for admins; residents always file in their own hostel.
    pub hostel_id: Option<String>,
    /// Defaults to the caller's room.
    pub room_number: Option<String>,
}

impl CreateComplaintRequest {
    fn validate(self) -> ApiResult<NewComplaint> {
        let mut errors = FieldErrors::default();
        let title = errors.required_text("title", self.title.as_deref(), TITLE_MAX);
        let description =
            errors.required_text("description", self.description.as_deref(), TEXT_MAX);
        let category =
            errors.required_choice::<ComplaintCategory>("category", self.category.as_deref());
        let priority =
            errors.optional_choice::<ComplaintPriority>("priority", self.priority.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let room_number =
            errors.optional_text("roomNumber", self.room_number.as_deref(), PLACE_MAX);
        match (title, description, category, priority, hostel_id, room_number) {
            (
                Some(title),
                Some(description),
                Some(category),
                Some(priority),
                Some(hostel_id),
                Some(room_number),
            ) => Ok(NewComplaint {
                title,
                description,
                category,
                priority: priority.unwrap_or_default(),
                hostel_id,
                room_number,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `PUT /api/v1/complaints?id=`.
///
/// Residents edit the content while the complaint is pending. Staff move the
/// status, assign and record a resolution.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComplaintRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub room_number: Option<Option<String>>,
    #[schema(example = "in-progress")]
    pub status: Option<String>,
    /// Staff member handling the complaint; `null` unassigns.
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub resolution: Option<Option<String>>,
    /// Revision the client last saw; a mismatch yields 409.
    pub expected_revision: Option<u32>,
}

impl UpdateComplaintRequest {
    fn validate(self) -> ApiResult<ComplaintPatch> {
        let mut errors = FieldErrors::default();
        let title = match self.title.as_deref() {
            None => Some(None),
            raw => errors.required_text("title", raw, TITLE_MAX).map(Some),
        };
        let description = match self.description.as_deref() {
            None => Some(None),
            raw => errors.required_text("description", raw, TEXT_MAX).map(Some),
        };
        let category =
            errors.optional_choice::<ComplaintCategory>("category", self.category.as_deref());
        let priority =
            errors.optional_choice::<ComplaintPriority>("priority", self.priority.as_deref());
        let room_number = patch_text(
            &mut errors,
            "roomNumber",
            self.room_number.as_ref().map(Option::as_deref),
            PLACE_MAX,
        );
        let status = errors.optional_choice::<ComplaintStatus>("status", self.status.as_deref());
        let assigned_to = match self.assigned_to.as_ref().map(Option::as_deref) {
            None => Some(None),
            Some(raw) => optional_id::<UserId>(&mut errors, raw).map(Some),
        };
        let resolution = patch_text(
            &mut errors,
            "resolution",
            self.resolution.as_ref().map(Option::as_deref),
            TEXT_MAX,
        );
        match (
            title,
            description,
            category,
            priority,
            room_number,
            status,
            assigned_to,
            resolution,
        ) {
            (
                Some(title),
                Some(description),
                Some(category),
                Some(priority),
                Some(room_number),
                Some(status),
                Some(assigned_to),
                Some(resolution),
            ) => Ok(ComplaintPatch {
                title,
                description,
                category,
                priority,
                room_number,
                status,
                assigned_to,
                resolution,
                expected_revision: self.expected_revision,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// List complaints visible to the caller, or fetch one with `?id=`.
#[utoipa::path(
    get,
    path = "/api/v1/complaints",
    params(ComplaintListQuery),
    responses(
        (status = 200, description = "A page of complaints, or one complaint when `id` is given", body = ComplaintPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Complaint belongs to another hostel", body = ErrorSchema),
        (status = 404, description = "No such complaint", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "listComplaints"
)]
#[get("/complaints")]
pub async fn list_complaints(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<ComplaintListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let principal = caller.principal();
    if query.id.is_some() {
        let id: ComplaintId = require_id(&IdQuery { id: query.id })?;
        let complaint = state.complaints_query.get(&principal, &id).await?;
        return Ok(HttpResponse::Ok().json(complaint));
    }
    let (criteria, page) = query.into_parts()?;
    let complaints = state.complaints_query.list(&principal, criteria, page).await?;
    Ok(HttpResponse::Ok().json(complaints))
}

/// File a complaint.
#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    request_body = CreateComplaintRequest,
    responses(
        (status = 201, description = "Complaint filed", body = ComplaintSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "createComplaint"
)]
#[post("/complaints")]
pub async fn create_complaint(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateComplaintRequest>,
) -> ApiResult<HttpResponse> {
    let mut input = payload.into_inner().validate()?;
    if input.room_number.is_none() {
        input.room_number.clone_from(&caller.user().room_number);
    }
    let complaint = state.complaints.create(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(complaint))
}

/// Partially update a complaint or move its status.
#[utoipa::path(
    put,
    path = "/api/v1/complaints",
    params(("id" = String, Query, description = "Complaint identifier")),
    request_body = UpdateComplaintRequest,
    responses(
        (status = 200, description = "Complaint updated", body = ComplaintSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such complaint", body = ErrorSchema),
        (status = 409, description = "Revision mismatch or invalid status change", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "updateComplaint"
)]
#[put("/complaints")]
pub async fn update_complaint(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateComplaintRequest>,
) -> ApiResult<HttpResponse> {
    let id: ComplaintId = require_id(&query)?;
    let patch = payload.into_inner().validate()?;
    let complaint = state.complaints.update(&caller.principal(), &id, patch).await?;
    Ok(HttpResponse::Ok().json(complaint))
}

/// Delete a complaint.
#[utoipa::path(
    delete,
    path = "/api/v1/complaints",
    params(("id" = String, Query, description = "Complaint identifier")),
    responses(
        (status = 200, description = "Complaint deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such complaint", body = ErrorSchema)
    ),
    tags = ["complaints"],
    operation_id = "deleteComplaint"
)]
#[delete("/complaints")]
pub async fn delete_complaint(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: ComplaintId = require_id(&query)?;
    state.complaints.delete(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Complaint deleted successfully" })))
}
