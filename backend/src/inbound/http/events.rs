//! Event endpoints.
//!
//! ```text
//! GET    /api/v1/events?startDate&endDate&type&hostelId&page&limit
//! GET    /api/v1/events?id=<uuid>
//! POST   /api/v1/events
//! PUT    /api/v1/events?id=<uuid>
//! DELETE /api/v1/events?id=<uuid>
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    EventCriteria, EventId, EventPatch, EventType, FieldErrors, HostelId, NewEvent,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{ErrorSchema, EventPageSchema, EventSchema, MessageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IdQuery, PLACE_MAX, TEXT_MAX, TITLE_MAX, nullable, optional_id, page_request, patch_text,
    rejected, require_id,
};

/// Query parameters accepted by `GET /api/v1/events`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// Fetch a single event instead of a page.
    pub id: Option<String>,
    /// Only events starting at or after this instant.
    pub start_date: Option<String>,
    /// Only events ending at or before this instant.
    pub end_date: Option<String>,
    /// Event kind.
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Hostel to list; ignored for hostel-bound callers.
    pub hostel_id: Option<String>,
    /// One-based page number.
    pub page: Option<String>,
    /// Page size, at most 100.
    pub limit: Option<String>,
}

impl EventListQuery {
    fn into_parts(self) -> ApiResult<(EventCriteria, PageRequest)> {
        let mut errors = FieldErrors::default();
        let starts_from = errors.optional_timestamp("startDate", self.start_date.as_deref());
        let ends_by = errors.optional_timestamp("endDate", self.end_date.as_deref());
        let event_type = errors.optional_choice::<EventType>("type", self.event_type.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let page = page_request(&mut errors, self.page.as_deref(), self.limit.as_deref());
        match (starts_from, ends_by, event_type, hostel_id, page) {
            (Some(starts_from), Some(ends_by), Some(event_type), Some(hostel_id), Some(page)) => {
                Ok((
                    EventCriteria {
                        hostel_id,
                        starts_from,
                        ends_by,
                        event_type,
                    },
                    page,
                ))
            }
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `POST /api/v1/events`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[schema(example = "Movie night")]
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(example = "2024-02-01T18:00")]
    pub start_date: Option<String>,
    #[schema(example = "2024-02-01T21:00")]
    pub end_date: Option<String>,
    pub location: Option<String>,
    /// Defaults to `other`.
    #[serde(rename = "type")]
    #[schema(example = "cultural")]
    pub event_type: Option<String>,
    /// Admins choose the hostel; wardens and students always post to their own.
    pub hostel_id: Option<String>,
}

impl CreateEventRequest {
    fn validate(self) -> ApiResult<NewEvent> {
        let mut errors = FieldErrors::default();
        let title = errors.required_text("title", self.title.as_deref(), TITLE_MAX);
        let description = errors.optional_text("description", self.description.as_deref(), TEXT_MAX);
        let start_date = errors.required_timestamp("startDate", self.start_date.as_deref());
        let end_date = errors.required_timestamp("endDate", self.end_date.as_deref());
        let location = errors.optional_text("location", self.location.as_deref(), PLACE_MAX);
        let event_type = errors.optional_choice::<EventType>("type", self.event_type.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        errors.date_order(start_date, end_date);
        match (title, description, start_date, end_date, location, event_type, hostel_id) {
            (
                Some(title),
                Some(description),
                Some(start_date),
                Some(end_date),
                Some(location),
                Some(event_type),
                Some(hostel_id),
            ) if errors.is_empty() => Ok(NewEvent {
                title,
                description,
                start_date,
                end_date,
                location,
                event_type: event_type.unwrap_or_default(),
                hostel_id,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `PUT /api/v1/events?id=`.
///
/// Absent keys are left unchanged; `null` clears nullable fields.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<String>)]
    pub location: Option<Option<String>>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    /// Revision the client last saw; a mismatch yields 409.
    pub expected_revision: Option<u32>,
}

impl UpdateEventRequest {
    fn validate(self) -> ApiResult<EventPatch> {
        let mut errors = FieldErrors::default();
        let title = match self.title.as_deref() {
            None => Some(None),
            raw => errors.required_text("title", raw, TITLE_MAX).map(Some),
        };
        let description = patch_text(
            &mut errors,
            "description",
            self.description.as_ref().map(Option::as_deref),
            TEXT_MAX,
        );
        let start_date = errors.optional_timestamp("startDate", self.start_date.as_deref());
        let end_date = errors.optional_timestamp("endDate", self.end_date.as_deref());
        let location = patch_text(
            &mut errors,
            "location",
            self.location.as_ref().map(Option::as_deref),
            PLACE_MAX,
        );
        let event_type = errors.optional_choice::<EventType>("type", self.event_type.as_deref());
        errors.date_order(start_date.flatten(), end_date.flatten());
        match (title, description, start_date, end_date, location, event_type) {
            (
                Some(title),
                Some(description),
                Some(start_date),
                Some(end_date),
                Some(location),
                Some(event_type),
            ) if errors.is_empty() => Ok(EventPatch {
                title,
                description,
                start_date,
                end_date,
                location,
                event_type,
                expected_revision: self.expected_revision,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// List events visible to the caller, or fetch one with `?id=`.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "A page of events, or one event when `id` is given", body = EventPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Event belongs to another hostel", body = ErrorSchema),
        (status = 404, description = "No such event", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "listEvents"
)]
#[get("/events")]
pub async fn list_events(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<EventListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let principal = caller.principal();
    if query.id.is_some() {
        let id: EventId = require_id(&IdQuery { id: query.id })?;
        let event = state.events_query.get(&principal, &id).await?;
        return Ok(HttpResponse::Ok().json(event));
    }
    let (criteria, page) = query.into_parts()?;
    let events = state.events_query.list(&principal, criteria, page).await?;
    Ok(HttpResponse::Ok().json(events))
}

/// Create an event.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Students cannot create events", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "createEvent"
)]
#[post("/events")]
pub async fn create_event(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateEventRequest>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner().validate()?;
    let event = state.events.create(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(event))
}

/// Partially update an event.
#[utoipa::path(
    put,
    path = "/api/v1/events",
    params(("id" = String, Query, description = "Event identifier")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such event", body = ErrorSchema),
        (status = 409, description = "Revision mismatch", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "updateEvent"
)]
#[put("/events")]
pub async fn update_event(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateEventRequest>,
) -> ApiResult<HttpResponse> {
    let id: EventId = require_id(&query)?;
    let patch = payload.into_inner().validate()?;
    let event = state.events.update(&caller.principal(), &id, patch).await?;
    Ok(HttpResponse::Ok().json(event))
}

/// Delete an event.
#[utoipa::path(
    delete,
    path = "/api/v1/events",
    params(("id" = String, Query, description = "Event identifier")),
    responses(
        (status = 200, description = "Event deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such event", body = ErrorSchema)
    ),
    tags = ["events"],
    operation_id = "deleteEvent"
)]
#[delete("/events")]
pub async fn delete_event(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: EventId = require_id(&query)?;
    state.events.delete(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Event deleted successfully" })))
}
