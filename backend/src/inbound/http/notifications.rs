//! Notification endpoints.
//!
//! ```text
//! GET    /api/v1/notifications?category&unread&page&limit
//! GET    /api/v1/notifications?id=<uuid>
//! POST   /api/v1/notifications
//! PUT    /api/v1/notifications?id=<uuid>     {"read": true}
//! POST   /api/v1/notifications/mark-all-read
//! DELETE /api/v1/notifications?id=<uuid>
//! ```
//!
//! Read state is per viewer, so responses carry a `read` flag for the caller
//! rather than the full set of readers.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    FieldErrors, HostelId, NewNotification, Notification, NotificationCategory,
    NotificationCriteria, NotificationId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{ErrorSchema, MessageSchema, NotificationPageSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IdQuery, TEXT_MAX, TITLE_MAX, optional_flag, optional_id, page_request, rejected, require_id,
};

/// A notification as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    #[schema(value_type = String)]
    pub id: NotificationId,
    /// Direct recipient; `null` for broadcasts.
    #[schema(value_type = Option<String>)]
    pub user_id: Option<UserId>,
    /// Target hostel; `null` for broadcasts to everyone.
    #[schema(value_type = Option<String>)]
    pub hostel_id: Option<HostelId>,
    #[schema(example = "Water outage")]
    pub title: String,
    pub message: String,
    #[schema(value_type = String, example = "announcement")]
    pub category: NotificationCategory,
    #[schema(value_type = String)]
    pub created_by: UserId,
    /// Whether the caller has read it.
    pub read: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl NotificationResponse {
    fn for_viewer(notification: Notification, viewer: &UserId) -> Self {
        let read = notification.is_read_by(viewer);
        Self {
            id: notification.id,
            user_id: notification.user_id,
            hostel_id: notification.hostel_id,
            title: notification.title,
            message: notification.message,
            category: notification.category,
            created_by: notification.created_by,
            read,
            created_at: notification.created_at,
        }
    }
}

/// Query parameters accepted by `GET /api/v1/notifications`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NotificationListQuery {
    /// Fetch a single notification instead of a page.
    pub id: Option<String>,
    pub category: Option<String>,
    /// `true` to list only unread notifications.
    pub unread: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Request body for `POST /api/v1/notifications`.
///
/// Set `userId` for a direct message, `hostelId` for a hostel broadcast, or
/// neither (admins only) for a broadcast to everyone.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotificationRequest {
    pub user_id: Option<String>,
    pub hostel_id: Option<String>,
    #[schema(example = "Water outage")]
    pub title: Option<String>,
    #[schema(example = "No water between 10:00 and 12:00.")]
    pub message: Option<String>,
    /// Defaults to `general`.
    pub category: Option<String>,
}

impl CreateNotificationRequest {
    fn validate(self) -> ApiResult<NewNotification> {
        let mut errors = FieldErrors::default();
        let user_id = optional_id::<UserId>(&mut errors, self.user_id.as_deref());
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let title = errors.required_text("title", self.title.as_deref(), TITLE_MAX);
        let message = errors.required_text("message", self.message.as_deref(), TEXT_MAX);
        let category = errors
            .optional_choice::<NotificationCategory>("category", self.category.as_deref());
        match (user_id, hostel_id, title, message, category) {
            (Some(user_id), Some(hostel_id), Some(title), Some(message), Some(category)) => {
                Ok(NewNotification {
                    user_id,
                    hostel_id,
                    title,
                    message,
                    category: category.unwrap_or_default(),
                })
            }
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `PUT /api/v1/notifications?id=`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ReadStateRequest {
    /// Defaults to `true`.
    #[serde(default = "default_read")]
    pub read: bool,
}

const fn default_read() -> bool {
    true
}

/// List notifications addressed to the caller, or fetch one with `?id=`.
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationListQuery),
    responses(
        (status = 200, description = "A page of notifications, or one notification when `id` is given", body = NotificationPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not addressed to the caller", body = ErrorSchema),
        (status = 404, description = "No such notification", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "listNotifications"
)]
#[get("/notifications")]
pub async fn list_notifications(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<NotificationListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let principal = caller.principal();
    let viewer = principal.user_id;
    if query.id.is_some() {
        let id: NotificationId = require_id(&IdQuery { id: query.id })?;
        let notification = state.notifications_query.get(&principal, &id).await?;
        return Ok(HttpResponse::Ok().json(NotificationResponse::for_viewer(notification, &viewer)));
    }

    let mut errors = FieldErrors::default();
    let category =
        errors.optional_choice::<NotificationCategory>("category", query.category.as_deref());
    let unread_only = optional_flag(&mut errors, "unread", query.unread.as_deref());
    let page = page_request(&mut errors, query.page.as_deref(), query.limit.as_deref());
    let (Some(category), Some(unread_only), Some(page)) = (category, unread_only, page) else {
        return Err(rejected(errors));
    };
    let notifications = state
        .notifications_query
        .list(
            &principal,
            NotificationCriteria {
                category,
                unread_only,
            },
            page,
        )
        .await?;
    Ok(HttpResponse::Ok()
        .json(notifications.map(|item| NotificationResponse::for_viewer(item, &viewer))))
}

/// Send a notification.
#[utoipa::path(
    post,
    path = "/api/v1/notifications",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Notification sent", body = NotificationResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Students cannot send notifications", body = ErrorSchema),
        (status = 404, description = "Recipient not found", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "createNotification"
)]
#[post("/notifications")]
pub async fn create_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateNotificationRequest>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner().validate()?;
    let principal = caller.principal();
    let notification = state.notifications.create(&principal, input).await?;
    Ok(HttpResponse::Created()
        .json(NotificationResponse::for_viewer(notification, &principal.user_id)))
}

/// Mark a notification read or unread for the caller.
#[utoipa::path(
    put,
    path = "/api/v1/notifications",
    params(("id" = String, Query, description = "Notification identifier")),
    request_body = ReadStateRequest,
    responses(
        (status = 200, description = "Read state updated", body = NotificationResponse),
        (status = 403, description = "Not addressed to the caller", body = ErrorSchema),
        (status = 404, description = "No such notification", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "updateNotification"
)]
#[put("/notifications")]
pub async fn update_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
    payload: web::Json<ReadStateRequest>,
) -> ApiResult<HttpResponse> {
    let id: NotificationId = require_id(&query)?;
    let principal = caller.principal();
    let notification = state
        .notifications
        .set_read(&principal, &id, payload.read)
        .await?;
    Ok(HttpResponse::Ok().json(NotificationResponse::for_viewer(notification, &principal.user_id)))
}

/// Mark every visible notification read for the caller.
#[utoipa::path(
    post,
    path = "/api/v1/notifications/mark-all-read",
    responses(
        (status = 200, description = "Number of notifications changed"),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "markAllNotificationsRead"
)]
#[post("/notifications/mark-all-read")]
pub async fn mark_all_read(
    state: web::Data<HttpState>,
    caller: Caller,
) -> ApiResult<HttpResponse> {
    let updated = state.notifications.mark_all_read(&caller.principal()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "All notifications marked as read",
        "updated": updated,
    })))
}

/// Delete a notification.
#[utoipa::path(
    delete,
    path = "/api/v1/notifications",
    params(("id" = String, Query, description = "Notification identifier")),
    responses(
        (status = 200, description = "Notification deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such notification", body = ErrorSchema)
    ),
    tags = ["notifications"],
    operation_id = "deleteNotification"
)]
#[delete("/notifications")]
pub async fn delete_notification(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: NotificationId = require_id(&query)?;
    state.notifications.delete(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Notification deleted successfully" })))
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
    fn read_defaults_to_true() {
        let body: ReadStateRequest = serde_json::from_str("{}").expect("json");
        assert!(body.read);
    }

    #[rstest]
    fn category_defaults_to_general() {
        let request = CreateNotificationRequest {
            title: Some("Hello".to_owned()),
            message: Some("Welcome back".to_owned()),
            ..CreateNotificationRequest::default()
        };
        let input = request.validate().expect("valid notification");
        assert_eq!(input.category, NotificationCategory::General);
        assert_eq!(input.user_id, None);
    }

    #[rstest]
    #[actix_web::test]
    async fn hostel_broadcast_reaches_residents_with_read_state() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let warden = login_cookie(&app, &world.north_warden.username).await;
        let student = login_cookie(&app, &world.north_student.username).await;
        let outsider = login_cookie(&app, &world.south_student.username).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notifications")
                .cookie(warden)
                .set_json(json!({
                    "title": "Water outage",
                    "message": "No water between 10:00 and 12:00.",
                    "category": "announcement"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = actix_test::read_body_json(res).await;
        assert_eq!(created["hostelId"], world.north.id.to_string());
        assert!(created.get("readBy").is_none());

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications?unread=true")
                .cookie(student.clone())
                .to_request(),
        )
        .await;
        let page: Value = actix_test::read_body_json(res).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["items"][0]["read"], false);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notifications/mark-all-read")
                .cookie(student.clone())
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["updated"], 1);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications?unread=true")
                .cookie(student)
                .to_request(),
        )
        .await;
        let page: Value = actix_test::read_body_json(res).await;
        assert_eq!(page["total"], 0);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/notifications")
                .cookie(outsider)
                .to_request(),
        )
        .await;
        let page: Value = actix_test::read_body_json(res).await;
        assert_eq!(page["total"], 0);
    }

    #[rstest]
    #[actix_web::test]
    async fn students_cannot_send_notifications() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let student = login_cookie(&app, &world.north_student.username).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/notifications")
                .cookie(student)
                .set_json(json!({ "title": "Hi", "message": "Everyone" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
