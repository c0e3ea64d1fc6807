//! Mess endpoints: menus, attendance and feedback.
//!
//! ```text
//! GET    /api/v1/mess/menu?date&from&to&meal&hostelId&page&limit
//! GET    /api/v1/mess/menu?id=<uuid>
//! POST   /api/v1/mess/menu
//! PUT    /api/v1/mess/menu?id=<uuid>
//! DELETE /api/v1/mess/menu?id=<uuid>
//! GET    /api/v1/mess/attendance?date&meal&studentId&hostelId&page&limit
//! POST   /api/v1/mess/attendance
//! DELETE /api/v1/mess/attendance?id=<uuid>
//! GET    /api/v1/mess/feedback?meal&hostelId&page&limit
//! POST   /api/v1/mess/feedback
//! DELETE /api/v1/mess/feedback?id=<uuid>
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    AttendanceId, FeedbackId, FieldErrors, HostelId, Meal, MessAttendanceCriteria,
    MessFeedbackCriteria, MessMenuCriteria, MessMenuId, MessMenuPatch, NewMessAttendance,
    NewMessFeedback, NewMessMenu, Rating, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{
    ErrorSchema, MessAttendancePageSchema, MessAttendanceSchema, MessFeedbackPageSchema,
    MessFeedbackSchema, MessMenuPageSchema, MessMenuSchema, MessageSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    IdQuery, TEXT_MAX, TITLE_MAX, optional_id, page_request, rejected, require_id,
};

/// Trim dishes and drop blank entries.
fn dishes(errors: &mut FieldErrors, raw: Vec<String>) -> Option<Vec<String>> {
    let mut items = Vec::with_capacity(raw.len());
    let mut valid = true;
    for item in raw {
        match errors.optional_text("items", Some(&item), TITLE_MAX) {
            Some(Some(dish)) => items.push(dish),
            Some(None) => {}
            None => valid = false,
        }
    }
    valid.then_some(items)
}

fn rating(errors: &mut FieldErrors, raw: Option<i64>) -> Option<Rating> {
    let Some(value) = raw else {
        errors.push("rating is required");
        return None;
    };
    errors.check(
        u8::try_from(value)
            .ok()
            .and_then(|score| Rating::new(score).ok())
            .ok_or_else(|| {
                format!(
                    "rating must be between {} and {}",
                    Rating::MIN,
                    Rating::MAX
                )
            }),
    )
}

/// Query parameters accepted by `GET /api/v1/mess/menu`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MenuListQuery {
    /// Fetch a single menu instead of a page.
    pub id: Option<String>,
    /// Exact day, `YYYY-MM-DD`.
    pub date: Option<String>,
    /// First day of a range.
    pub from: Option<String>,
    /// Last day of a range.
    pub to: Option<String>,
    pub meal: Option<String>,
    pub hostel_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Request body for `POST /api/v1/mess/menu`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuRequest {
    /// Admins choose the hostel or leave it empty for every hostel.
    pub hostel_id: Option<String>,
    #[schema(example = "2024-03-15")]
    pub date: Option<String>,
    #[schema(example = "lunch")]
    pub meal: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

impl CreateMenuRequest {
    fn validate(self) -> ApiResult<NewMessMenu> {
        let mut errors = FieldErrors::default();
        let hostel_id = optional_id::<HostelId>(&mut errors, self.hostel_id.as_deref());
        let date = errors.required_day("date", self.date.as_deref());
        let meal = errors.required_choice::<Meal>("meal", self.meal.as_deref());
        let items = dishes(&mut errors, self.items);
        match (hostel_id, date, meal, items) {
            (Some(hostel_id), Some(date), Some(meal), Some(items)) => Ok(NewMessMenu {
                hostel_id,
                date,
                meal,
                items,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Request body for `PUT /api/v1/mess/menu?id=`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuRequest {
    pub date: Option<String>,
    pub meal: Option<String>,
    /// Replaces the whole dish list when present.
    pub items: Option<Vec<String>>,
    /// Revision the client last saw; a mismatch yields 409.
    pub expected_revision: Option<u32>,
}

impl UpdateMenuRequest {
    fn validate(self) -> ApiResult<MessMenuPatch> {
        let mut errors = FieldErrors::default();
        let date = errors.optional_day("date", self.date.as_deref());
        let meal = errors.optional_choice::<Meal>("meal", self.meal.as_deref());
        let items = match self.items {
            None => Some(None),
            Some(raw) => dishes(&mut errors, raw).map(Some),
        };
        match (date, meal, items) {
            (Some(date), Some(meal), Some(items)) => Ok(MessMenuPatch {
                date,
                meal,
                items,
                expected_revision: self.expected_revision,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Query parameters accepted by `GET /api/v1/mess/attendance`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceListQuery {
    pub date: Option<String>,
    pub meal: Option<String>,
    /// Ignored for students, who only see their own marks.
    pub student_id: Option<String>,
    pub hostel_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Request body for `POST /api/v1/mess/attendance`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    /// Required for staff; students always mark themselves.
    pub student_id: Option<String>,
    pub date: Option<String>,
    pub meal: Option<String>,
    /// Defaults to `true`.
    pub present: Option<bool>,
}

impl MarkAttendanceRequest {
    fn validate(self) -> ApiResult<NewMessAttendance> {
        let mut errors = FieldErrors::default();
        let student_id = optional_id::<UserId>(&mut errors, self.student_id.as_deref());
        let date = errors.required_day("date", self.date.as_deref());
        let meal = errors.required_choice::<Meal>("meal", self.meal.as_deref());
        match (student_id, date, meal) {
            (Some(student_id), Some(date), Some(meal)) => Ok(NewMessAttendance {
                student_id,
                date,
                meal,
                present: self.present.unwrap_or(true),
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// Query parameters accepted by `GET /api/v1/mess/feedback`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FeedbackListQuery {
    pub meal: Option<String>,
    pub hostel_id: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Request body for `POST /api/v1/mess/feedback`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    /// Defaults to today.
    pub date: Option<String>,
    pub meal: Option<String>,
    #[schema(minimum = 1, maximum = 5, example = 4)]
    pub rating: Option<i64>,
    pub comment: Option<String>,
}

impl SubmitFeedbackRequest {
    fn validate(self, today: NaiveDate) -> ApiResult<NewMessFeedback> {
        let mut errors = FieldErrors::default();
        let date = errors.optional_day("date", self.date.as_deref());
        let meal = errors.optional_choice::<Meal>("meal", self.meal.as_deref());
        let rating = rating(&mut errors, self.rating);
        let comment = errors.optional_text("comment", self.comment.as_deref(), TEXT_MAX);
        match (date, meal, rating, comment) {
            (Some(date), Some(meal), Some(rating), Some(comment)) => Ok(NewMessFeedback {
                date: date.unwrap_or(today),
                meal,
                rating,
                comment,
            }),
            _ => Err(rejected(errors)),
        }
    }
}

/// List menus, or fetch one with `?id=`.
#[utoipa::path(
    get,
    path = "/api/v1/mess/menu",
    params(MenuListQuery),
    responses(
        (status = 200, description = "A page of menus, or one menu when `id` is given", body = MessMenuPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "No such menu", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "listMessMenus"
)]
#[get("/mess/menu")]
pub async fn list_menus(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<MenuListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let principal = caller.principal();
    if query.id.is_some() {
        let id: MessMenuId = require_id(&IdQuery { id: query.id })?;
        let menu = state.mess_query.get_menu(&principal, &id).await?;
        return Ok(HttpResponse::Ok().json(menu));
    }

    let mut errors = FieldErrors::default();
    let date = errors.optional_day("date", query.date.as_deref());
    let from = errors.optional_day("from", query.from.as_deref());
    let to = errors.optional_day("to", query.to.as_deref());
    let meal = errors.optional_choice::<Meal>("meal", query.meal.as_deref());
    let hostel_id = optional_id::<HostelId>(&mut errors, query.hostel_id.as_deref());
    let page = page_request(&mut errors, query.page.as_deref(), query.limit.as_deref());
    let (Some(date), Some(from), Some(to), Some(meal), Some(hostel_id), Some(page)) =
        (date, from, to, meal, hostel_id, page)
    else {
        return Err(rejected(errors));
    };
    let criteria = MessMenuCriteria {
        hostel_id,
        date,
        from,
        to,
        meal,
    };
    let menus = state.mess_query.list_menus(&principal, criteria, page).await?;
    Ok(HttpResponse::Ok().json(menus))
}

/// Publish a menu.
#[utoipa::path(
    post,
    path = "/api/v1/mess/menu",
    request_body = CreateMenuRequest,
    responses(
        (status = 201, description = "Menu published", body = MessMenuSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Students cannot publish menus", body = ErrorSchema),
        (status = 409, description = "A menu already exists for that slot", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "createMessMenu"
)]
#[post("/mess/menu")]
pub async fn create_menu(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<CreateMenuRequest>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner().validate()?;
    let menu = state.mess.create_menu(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(menu))
}

/// Edit a menu.
#[utoipa::path(
    put,
    path = "/api/v1/mess/menu",
    params(("id" = String, Query, description = "Menu identifier")),
    request_body = UpdateMenuRequest,
    responses(
        (status = 200, description = "Menu updated", body = MessMenuSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such menu", body = ErrorSchema),
        (status = 409, description = "Revision mismatch or slot taken", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "updateMessMenu"
)]
#[put("/mess/menu")]
pub async fn update_menu(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
    payload: web::Json<UpdateMenuRequest>,
) -> ApiResult<HttpResponse> {
    let id: MessMenuId = require_id(&query)?;
    let patch = payload.into_inner().validate()?;
    let menu = state.mess.update_menu(&caller.principal(), &id, patch).await?;
    Ok(HttpResponse::Ok().json(menu))
}

/// Delete a menu.
#[utoipa::path(
    delete,
    path = "/api/v1/mess/menu",
    params(("id" = String, Query, description = "Menu identifier")),
    responses(
        (status = 200, description = "Menu deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such menu", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "deleteMessMenu"
)]
#[delete("/mess/menu")]
pub async fn delete_menu(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: MessMenuId = require_id(&query)?;
    state.mess.delete_menu(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Menu deleted successfully" })))
}

/// List attendance marks visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/mess/attendance",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "A page of attendance marks", body = MessAttendancePageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "listMessAttendance"
)]
#[get("/mess/attendance")]
pub async fn list_attendance(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<AttendanceListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let mut errors = FieldErrors::default();
    let date = errors.optional_day("date", query.date.as_deref());
    let meal = errors.optional_choice::<Meal>("meal", query.meal.as_deref());
    let student_id = optional_id::<UserId>(&mut errors, query.student_id.as_deref());
    let hostel_id = optional_id::<HostelId>(&mut errors, query.hostel_id.as_deref());
    let page = page_request(&mut errors, query.page.as_deref(), query.limit.as_deref());
    let (Some(date), Some(meal), Some(student_id), Some(hostel_id), Some(page)) =
        (date, meal, student_id, hostel_id, page)
    else {
        return Err(rejected(errors));
    };
    let criteria = MessAttendanceCriteria {
        hostel_id,
        student_id,
        date,
        meal,
    };
    let marks = state
        .mess_query
        .list_attendance(&caller.principal(), criteria, page)
        .await?;
    Ok(HttpResponse::Ok().json(marks))
}

/// Record attendance for a meal.
#[utoipa::path(
    post,
    path = "/api/v1/mess/attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = MessAttendanceSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 409, description = "Already recorded for that meal", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "markMessAttendance"
)]
#[post("/mess/attendance")]
pub async fn mark_attendance(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<MarkAttendanceRequest>,
) -> ApiResult<HttpResponse> {
    let input = payload.into_inner().validate()?;
    let mark = state.mess.mark_attendance(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(mark))
}

/// Delete an attendance mark.
#[utoipa::path(
    delete,
    path = "/api/v1/mess/attendance",
    params(("id" = String, Query, description = "Attendance identifier")),
    responses(
        (status = 200, description = "Attendance deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such attendance mark", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "deleteMessAttendance"
)]
#[delete("/mess/attendance")]
pub async fn delete_attendance(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: AttendanceId = require_id(&query)?;
    state.mess.delete_attendance(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Attendance record deleted successfully" })))
}

/// List feedback visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/mess/feedback",
    params(FeedbackListQuery),
    responses(
        (status = 200, description = "A page of feedback", body = MessFeedbackPageSchema),
        (status = 400, description = "Invalid filters", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "listMessFeedback"
)]
#[get("/mess/feedback")]
pub async fn list_feedback(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<FeedbackListQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();
    let mut errors = FieldErrors::default();
    let meal = errors.optional_choice::<Meal>("meal", query.meal.as_deref());
    let hostel_id = optional_id::<HostelId>(&mut errors, query.hostel_id.as_deref());
    let page = page_request(&mut errors, query.page.as_deref(), query.limit.as_deref());
    let (Some(meal), Some(hostel_id), Some(page)) = (meal, hostel_id, page) else {
        return Err(rejected(errors));
    };
    let feedback = state
        .mess_query
        .list_feedback(&caller.principal(), MessFeedbackCriteria { hostel_id, meal }, page)
        .await?;
    Ok(HttpResponse::Ok().json(feedback))
}

/// Rate a meal.
#[utoipa::path(
    post,
    path = "/api/v1/mess/feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = MessFeedbackSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 403, description = "Only students leave feedback", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "submitMessFeedback"
)]
#[post("/mess/feedback")]
pub async fn submit_feedback(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: web::Json<SubmitFeedbackRequest>,
) -> ApiResult<HttpResponse> {
    let today = chrono::Utc::now().date_naive();
    let input = payload.into_inner().validate(today)?;
    let feedback = state.mess.submit_feedback(&caller.principal(), input).await?;
    Ok(HttpResponse::Created().json(feedback))
}

/// Delete feedback.
#[utoipa::path(
    delete,
    path = "/api/v1/mess/feedback",
    params(("id" = String, Query, description = "Feedback identifier")),
    responses(
        (status = 200, description = "Feedback deleted", body = MessageSchema),
        (status = 403, description = "Not permitted", body = ErrorSchema),
        (status = 404, description = "No such feedback", body = ErrorSchema)
    ),
    tags = ["mess"],
    operation_id = "deleteMessFeedback"
)]
#[delete("/mess/feedback")]
pub async fn delete_feedback(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: FeedbackId = require_id(&query)?;
    state.mess.delete_feedback(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Feedback deleted successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HostelWorld, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::Value;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date")
    }

    #[rstest]
    fn blank_dishes_are_dropped() {
        let request = CreateMenuRequest {
            date: Some("2024-03-15".to_owned()),
            meal: Some("lunch".to_owned()),
            items: vec![" Dal ".to_owned(), "  ".to_owned(), "Rice".to_owned()],
            ..CreateMenuRequest::default()
        };
        let input = request.validate().expect("valid menu");
        assert_eq!(input.items, ["Dal", "Rice"]);
    }

    #[rstest]
    #[case(Some(0), "rating must be between 1 and 5")]
    #[case(Some(6), "rating must be between 1 and 5")]
    #[case(Some(-3), "rating must be between 1 and 5")]
    #[case(None, "rating is required")]
    fn ratings_are_bounded(#[case] raw: Option<i64>, #[case] message: &str) {
        let request = SubmitFeedbackRequest {
            rating: raw,
            ..SubmitFeedbackRequest::default()
        };
        let err = request.validate(today()).expect_err("bad rating");
        assert_eq!(err.message(), message);
    }

    #[rstest]
    fn feedback_defaults_to_today() {
        let request = SubmitFeedbackRequest {
            rating: Some(4),
            ..SubmitFeedbackRequest::default()
        };
        let input = request.validate(today()).expect("valid feedback");
        assert_eq!(input.date, today());
        assert_eq!(input.rating.get(), 4);
    }

    #[rstest]
    fn attendance_defaults_to_present() {
        let request = MarkAttendanceRequest {
            date: Some("2024-03-15".to_owned()),
            meal: Some("dinner".to_owned()),
            ..MarkAttendanceRequest::default()
        };
        let input = request.validate().expect("valid mark");
        assert!(input.present);
        assert_eq!(input.meal, Meal::Dinner);
    }

    #[rstest]
    #[actix_web::test]
    async fn duplicate_menu_slots_conflict() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let warden = login_cookie(&app, &world.north_warden.username).await;
        let body = json!({ "date": "2024-03-15", "meal": "lunch", "items": ["Dal", "Rice"] });

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/mess/menu")
                .cookie(warden.clone())
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let menu: Value = actix_test::read_body_json(res).await;
        assert_eq!(menu["hostelId"], world.north.id.to_string());

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/mess/menu")
                .cookie(warden)
                .set_json(&body)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[rstest]
    #[actix_web::test]
    async fn students_see_only_their_own_attendance() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let student = login_cookie(&app, &world.north_student.username).await;
        let roommate = login_cookie(&app, &world.north_roommate.username).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/mess/attendance")
                .cookie(student)
                .set_json(json!({ "date": "2024-03-15", "meal": "breakfast" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/mess/attendance")
                .cookie(roommate)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: Value = actix_test::read_body_json(res).await;
        assert_eq!(page["total"], 0);
    }
}
