//! User preferences HTTP handlers.
//!
//! ```text
//! GET /api/v1/users/me/preferences
//! PUT /api/v1/users/me/preferences
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::UpdatePreferencesRequest;
use crate::domain::{FieldErrors, LanguageTag, PreferencesPatch, Theme, UserPreferences};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::rejected;

/// Request payload for updating user preferences. Absent keys keep their
/// stored value.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesRequest {
    pub email_notifications: Option<bool>,
    pub sms_notifications: Option<bool>,
    pub push_notifications: Option<bool>,
    /// One of `light`, `dark`, `system`.
    #[schema(example = "dark")]
    pub theme: Option<String>,
    #[schema(example = "en")]
    pub language: Option<String>,
    pub expected_revision: Option<u32>,
}

/// Response payload for user preferences.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferencesResponse {
    pub user_id: String,
    pub email_notifications: bool,
    pub sms_notifications: bool,
    pub push_notifications: bool,
    pub theme: String,
    pub language: String,
    pub revision: u32,
    pub updated_at: String,
}

impl From<UserPreferences> for UserPreferencesResponse {
    fn from(value: UserPreferences) -> Self {
        Self {
            user_id: value.user_id.to_string(),
            email_notifications: value.email_notifications,
            sms_notifications: value.sms_notifications,
            push_notifications: value.push_notifications,
            theme: value.theme.to_string(),
            language: value.language.as_str().to_owned(),
            revision: value.revision,
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

fn parse_preferences_request(payload: PreferencesRequest) -> ApiResult<PreferencesPatch> {
    let mut errors = FieldErrors::default();
    let theme = errors.optional_choice::<Theme>("theme", payload.theme.as_deref());
    let language = match payload.language.as_deref().map(str::trim) {
        None | Some("") => Some(None),
        Some(raw) => errors
            .check(LanguageTag::new(raw).map_err(|err| err.to_string()))
            .map(Some),
    };
    let (Some(theme), Some(language)) = (theme, language) else {
        return Err(rejected(errors));
    };
    Ok(PreferencesPatch {
        email_notifications: payload.email_notifications,
        sms_notifications: payload.sms_notifications,
        push_notifications: payload.push_notifications,
        theme,
        language,
        expected_revision: payload.expected_revision,
    })
}

/// Fetch the authenticated user's preferences.
#[utoipa::path(
    get,
    path = "/api/v1/users/me/preferences",
    description = "Fetch preferences, creating defaults if none exist.",
    responses(
        (
            status = 200,
            description = "User preferences",
            headers(("Cache-Control" = String, description = "Cache control header")),
            body = UserPreferencesResponse
        ),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUserPreferences"
)]
#[get("/users/me/preferences")]
pub async fn get_preferences(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let preferences = state.preferences_query.fetch_preferences(&user_id).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, must-revalidate, no-cache"))
        .json(UserPreferencesResponse::from(preferences)))
}

/// Update the authenticated user's preferences.
#[utoipa::path(
    put,
    path = "/api/v1/users/me/preferences",
    request_body = PreferencesRequest,
    responses(
        (status = 200, description = "Updated preferences", body = UserPreferencesResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 409, description = "Conflict", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateUserPreferences"
)]
#[put("/users/me/preferences")]
pub async fn update_preferences(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PreferencesRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let patch = parse_preferences_request(payload.into_inner())?;
    let preferences = state
        .preferences
        .update(UpdatePreferencesRequest { user_id, patch })
        .await?;
    Ok(HttpResponse::Ok().json(UserPreferencesResponse::from(preferences)))
}
