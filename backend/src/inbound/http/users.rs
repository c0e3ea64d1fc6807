//! Session and directory handlers.
//!
//! ```text
//! POST /api/v1/login {"username":"asha.n","password":"..."}
//! POST /api/v1/logout
//! GET  /api/v1/users/me
//! GET  /api/v1/hostels
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{Error, Hostel, LoginCredentials, LoginValidationError, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{ErrorSchema, HostelSchema, UserSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    let message = err.to_string();
    Error::invalid_request(message.clone()).with_details([message])
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (
            status = 200,
            description = "Login success",
            headers(("Set-Cookie" = String, description = "Session cookie")),
            body = UserSchema
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<User>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let user = state.login.authenticate(&credentials).await?;
    session.persist_user(&user.id)?;
    info!(user_id = %user.id, role = %user.role, "session established");
    Ok(web::Json(user))
}

/// End the current session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// Profile of the authenticated caller.
#[utoipa::path(
    get,
    path = "/api/v1/users/me",
    responses(
        (status = 200, description = "Caller profile", body = UserSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users/me")]
pub async fn current_user(caller: Caller) -> web::Json<User> {
    web::Json(caller.into_user())
}

/// Every hostel, ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/hostels",
    responses(
        (status = 200, description = "Hostels", body = [HostelSchema]),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "listHostels"
)]
#[get("/hostels")]
pub async fn list_hostels(
    state: web::Data<HttpState>,
    _caller: Caller,
) -> ApiResult<web::Json<Vec<Hostel>>> {
    Ok(web::Json(state.profile.list_hostels().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HostelWorld, PASSWORD, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case("   ", "pw", "username must not be empty")]
    #[case("asha.n", "", "password must not be empty")]
    #[actix_web::test]
    async fn login_rejects_blank_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] message: &str,
    ) {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": username, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], message);
        assert_eq!(body["code"], "invalid_request");
    }

    #[rstest]
    #[case("asha.n", "wrong-password")]
    #[case("nobody", PASSWORD)]
    #[actix_web::test]
    async fn login_rejects_bad_credentials_alike(#[case] username: &str, #[case] password: &str) {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({ "username": username, "password": password }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "invalid credentials");
    }

    #[rstest]
    #[actix_web::test]
    async fn login_then_me_returns_profile() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let cookie = login_cookie(&app, &world.north_student.username).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/users/me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["id"], world.north_student.id.to_string());
        assert_eq!(body["role"], "student");
        assert_eq!(body["hostelId"], world.north.id.to_string());
        assert_eq!(body["roomNumber"], "N-101");
        assert!(body.get("passwordDigest").is_none());
    }

    #[rstest]
    #[actix_web::test]
    async fn hostels_require_a_session() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/hostels").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let cookie = login_cookie(&app, &world.south_student.username).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/hostels")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        let names: Vec<&str> = body
            .as_array()
            .expect("hostel array")
            .iter()
            .filter_map(|hostel| hostel["name"].as_str())
            .collect();
        assert_eq!(names, ["North Hall", "South Hall"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn logout_expires_the_cookie() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(world.app()).await;
        let cookie = login_cookie(&app, &world.admin.username).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/logout")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        let removal = res
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("removal cookie");
        assert_eq!(removal.value(), "");
    }
}
