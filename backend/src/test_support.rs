//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`,
//! through the `test-support` feature). [`HostelWorld`] seeds two hostels
//! with a warden and two students each, plus one admin, all sharing
//! [`PASSWORD`].

use std::sync::{Arc, LazyLock};

use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use mockable::DefaultClock;
use serde_json::json;

use crate::domain::ports::UserAccount;
use crate::domain::{Hostel, HostelId, PasswordDigest, Role, User, UserId};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::test_utils::test_session_middleware;
use crate::outbound::memory::MemoryUserDirectory;
use crate::wiring::in_memory;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct-horse-battery";

/// Digest of [`PASSWORD`], hashed once per test binary.
static SEEDED_DIGEST: LazyLock<PasswordDigest> = LazyLock::new(|| {
    PasswordDigest::derive(PASSWORD).expect("hashing the seed password succeeds")
});

/// Seeded users and hostels around an in-memory [`HttpState`].
pub struct HostelWorld {
    pub north: Hostel,
    pub south: Hostel,
    pub admin: User,
    pub north_warden: User,
    pub south_warden: User,
    pub north_student: User,
    pub north_roommate: User,
    pub south_student: User,
    pub state: web::Data<HttpState>,
}

fn person(username: &str, role: Role, hostel: Option<&Hostel>, room: Option<&str>) -> User {
    User {
        id: UserId::random(),
        username: username.to_owned(),
        display_name: username.replace('.', " "),
        role,
        hostel_id: hostel.map(|hostel| hostel.id),
        room_number: room.map(str::to_owned),
    }
}

fn hostel(name: &str) -> Hostel {
    Hostel {
        id: HostelId::random(),
        name: name.to_owned(),
        warden_id: None,
        capacity: 120,
    }
}

impl HostelWorld {
    /// Seed a fresh world with empty record tables.
    ///
    /// # Panics
    /// Panics when the seed password cannot be hashed.
    pub fn new() -> Self {
        let mut north = hostel("North Hall");
        let mut south = hostel("South Hall");
        let admin = person("admin", Role::Admin, None, None);
        let north_warden = person("north.warden", Role::Warden, Some(&north), None);
        let south_warden = person("south.warden", Role::Warden, Some(&south), None);
        let north_student = person("asha.n", Role::Student, Some(&north), Some("N-101"));
        let north_roommate = person("bilal.n", Role::Student, Some(&north), Some("N-102"));
        let south_student = person("chen.s", Role::Student, Some(&south), Some("S-201"));
        north.warden_id = Some(north_warden.id);
        south.warden_id = Some(south_warden.id);

        let accounts = [
            &admin,
            &north_warden,
            &south_warden,
            &north_student,
            &north_roommate,
            &south_student,
        ]
        .into_iter()
        .map(|user| UserAccount {
            user: user.clone(),
            password_digest: SEEDED_DIGEST.clone(),
        })
        .collect::<Vec<_>>();
        let directory = Arc::new(MemoryUserDirectory::with_records(
            accounts,
            [north.clone(), south.clone()],
        ));
        let state = web::Data::new(in_memory(directory, Arc::new(DefaultClock)));

        Self {
            north,
            south,
            admin,
            north_warden,
            south_warden,
            north_student,
            north_roommate,
            south_student,
            state,
        }
    }

    /// Application with sessions and every `/api/v1` route mounted.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(configure_api))
    }
}

impl Default for HostelWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Log `username` in and return the issued session cookie.
///
/// # Panics
/// Panics when the login is rejected.
pub async fn login_cookie(
    app: &impl Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    username: &str,
) -> Cookie<'static> {
    let req = test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "username": username, "password": PASSWORD }))
        .to_request();
    let res = test::call_service(app, req).await;
    assert!(
        res.status().is_success(),
        "login for {username} failed with {}",
        res.status()
    );
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}
