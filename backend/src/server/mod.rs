//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerSettings;
pub use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use hostel_backend::Trace;
#[cfg(debug_assertions)]
use hostel_backend::doc::ApiDoc;
use hostel_backend::inbound::http::configure_api;
use hostel_backend::inbound::http::health::{HealthState, live, ready};
use hostel_backend::inbound::http::session_config::{BuildMode, SessionSettings, session_settings};
use hostel_backend::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    session: SessionSettings,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        session,
    } = deps;

    let api = web::scope("/api/v1")
        .wrap(session.middleware())
        .configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Validate settings, build adapters and bind the HTTP server.
///
/// # Errors
/// Fails on invalid session or bind settings, on adapter initialisation
/// errors and when the socket cannot be bound.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    settings: &ServerSettings,
) -> Result<Server> {
    let session: SessionSettings = session_settings(
        &settings.session_toggles(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("validating session settings")?;
    info!(fingerprint = %session.fingerprint(), "session key loaded");
    let bind_addr = settings.bind_addr()?;
    let http_state = web::Data::new(build_http_state(settings).await?);

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            session: session.clone(),
        })
    })
    .bind(bind_addr)
    .wrap_err_with(|| format!("binding {bind_addr}"))?
    .run();

    info!(%bind_addr, "hostel backend listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::cookie::{Key, SameSite};
    use hostel_backend::test_support::HostelWorld;
    use rstest::rstest;

    fn deps(world: &HostelWorld) -> AppDependencies {
        let health_state = web::Data::new(HealthState::new());
        health_state.mark_ready();
        AppDependencies {
            health_state,
            http_state: world.state.clone(),
            session: SessionSettings {
                key: Key::generate(),
                cookie_secure: false,
                same_site: SameSite::Lax,
            },
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn probes_sit_outside_the_api_scope() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(build_app(deps(&world))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn every_response_carries_a_trace_id() {
        let world = HostelWorld::new();
        let app = actix_test::init_service(build_app(deps(&world))).await;
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/api/v1/events").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("trace-id"));
    }
}
