//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use hostel_backend::inbound::http::health::HealthState;
use server::{ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("loading server settings")?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), &settings).await?;
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome.wrap_err("running HTTP server")
}
