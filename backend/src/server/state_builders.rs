//! Builders for the HTTP state over PostgreSQL or in-memory adapters.

use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use hostel_backend::domain::IdentityService;
use hostel_backend::domain::ports::UserDirectory;
use hostel_backend::inbound::http::state::HttpState;
use hostel_backend::outbound::memory::MemoryUserDirectory;
use hostel_backend::outbound::persistence::{
    DbPool, DieselBackupRepository, DieselComplaintRepository, DieselEventRepository,
    DieselLeaveRequestRepository, DieselMessRepository, DieselNotificationRepository,
    DieselRecordSnapshotStore, DieselUserDirectory, DieselUserPreferencesRepository, PoolConfig,
    run_migrations,
};
use hostel_backend::wiring::{Adapters, assemble, in_memory};

use super::ServerSettings;

/// Create the bootstrap admin when credentials are configured.
async fn seed_admin<D: UserDirectory>(directory: Arc<D>, settings: &ServerSettings) -> Result<()> {
    let Some((username, password)) = settings.bootstrap_admin() else {
        return Ok(());
    };
    IdentityService::new(directory)
        .ensure_bootstrap_admin(username, password)
        .await
        .wrap_err("creating bootstrap admin")?;
    Ok(())
}

async fn build_postgres_state(
    database_url: &str,
    settings: &ServerSettings,
    clock: Arc<dyn Clock>,
) -> Result<HttpState> {
    run_migrations(database_url)
        .await
        .wrap_err("applying database migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .wrap_err("connecting to PostgreSQL")?;
    let directory = Arc::new(DieselUserDirectory::new(pool.clone()));
    seed_admin(Arc::clone(&directory), settings).await?;

    let mess = Arc::new(DieselMessRepository::new(pool.clone()));
    info!("using PostgreSQL adapters");
    Ok(assemble(Adapters {
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        complaints: Arc::new(DieselComplaintRepository::new(pool.clone())),
        leave_requests: Arc::new(DieselLeaveRequestRepository::new(pool.clone())),
        notifications: Arc::new(DieselNotificationRepository::new(pool.clone())),
        mess_menus: Arc::clone(&mess),
        mess_attendance: Arc::clone(&mess),
        mess_feedback: mess,
        snapshots: Arc::new(DieselRecordSnapshotStore::new(pool.clone())),
        backups: Arc::new(DieselBackupRepository::new(pool.clone())),
        directory,
        preferences: Arc::new(DieselUserPreferencesRepository::new(pool)),
        clock,
    }))
}

async fn build_memory_state(settings: &ServerSettings, clock: Arc<dyn Clock>) -> Result<HttpState> {
    warn!("no database configured; records are kept in memory and lost on restart");
    let directory = Arc::new(MemoryUserDirectory::new());
    seed_admin(Arc::clone(&directory), settings).await?;
    Ok(in_memory(directory, clock))
}

/// Build the handler state selected by `settings.database_url`.
///
/// # Errors
/// Fails when migrations, the pool or the bootstrap admin cannot be set up.
pub async fn build_http_state(settings: &ServerSettings) -> Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    match settings.database_url.as_deref() {
        Some(url) => build_postgres_state(url, settings, clock).await,
        None => build_memory_state(settings, clock).await,
    }
}
