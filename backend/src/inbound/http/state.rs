//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    BackupCommand, BackupQuery, ComplaintCommand, ComplaintQuery, EventCommand, EventQuery,
    LeaveRequestCommand, LeaveRequestQuery, LoginService, MessCommand, MessQuery,
    NotificationCommand, NotificationQuery, ReportQuery, UserPreferencesCommand,
    UserPreferencesQuery, UserProfileQuery,
};

/// Identity and account ports.
#[derive(Clone)]
pub struct IdentityPorts {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub preferences: Arc<dyn UserPreferencesCommand>,
    pub preferences_query: Arc<dyn UserPreferencesQuery>,
}

/// Hostel record ports.
#[derive(Clone)]
pub struct RecordPorts {
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub complaints: Arc<dyn ComplaintCommand>,
    pub complaints_query: Arc<dyn ComplaintQuery>,
    pub leave_requests: Arc<dyn LeaveRequestCommand>,
    pub leave_requests_query: Arc<dyn LeaveRequestQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    pub mess: Arc<dyn MessCommand>,
    pub mess_query: Arc<dyn MessQuery>,
}

/// Administrative ports.
#[derive(Clone)]
pub struct AdminPorts {
    pub backups: Arc<dyn BackupCommand>,
    pub backups_query: Arc<dyn BackupQuery>,
    pub reports: Arc<dyn ReportQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    pub preferences: Arc<dyn UserPreferencesCommand>,
    pub preferences_query: Arc<dyn UserPreferencesQuery>,
    pub events: Arc<dyn EventCommand>,
    pub events_query: Arc<dyn EventQuery>,
    pub complaints: Arc<dyn ComplaintCommand>,
    pub complaints_query: Arc<dyn ComplaintQuery>,
    pub leave_requests: Arc<dyn LeaveRequestCommand>,
    pub leave_requests_query: Arc<dyn LeaveRequestQuery>,
    pub notifications: Arc<dyn NotificationCommand>,
    pub notifications_query: Arc<dyn NotificationQuery>,
    pub mess: Arc<dyn MessCommand>,
    pub mess_query: Arc<dyn MessQuery>,
    pub backups: Arc<dyn BackupCommand>,
    pub backups_query: Arc<dyn BackupQuery>,
    pub reports: Arc<dyn ReportQuery>,
}

impl HttpState {
    /// Construct state from the three port bundles.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use hostel_backend::outbound::memory::MemoryUserDirectory;
    /// use hostel_backend::wiring::in_memory;
    /// use mockable::DefaultClock;
    ///
    /// let state = in_memory(Arc::new(MemoryUserDirectory::new()), Arc::new(DefaultClock));
    /// let _login = state.login.clone();
    /// ```
    pub fn new(identity: IdentityPorts, records: RecordPorts, admin: AdminPorts) -> Self {
        let IdentityPorts {
            login,
            profile,
            preferences,
            preferences_query,
        } = identity;
        let RecordPorts {
            events,
            events_query,
            complaints,
            complaints_query,
            leave_requests,
            leave_requests_query,
            notifications,
            notifications_query,
            mess,
            mess_query,
        } = records;
        let AdminPorts {
            backups,
            backups_query,
            reports,
        } = admin;
        Self {
            login,
            profile,
            preferences,
            preferences_query,
            events,
            events_query,
            complaints,
            complaints_query,
            leave_requests,
            leave_requests_query,
            notifications,
            notifications_query,
            mess,
            mess_query,
            backups,
            backups_query,
            reports,
        }
    }
}
