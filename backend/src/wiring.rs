//! Composition of domain services over driven adapters.
//!
//! [`assemble`] turns one adapter per driven port into the [`HttpState`]
//! consumed by the handlers. The server picks PostgreSQL or in-memory
//! adapters; integration tests use [`in_memory`] directly.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    BackupRepository, ComplaintRepository, EventRepository, LeaveRequestRepository,
    MessAttendanceRepository, MessFeedbackRepository, MessMenuRepository,
    NotificationRepository, RecordSnapshotStore, UserDirectory, UserPreferencesRepository,
};
use crate::domain::{
    BackupService, ComplaintService, EventService, IdentityService, LeaveRequestService,
    MessRepositories, MessService, NotificationService, ReportService, ReportSources,
    UserPreferencesService,
};
use crate::inbound::http::state::{AdminPorts, HttpState, IdentityPorts, RecordPorts};
use crate::outbound::memory::{
    MemoryBackupRepository, MemoryRecords, MemoryUserDirectory, MemoryUserPreferencesRepository,
};

/// One adapter per driven port.
pub struct Adapters<E, C, L, N, MM, MA, MF, S, B, D, P> {
    pub events: Arc<E>,
    pub complaints: Arc<C>,
    pub leave_requests: Arc<L>,
    pub notifications: Arc<N>,
    pub mess_menus: Arc<MM>,
    pub mess_attendance: Arc<MA>,
    pub mess_feedback: Arc<MF>,
    pub snapshots: Arc<S>,
    pub backups: Arc<B>,
    pub directory: Arc<D>,
    pub preferences: Arc<P>,
    pub clock: Arc<dyn Clock>,
}

/// Build every domain service and bundle the resulting ports.
pub fn assemble<E, C, L, N, MM, MA, MF, S, B, D, P>(
    adapters: Adapters<E, C, L, N, MM, MA, MF, S, B, D, P>,
) -> HttpState
where
    E: EventRepository + 'static,
    C: ComplaintRepository + 'static,
    L: LeaveRequestRepository + 'static,
    N: NotificationRepository + 'static,
    MM: MessMenuRepository + 'static,
    MA: MessAttendanceRepository + 'static,
    MF: MessFeedbackRepository + 'static,
    S: RecordSnapshotStore + 'static,
    B: BackupRepository + 'static,
    D: UserDirectory + 'static,
    P: UserPreferencesRepository + 'static,
{
    let Adapters {
        events,
        complaints,
        leave_requests,
        notifications,
        mess_menus,
        mess_attendance,
        mess_feedback,
        snapshots,
        backups,
        directory,
        preferences,
        clock,
    } = adapters;

    let identity = Arc::new(IdentityService::new(Arc::clone(&directory)));
    let preferences = Arc::new(UserPreferencesService::new(preferences, Arc::clone(&clock)));
    let events = Arc::new(EventService::new(events, Arc::clone(&clock)));
    let complaints = Arc::new(ComplaintService::new(complaints, Arc::clone(&clock)));
    let leave_requests = Arc::new(LeaveRequestService::new(leave_requests, Arc::clone(&clock)));
    let notifications = Arc::new(NotificationService::new(
        notifications,
        Arc::clone(&directory),
        Arc::clone(&clock),
    ));
    let mess = Arc::new(MessService::new(
        MessRepositories {
            menus: mess_menus,
            attendance: mess_attendance,
            feedback: mess_feedback,
        },
        directory,
        Arc::clone(&clock),
    ));
    let backups = Arc::new(BackupService::new(backups, snapshots, clock));
    let reports = Arc::new(ReportService::new(ReportSources {
        events: events.clone(),
        complaints: complaints.clone(),
        leave_requests: leave_requests.clone(),
        mess: mess.clone(),
    }));

    HttpState::new(
        IdentityPorts {
            login: identity.clone(),
            profile: identity,
            preferences: preferences.clone(),
            preferences_query: preferences,
        },
        RecordPorts {
            events: events.clone(),
            events_query: events,
            complaints: complaints.clone(),
            complaints_query: complaints,
            leave_requests: leave_requests.clone(),
            leave_requests_query: leave_requests,
            notifications: notifications.clone(),
            notifications_query: notifications,
            mess: mess.clone(),
            mess_query: mess,
        },
        AdminPorts {
            backups: backups.clone(),
            backups_query: backups,
            reports,
        },
    )
}

/// Assemble the in-memory adapters around an existing user directory.
pub fn in_memory(directory: Arc<MemoryUserDirectory>, clock: Arc<dyn Clock>) -> HttpState {
    let records = Arc::new(MemoryRecords::new());
    assemble(Adapters {
        events: Arc::clone(&records),
        complaints: Arc::clone(&records),
        leave_requests: Arc::clone(&records),
        notifications: Arc::clone(&records),
        mess_menus: Arc::clone(&records),
        mess_attendance: Arc::clone(&records),
        mess_feedback: Arc::clone(&records),
        snapshots: records,
        backups: Arc::new(MemoryBackupRepository::new()),
        directory,
        preferences: Arc::new(MemoryUserPreferencesRepository::new()),
        clock,
    })
}
