//! In-memory record store backing every record repository port.
//!
//! One [`MemoryRecords`] value owns all record tables so backup restores can
//! lock and replace them together.

use std::cmp::Ordering;

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::ports::{
    ComplaintRepository, EventRepository, LeaveRequestRepository, Listing,
    MessAttendanceRepository, MessFeedbackRepository, MessMenuRepository,
    NotificationRepository, RecordSnapshotStore, RepositoryError,
};
use crate::domain::{
    AttendanceId, BackupSnapshot, Complaint, ComplaintFilter, ComplaintId, Event, EventFilter,
    EventId, FeedbackId, LeaveFilter, LeaveRequest, LeaveRequestId, MessAttendance,
    MessAttendanceFilter, MessFeedback, MessFeedbackFilter, MessMenu, MessMenuFilter, MessMenuId,
    Notification, NotificationFilter, NotificationId, SNAPSHOT_FORMAT_VERSION, UserId,
};

use super::table::{Row, Table, replace_all};

impl Row for Event {
    type Key = EventId;

    fn key(&self) -> EventId {
        self.id
    }

    fn revision(&self) -> Option<u32> {
        Some(self.revision)
    }
}

impl Row for Complaint {
    type Key = ComplaintId;

    fn key(&self) -> ComplaintId {
        self.id
    }

    fn revision(&self) -> Option<u32> {
        Some(self.revision)
    }
}

impl Row for LeaveRequest {
    type Key = LeaveRequestId;

    fn key(&self) -> LeaveRequestId {
        self.id
    }

    fn revision(&self) -> Option<u32> {
        Some(self.revision)
    }
}

impl Row for Notification {
    type Key = NotificationId;

    fn key(&self) -> NotificationId {
        self.id
    }
}

impl Row for MessMenu {
    type Key = MessMenuId;

    fn key(&self) -> MessMenuId {
        self.id
    }

    fn revision(&self) -> Option<u32> {
        Some(self.revision)
    }

    fn collides(&self, other: &Self) -> bool {
        self.same_slot(other)
    }
}

impl Row for MessAttendance {
    type Key = AttendanceId;

    fn key(&self) -> AttendanceId {
        self.id
    }

    fn collides(&self, other: &Self) -> bool {
        self.same_slot(other)
    }
}

impl Row for MessFeedback {
    type Key = FeedbackId;

    fn key(&self) -> FeedbackId {
        self.id
    }
}

fn newest_first<T, C: Ord, I: Ord>(
    created: impl Fn(&T) -> C,
    id: impl Fn(&T) -> I,
) -> impl Fn(&T, &T) -> Ordering {
    move |left, right| {
        created(right)
            .cmp(&created(left))
            .then_with(|| id(left).cmp(&id(right)))
    }
}

/// Every record table held in process memory.
#[derive(Default)]
pub struct MemoryRecords {
    events: Table<Event>,
    complaints: Table<Complaint>,
    leave_requests: Table<LeaveRequest>,
    notifications: Table<Notification>,
    menus: Table<MessMenu>,
    attendance: Table<MessAttendance>,
    feedback: Table<MessFeedback>,
}

impl MemoryRecords {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &EventFilter,
        page: &PageRequest,
    ) -> Result<Listing<Event>, RepositoryError> {
        Ok(self
            .events
            .page(
                |event| filter.matches(event),
                |left, right| {
                    left.start_date
                        .cmp(&right.start_date)
                        .then_with(|| left.id.cmp(&right.id))
                },
                page,
            )
            .await)
    }

    async fn find(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        Ok(self.events.find(id).await)
    }

    async fn insert(&self, event: &Event) -> Result<(), RepositoryError> {
        self.events.insert(event).await
    }

    async fn update(&self, event: &Event, expected_revision: u32) -> Result<(), RepositoryError> {
        self.events.replace(event, expected_revision).await
    }

    async fn delete(&self, id: &EventId) -> Result<bool, RepositoryError> {
        Ok(self.events.remove(id).await)
    }
}

#[async_trait]
impl ComplaintRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PageRequest,
    ) -> Result<Listing<Complaint>, RepositoryError> {
        Ok(self
            .complaints
            .page(
                |complaint| filter.matches(complaint),
                newest_first(|c: &Complaint| c.created_at, |c| c.id),
                page,
            )
            .await)
    }

    async fn find(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        Ok(self.complaints.find(id).await)
    }

    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError> {
        self.complaints.insert(complaint).await
    }

    async fn update(
        &self,
        complaint: &Complaint,
        expected_revision: u32,
    ) -> Result<(), RepositoryError> {
        self.complaints.replace(complaint, expected_revision).await
    }

    async fn delete(&self, id: &ComplaintId) -> Result<bool, RepositoryError> {
        Ok(self.complaints.remove(id).await)
    }
}

#[async_trait]
impl LeaveRequestRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &LeaveFilter,
        page: &PageRequest,
    ) -> Result<Listing<LeaveRequest>, RepositoryError> {
        Ok(self
            .leave_requests
            .page(
                |request| filter.matches(request),
                newest_first(|r: &LeaveRequest| r.created_at, |r| r.id),
                page,
            )
            .await)
    }

    async fn find(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        Ok(self.leave_requests.find(id).await)
    }

    async fn insert(&self, request: &LeaveRequest) -> Result<(), RepositoryError> {
        self.leave_requests.insert(request).await
    }

    async fn update(
        &self,
        request: &LeaveRequest,
        expected_revision: u32,
    ) -> Result<(), RepositoryError> {
        self.leave_requests.replace(request, expected_revision).await
    }

    async fn delete(&self, id: &LeaveRequestId) -> Result<bool, RepositoryError> {
        Ok(self.leave_requests.remove(id).await)
    }
}

#[async_trait]
impl NotificationRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> Result<Listing<Notification>, RepositoryError> {
        Ok(self
            .notifications
            .page(
                |notification| filter.matches(notification),
                newest_first(|n: &Notification| n.created_at, |n| n.id),
                page,
            )
            .await)
    }

    async fn find(&self, id: &NotificationId) -> Result<Option<Notification>, RepositoryError> {
        Ok(self.notifications.find(id).await)
    }

    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        self.notifications.insert(notification).await
    }

    async fn set_read(
        &self,
        id: &NotificationId,
        viewer: &UserId,
        read: bool,
    ) -> Result<(), RepositoryError> {
        self.notifications
            .modify(id, |notification| {
                notification.set_read(*viewer, read);
            })
            .await
    }

    async fn mark_all_read(&self, filter: &NotificationFilter) -> Result<u64, RepositoryError> {
        let viewer = filter.audience.recipient;
        Ok(self
            .notifications
            .modify_matching(
                |notification| filter.matches(notification),
                |notification| notification.set_read(viewer, true),
            )
            .await)
    }

    async fn delete(&self, id: &NotificationId) -> Result<bool, RepositoryError> {
        Ok(self.notifications.remove(id).await)
    }
}

#[async_trait]
impl MessMenuRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &MessMenuFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessMenu>, RepositoryError> {
        Ok(self
            .menus
            .page(
                |menu| filter.matches(menu),
                |left, right| {
                    left.date
                        .cmp(&right.date)
                        .then_with(|| left.meal.cmp(&right.meal))
                        .then_with(|| left.id.cmp(&right.id))
                },
                page,
            )
            .await)
    }

    async fn find(&self, id: &MessMenuId) -> Result<Option<MessMenu>, RepositoryError> {
        Ok(self.menus.find(id).await)
    }

    async fn insert(&self, menu: &MessMenu) -> Result<(), RepositoryError> {
        self.menus.insert(menu).await
    }

    async fn update(&self, menu: &MessMenu, expected_revision: u32) -> Result<(), RepositoryError> {
        self.menus.replace(menu, expected_revision).await
    }

    async fn delete(&self, id: &MessMenuId) -> Result<bool, RepositoryError> {
        Ok(self.menus.remove(id).await)
    }
}

#[async_trait]
impl MessAttendanceRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &MessAttendanceFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessAttendance>, RepositoryError> {
        Ok(self
            .attendance
            .page(
                |mark| filter.matches(mark),
                |left, right| {
                    right
                        .date
                        .cmp(&left.date)
                        .then_with(|| left.meal.cmp(&right.meal))
                        .then_with(|| left.id.cmp(&right.id))
                },
                page,
            )
            .await)
    }

    async fn find(&self, id: &AttendanceId) -> Result<Option<MessAttendance>, RepositoryError> {
        Ok(self.attendance.find(id).await)
    }

    async fn insert(&self, mark: &MessAttendance) -> Result<(), RepositoryError> {
        self.attendance.insert(mark).await
    }

    async fn delete(&self, id: &AttendanceId) -> Result<bool, RepositoryError> {
        Ok(self.attendance.remove(id).await)
    }
}

#[async_trait]
impl MessFeedbackRepository for MemoryRecords {
    async fn list(
        &self,
        filter: &MessFeedbackFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessFeedback>, RepositoryError> {
        Ok(self
            .feedback
            .page(
                |feedback| filter.matches(feedback),
                newest_first(|f: &MessFeedback| f.created_at, |f| f.id),
                page,
            )
            .await)
    }

    async fn find(&self, id: &FeedbackId) -> Result<Option<MessFeedback>, RepositoryError> {
        Ok(self.feedback.find(id).await)
    }

    async fn insert(&self, feedback: &MessFeedback) -> Result<(), RepositoryError> {
        self.feedback.insert(feedback).await
    }

    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError> {
        Ok(self.feedback.remove(id).await)
    }
}

#[async_trait]
impl RecordSnapshotStore for MemoryRecords {
    async fn export(&self) -> Result<BackupSnapshot, RepositoryError> {
        Ok(BackupSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            events: self.events.all().await,
            complaints: self.complaints.all().await,
            leave_requests: self.leave_requests.all().await,
            notifications: self.notifications.all().await,
            mess_menus: self.menus.all().await,
            mess_attendance: self.attendance.all().await,
            mess_feedback: self.feedback.all().await,
        })
    }

    async fn restore(&self, snapshot: &BackupSnapshot) -> Result<(), RepositoryError> {
        // Locks are always taken in declaration order.
        let mut events = self.events.lock().await;
        let mut complaints = self.complaints.lock().await;
        let mut leave_requests = self.leave_requests.lock().await;
        let mut notifications = self.notifications.lock().await;
        let mut menus = self.menus.lock().await;
        let mut attendance = self.attendance.lock().await;
        let mut feedback = self.feedback.lock().await;

        replace_all(&mut events, &snapshot.events);
        replace_all(&mut complaints, &snapshot.complaints);
        replace_all(&mut leave_requests, &snapshot.leave_requests);
        replace_all(&mut notifications, &snapshot.notifications);
        replace_all(&mut menus, &snapshot.mess_menus);
        replace_all(&mut attendance, &snapshot.mess_attendance);
        replace_all(&mut feedback, &snapshot.mess_feedback);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Adapter behaviour against the domain filters.
    use super::*;
    use crate::domain::{
        EventType, HostelFilter, HostelId, Meal, NewEvent, NewMessMenu,
    };
    use chrono::{Duration, NaiveDate, TimeZone, Utc};
    use rstest::{fixture, rstest};

    #[fixture]
    fn records() -> MemoryRecords {
        MemoryRecords::new()
    }

    fn event(hostel_id: Option<HostelId>, hour: u32) -> Event {
        let start = Utc
            .with_ymd_and_hms(2024, 2, 1, hour, 0, 0)
            .single()
            .expect("valid timestamp");
        Event::create(
            EventId::random(),
            NewEvent {
                title: format!("Event at {hour}"),
                description: None,
                start_date: start,
                end_date: start + Duration::hours(1),
                location: None,
                event_type: EventType::Other,
                hostel_id,
            },
            hostel_id,
            UserId::random(),
            start,
        )
    }

    fn menu(hostel_id: Option<HostelId>, meal: Meal) -> MessMenu {
        MessMenu::create(
            MessMenuId::random(),
            NewMessMenu {
                hostel_id,
                date: NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"),
                meal,
                items: vec!["Idli".to_owned()],
            },
            hostel_id,
            UserId::random(),
            Utc::now(),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn event_listing_applies_hostel_visibility(records: MemoryRecords) {
        let mine = HostelId::random();
        for event in [event(Some(mine), 9), event(None, 8), event(Some(HostelId::random()), 7)] {
            EventRepository::insert(&records, &event).await.expect("insert");
        }
        let filter = EventFilter::visible(HostelFilter::Only {
            hostel: Some(mine),
            include_general: true,
        });

        let listing = EventRepository::list(&records, &filter, &PageRequest::default())
            .await
            .expect("list");
        assert_eq!(listing.total, 2);
        let hours: Vec<_> = listing.items.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(hours, ["Event at 8", "Event at 9"]);
    }

    #[rstest]
    #[tokio::test]
    async fn menus_are_unique_per_slot(records: MemoryRecords) {
        let hostel = Some(HostelId::random());
        MessMenuRepository::insert(&records, &menu(hostel, Meal::Lunch))
            .await
            .expect("first");
        let err = MessMenuRepository::insert(&records, &menu(hostel, Meal::Lunch))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, RepositoryError::Duplicate { .. }));
        MessMenuRepository::insert(&records, &menu(hostel, Meal::Dinner))
            .await
            .expect("other slot");
    }

    #[rstest]
    #[tokio::test]
    async fn restore_replaces_every_table(records: MemoryRecords) {
        let kept = event(None, 10);
        EventRepository::insert(&records, &event(None, 9))
            .await
            .expect("insert");
        let snapshot = BackupSnapshot {
            format_version: SNAPSHOT_FORMAT_VERSION,
            events: vec![kept.clone()],
            mess_menus: vec![menu(None, Meal::Breakfast)],
            ..BackupSnapshot::default()
        };

        records.restore(&snapshot).await.expect("restore");
        let exported = records.export().await.expect("export");
        assert_eq!(exported.events, vec![kept]);
        assert_eq!(exported.mess_menus.len(), 1);
        assert!(exported.complaints.is_empty());
    }
}
