//! Event domain service.
//!
//! Implements [`EventQuery`] and [`EventCommand`] over an
//! [`EventRepository`]. Visibility follows the caller's hostel filter; writes
//! are open to admins, the hostel's warden and the event's creator.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{EventCommand, EventQuery, EventRepository, map_repository_error};
use super::service_support::{
    check_revision, empty_page, ensure_visible, found, may_manage, not_permitted,
    staff_target_hostel,
};
use super::validation::DATE_ORDER_MESSAGE;
use super::{
    Error, Event, EventCriteria, EventId, EventPatch, HostelFilter, NewEvent, Principal,
};

const ENTITY: &str = "Event";

/// Event service implementing the event driving ports.
#[derive(Clone)]
pub struct EventService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> EventService<R> {
    /// Create a new service.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

impl<R: EventRepository> EventService<R> {
    async fn load_visible(&self, principal: &Principal, id: &EventId) -> Result<Event, Error> {
        let event = found(
            self.repo.find(id).await.map_err(map_repository_error)?,
            ENTITY,
        )?;
        ensure_visible(
            HostelFilter::for_principal(principal, None).permits(event.hostel_id.as_ref()),
            ENTITY,
        )?;
        Ok(event)
    }

    async fn load_managed(
        &self,
        principal: &Principal,
        id: &EventId,
        action: &str,
    ) -> Result<Event, Error> {
        let event = self.load_visible(principal, id).await?;
        if !may_manage(principal, event.hostel_id.as_ref(), &event.created_by) {
            return Err(not_permitted(action, ENTITY));
        }
        Ok(event)
    }
}

#[async_trait]
impl<R: EventRepository> EventQuery for EventService<R> {
    async fn list(
        &self,
        principal: &Principal,
        criteria: EventCriteria,
        page: PageRequest,
    ) -> Result<Page<Event>, Error> {
        let filter = criteria.scoped(principal);
        if filter.hostels.is_empty() {
            return Ok(empty_page(page));
        }
        let listing = self
            .repo
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn get(&self, principal: &Principal, id: &EventId) -> Result<Event, Error> {
        self.load_visible(principal, id).await
    }
}

#[async_trait]
impl<R: EventRepository> EventCommand for EventService<R> {
    async fn create(&self, principal: &Principal, input: NewEvent) -> Result<Event, Error> {
        let hostel = staff_target_hostel(principal, input.hostel_id, ENTITY)?;
        if input.start_date >= input.end_date {
            return Err(Error::invalid_request(DATE_ORDER_MESSAGE).with_details([DATE_ORDER_MESSAGE]));
        }
        let event = Event::create(
            EventId::random(),
            input,
            hostel,
            principal.user_id,
            self.clock.utc(),
        );
        self.repo
            .insert(&event)
            .await
            .map_err(map_repository_error)?;
        info!(event_id = %event.id, created_by = %principal.user_id, "event created");
        Ok(event)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &EventId,
        patch: EventPatch,
    ) -> Result<Event, Error> {
        let mut event = self.load_managed(principal, id, "update").await?;
        check_revision(patch.expected_revision, event.revision)?;
        let read_revision = event.revision;
        event.apply(patch, self.clock.utc())?;
        self.repo
            .update(&event, read_revision)
            .await
            .map_err(map_repository_error)?;
        info!(event_id = %event.id, revision = event.revision, "event updated");
        Ok(event)
    }

    async fn delete(&self, principal: &Principal, id: &EventId) -> Result<(), Error> {
        let event = self.load_managed(principal, id, "delete").await?;
        if !self
            .repo
            .delete(&event.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Event not found"));
        }
        info!(event_id = %event.id, "event deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Service-level coverage with a mocked repository.
    use super::*;
    use crate::domain::ports::{Listing, MockEventRepository, RepositoryError};
    use crate::domain::test_support::{admin, at, fixture_clock, student_of, warden_of};
    use crate::domain::{ErrorCode, EventType, HostelId, Role, UserId};
    use rstest::rstest;

    fn service(repo: MockEventRepository) -> EventService<MockEventRepository> {
        EventService::new(Arc::new(repo), fixture_clock())
    }

    fn new_event(hostel_id: Option<HostelId>) -> NewEvent {
        NewEvent {
            title: "Movie night".to_owned(),
            description: None,
            start_date: at(18),
            end_date: at(21),
            location: Some("Common room".to_owned()),
            event_type: EventType::Cultural,
            hostel_id,
        }
    }

    fn stored(hostel_id: Option<HostelId>, created_by: &Principal) -> Event {
        Event::create(
            EventId::random(),
            new_event(hostel_id),
            hostel_id,
            created_by.user_id,
            at(8),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn students_cannot_create_events() {
        let hostel = HostelId::random();
        let err = service(MockEventRepository::new())
            .create(&student_of(hostel), new_event(None))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn wardens_create_in_their_own_hostel_by_default() {
        let hostel = HostelId::random();
        let mut repo = MockEventRepository::new();
        repo.expect_insert()
            .withf(move |event| event.hostel_id == Some(hostel) && event.revision == 1)
            .times(1)
            .return_once(|_| Ok(()));

        let event = service(repo)
            .create(&warden_of(hostel), new_event(None))
            .await
            .expect("created");
        assert_eq!(event.hostel_id, Some(hostel));
    }

    #[rstest]
    #[tokio::test]
    async fn unassigned_wardens_cannot_post_general_events() {
        let warden = Principal::new(UserId::random(), Role::Warden, None);
        let err = service(MockEventRepository::new())
            .create(&warden, new_event(None))
            .await
            .expect_err("no hostel to post into");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_inverted_dates_before_writing() {
        let mut input = new_event(None);
        input.end_date = at(9);
        input.start_date = at(10);
        let err = service(MockEventRepository::new())
            .create(&admin(), input)
            .await
            .expect_err("invalid");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(err.message(), DATE_ORDER_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn list_short_circuits_foreign_hostel_requests() {
        let criteria = EventCriteria {
            hostel_id: Some(HostelId::random()),
            ..EventCriteria::default()
        };
        let page = service(MockEventRepository::new())
            .list(&student_of(HostelId::random()), criteria, PageRequest::default())
            .await
            .expect("empty page");
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn list_passes_scoped_filter_to_repository() {
        let hostel = HostelId::random();
        let mut repo = MockEventRepository::new();
        repo.expect_list()
            .withf(move |filter, _| {
                filter.hostels
                    == HostelFilter::Only {
                        hostel: Some(hostel),
                        include_general: true,
                    }
            })
            .times(1)
            .return_once(|_, _| Ok(Listing::empty()));

        service(repo)
            .list(&student_of(hostel), EventCriteria::default(), PageRequest::default())
            .await
            .expect("listing");
    }

    #[rstest]
    #[tokio::test]
    async fn get_distinguishes_missing_from_hidden() {
        let owner = admin();
        let hidden = stored(Some(HostelId::random()), &owner);
        let hidden_id = hidden.id;
        let mut repo = MockEventRepository::new();
        repo.expect_find()
            .returning(move |id| Ok((id == &hidden_id).then(|| hidden.clone())));
        let service = service(repo);
        let viewer = student_of(HostelId::random());

        let missing = service
            .get(&viewer, &EventId::random())
            .await
            .expect_err("missing");
        assert_eq!(missing.code(), ErrorCode::NotFound);

        let forbidden = service.get(&viewer, &hidden_id).await.expect_err("hidden");
        assert_eq!(forbidden.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn update_checks_expected_revision() {
        let caller = admin();
        let event = stored(None, &caller);
        let id = event.id;
        let mut repo = MockEventRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(event)));

        let err = service(repo)
            .update(
                &caller,
                &id,
                EventPatch {
                    expected_revision: Some(7),
                    ..EventPatch::default()
                },
            )
            .await
            .expect_err("conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(err.details(), ["expectedRevision: 7", "actualRevision: 1"]);
    }

    #[rstest]
    #[tokio::test]
    async fn update_writes_conditionally_on_read_revision() {
        let caller = admin();
        let event = stored(None, &caller);
        let id = event.id;
        let mut repo = MockEventRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(event)));
        repo.expect_update()
            .withf(|event, expected| *expected == 1 && event.revision == 2)
            .times(1)
            .return_once(|_, _| Ok(()));

        let updated = service(repo)
            .update(
                &caller,
                &id,
                EventPatch {
                    title: Some("Quiz night".to_owned()),
                    ..EventPatch::default()
                },
            )
            .await
            .expect("updated");
        assert_eq!(updated.title, "Quiz night");
    }

    #[rstest]
    #[tokio::test]
    async fn lost_update_races_surface_as_conflicts() {
        let caller = admin();
        let event = stored(None, &caller);
        let id = event.id;
        let mut repo = MockEventRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(event)));
        repo.expect_update()
            .return_once(|_, _| Err(RepositoryError::revision_mismatch(1_u32, 2_u32)));

        let err = service(repo)
            .update(&caller, &id, EventPatch::default())
            .await
            .expect_err("race");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn residents_cannot_delete_general_events_they_did_not_create() {
        let event = stored(None, &admin());
        let id = event.id;
        let mut repo = MockEventRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(event)));

        let err = service(repo)
            .delete(&warden_of(HostelId::random()), &id)
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }
}
