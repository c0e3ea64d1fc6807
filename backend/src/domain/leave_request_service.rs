//! Leave request domain service.
//!
//! Students file requests for their own absence. The hostel's warden or an
//! admin decides them once; decided requests are frozen for everyone.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{
    LeaveRequestCommand, LeaveRequestQuery, LeaveRequestRepository, map_repository_error,
};
use super::service_support::{
    check_revision, empty_page, ensure_visible, found, may_manage, not_permitted,
};
use super::transitions::{leave_dates_editable, leave_transition};
use super::validation::DATE_ORDER_MESSAGE;
use super::{
    Error, LeaveCriteria, LeavePatch, LeaveRequest, LeaveRequestId, LeaveStatus, NewLeaveRequest,
    Principal, RecordScope,
};

const ENTITY: &str = "Leave request";
const TRANSITION_ENTITY: &str = "leave request";

/// Leave request service implementing the leave driving ports.
#[derive(Clone)]
pub struct LeaveRequestService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> LeaveRequestService<R> {
    /// Create a new service.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

fn authorise_patch(
    principal: &Principal,
    request: &LeaveRequest,
    patch: &LeavePatch,
) -> Result<(), Error> {
    let hostel = request.hostel_id.as_ref();
    let owner = principal.is(&request.student_id);
    if !owner && !principal.manages(hostel) {
        return Err(not_permitted("update", ENTITY));
    }
    if let Some(to) = patch.status {
        leave_transition(principal, hostel, request.status, to)
            .map_err(|denied| denied.into_error(TRANSITION_ENTITY))?;
    }
    if patch.remarks.is_some() && !principal.manages(hostel) {
        return Err(Error::forbidden("Only staff may add remarks"));
    }
    if (patch.touches_dates() || patch.touches_content()) && !owner {
        return Err(Error::forbidden(
            "Only the requester may edit this leave request",
        ));
    }
    if patch.touches_dates() {
        leave_dates_editable(request.status)
            .map_err(|denied| denied.into_error(TRANSITION_ENTITY))?;
    }
    if patch.touches_content() && request.status != LeaveStatus::Pending {
        return Err(Error::forbidden(
            "Leave requests can only be edited while pending",
        ));
    }
    Ok(())
}

impl<R: LeaveRequestRepository> LeaveRequestService<R> {
    async fn load_visible(
        &self,
        principal: &Principal,
        id: &LeaveRequestId,
    ) -> Result<LeaveRequest, Error> {
        let request = found(
            self.repo.find(id).await.map_err(map_repository_error)?,
            ENTITY,
        )?;
        ensure_visible(
            RecordScope::personal(principal, None, None)
                .permits(request.hostel_id.as_ref(), &request.student_id),
            ENTITY,
        )?;
        Ok(request)
    }
}

#[async_trait]
impl<R: LeaveRequestRepository> LeaveRequestQuery for LeaveRequestService<R> {
    async fn list(
        &self,
        principal: &Principal,
        criteria: LeaveCriteria,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>, Error> {
        let filter = criteria.scoped(principal);
        if filter.scope.is_empty() {
            return Ok(empty_page(page));
        }
        let listing = self
            .repo
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn get(&self, principal: &Principal, id: &LeaveRequestId) -> Result<LeaveRequest, Error> {
        self.load_visible(principal, id).await
    }
}

#[async_trait]
impl<R: LeaveRequestRepository> LeaveRequestCommand for LeaveRequestService<R> {
    async fn create(
        &self,
        principal: &Principal,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, Error> {
        if !principal.is_student() {
            return Err(Error::forbidden("Only students can request leave"));
        }
        if input.start_date >= input.end_date {
            return Err(Error::invalid_request(DATE_ORDER_MESSAGE).with_details([DATE_ORDER_MESSAGE]));
        }
        let request = LeaveRequest::create(
            LeaveRequestId::random(),
            input,
            principal.user_id,
            principal.hostel_id,
            self.clock.utc(),
        );
        self.repo
            .insert(&request)
            .await
            .map_err(map_repository_error)?;
        info!(leave_request_id = %request.id, student_id = %request.student_id, "leave requested");
        Ok(request)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &LeaveRequestId,
        patch: LeavePatch,
    ) -> Result<LeaveRequest, Error> {
        let mut request = self.load_visible(principal, id).await?;
        authorise_patch(principal, &request, &patch)?;
        check_revision(patch.expected_revision, request.revision)?;
        let read_revision = request.revision;
        let decided = patch.status.is_some();
        request.apply(patch, principal.user_id, self.clock.utc())?;
        self.repo
            .update(&request, read_revision)
            .await
            .map_err(map_repository_error)?;
        if decided {
            info!(
                leave_request_id = %request.id,
                status = request.status.as_str(),
                decided_by = %principal.user_id,
                "leave request decided"
            );
        }
        Ok(request)
    }

    async fn delete(&self, principal: &Principal, id: &LeaveRequestId) -> Result<(), Error> {
        let request = self.load_visible(principal, id).await?;
        if !may_manage(principal, request.hostel_id.as_ref(), &request.student_id) {
            return Err(not_permitted("delete", ENTITY));
        }
        if !self
            .repo
            .delete(&request.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Leave request not found"));
        }
        info!(leave_request_id = %request.id, "leave request deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Service-level coverage with a mocked repository.
    use super::*;
    use crate::domain::ports::MockLeaveRequestRepository;
    use crate::domain::test_support::{admin, at, fixture_clock, student_of, warden_of};
    use crate::domain::{ErrorCode, HostelId, LeaveType};
    use rstest::rstest;

    fn service(repo: MockLeaveRequestRepository) -> LeaveRequestService<MockLeaveRequestRepository> {
        LeaveRequestService::new(Arc::new(repo), fixture_clock())
    }

    fn new_request() -> NewLeaveRequest {
        NewLeaveRequest {
            leave_type: LeaveType::Home,
            reason: "Family visit".to_owned(),
            start_date: at(10),
            end_date: at(20),
            destination: Some("Pune".to_owned()),
        }
    }

    fn stored(owner: &Principal, status: LeaveStatus) -> LeaveRequest {
        let mut request = LeaveRequest::create(
            LeaveRequestId::random(),
            new_request(),
            owner.user_id,
            owner.hostel_id,
            at(8),
        );
        request.status = status;
        request
    }

    fn repo_with(request: LeaveRequest) -> MockLeaveRequestRepository {
        let mut repo = MockLeaveRequestRepository::new();
        repo.expect_find().return_once(move |_| Ok(Some(request)));
        repo
    }

    fn decide(status: LeaveStatus) -> LeavePatch {
        LeavePatch {
            status: Some(status),
            ..LeavePatch::default()
        }
    }

    #[rstest]
    #[tokio::test]
    async fn only_students_request_leave() {
        let err = service(MockLeaveRequestRepository::new())
            .create(&warden_of(HostelId::random()), new_request())
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn requests_inherit_the_students_hostel() {
        let hostel = HostelId::random();
        let student = student_of(hostel);
        let student_id = student.user_id;
        let mut repo = MockLeaveRequestRepository::new();
        repo.expect_insert()
            .withf(move |request| {
                request.hostel_id == Some(hostel) && request.student_id == student_id
            })
            .times(1)
            .return_once(|_| Ok(()));

        let request = service(repo)
            .create(&student, new_request())
            .await
            .expect("created");
        assert_eq!(request.status, LeaveStatus::Pending);
    }

    #[rstest]
    #[tokio::test]
    async fn create_rejects_inverted_dates() {
        let mut input = new_request();
        input.end_date = input.start_date;
        let err = service(MockLeaveRequestRepository::new())
            .create(&student_of(HostelId::random()), input)
            .await
            .expect_err("invalid");
        assert_eq!(err.message(), DATE_ORDER_MESSAGE);
    }

    #[rstest]
    #[tokio::test]
    async fn wardens_approve_pending_requests() {
        let hostel = HostelId::random();
        let request = stored(&student_of(hostel), LeaveStatus::Pending);
        let id = request.id;
        let warden = warden_of(hostel);
        let warden_id = warden.user_id;
        let mut repo = repo_with(request);
        repo.expect_update()
            .withf(move |request, expected| {
                *expected == 1 && request.approved_by == Some(warden_id) && request.decided_at.is_some()
            })
            .times(1)
            .return_once(|_, _| Ok(()));

        let approved = service(repo)
            .update(&warden, &id, decide(LeaveStatus::Approved))
            .await
            .expect("approved");
        assert_eq!(approved.status, LeaveStatus::Approved);
    }

    #[rstest]
    #[case(LeaveStatus::Approved, LeaveStatus::Rejected)]
    #[case(LeaveStatus::Rejected, LeaveStatus::Approved)]
    #[case(LeaveStatus::Approved, LeaveStatus::Pending)]
    #[tokio::test]
    async fn decided_requests_refuse_further_transitions_even_for_admins(
        #[case] current: LeaveStatus,
        #[case] requested: LeaveStatus,
    ) {
        let request = stored(&student_of(HostelId::random()), current);
        let id = request.id;

        let err = service(repo_with(request))
            .update(&admin(), &id, decide(requested))
            .await
            .expect_err("terminal");
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
    }

    #[rstest]
    #[tokio::test]
    async fn students_cannot_approve_their_own_leave() {
        let student = student_of(HostelId::random());
        let request = stored(&student, LeaveStatus::Pending);
        let id = request.id;

        let err = service(repo_with(request))
            .update(&student, &id, decide(LeaveStatus::Approved))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn dates_freeze_after_a_decision() {
        let student = student_of(HostelId::random());
        let request = stored(&student, LeaveStatus::Approved);
        let id = request.id;
        let patch = LeavePatch {
            end_date: Some(at(23)),
            ..LeavePatch::default()
        };

        let err = service(repo_with(request))
            .update(&student, &id, patch)
            .await
            .expect_err("frozen");
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
    }

    #[rstest]
    #[tokio::test]
    async fn classmates_cannot_see_each_others_requests() {
        let hostel = HostelId::random();
        let request = stored(&student_of(hostel), LeaveStatus::Pending);
        let id = request.id;

        let err = service(repo_with(request))
            .get(&student_of(hostel), &id)
            .await
            .expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn owners_delete_their_requests() {
        let student = student_of(HostelId::random());
        let request = stored(&student, LeaveStatus::Pending);
        let id = request.id;
        let mut repo = repo_with(request);
        repo.expect_delete().times(1).return_once(|_| Ok(true));

        service(repo).delete(&student, &id).await.expect("deleted");
    }
}
