//! Complaint domain service.
//!
//! Complaints always belong to a hostel. Residents file them in their own
//! hostel and may edit the content while it is pending; the hostel's warden
//! and admins handle them through the status graph.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{ComplaintCommand, ComplaintQuery, ComplaintRepository, map_repository_error};
use super::service_support::{
    check_revision, empty_page, ensure_visible, found, may_manage, not_permitted,
};
use super::transitions::complaint_transition;
use super::{
    Complaint, ComplaintCriteria, ComplaintId, ComplaintPatch, ComplaintStatus, Error,
    HostelFilter, HostelId, NewComplaint, Principal,
};

const ENTITY: &str = "Complaint";

/// Complaint service implementing the complaint driving ports.
#[derive(Clone)]
pub struct ComplaintService<R> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> ComplaintService<R> {
    /// Create a new service.
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

/// Hostel a new complaint is filed in.
fn filing_hostel(principal: &Principal, requested: Option<HostelId>) -> Result<HostelId, Error> {
    if principal.is_admin() {
        return requested.ok_or_else(|| {
            Error::invalid_request("hostelId is required").with_details(["hostelId is required"])
        });
    }
    let own = principal
        .hostel_id
        .ok_or_else(|| Error::forbidden("You are not assigned to a hostel"))?;
    match requested {
        Some(hostel) if hostel != own => Err(Error::forbidden(
            "Complaints can only be filed for your own hostel",
        )),
        _ => Ok(own),
    }
}

/// Check every part of `patch` against what `principal` may change.
fn authorise_patch(
    principal: &Principal,
    complaint: &Complaint,
    patch: &ComplaintPatch,
) -> Result<(), Error> {
    if !may_manage(principal, Some(&complaint.hostel_id), &complaint.created_by) {
        return Err(not_permitted("update", ENTITY));
    }
    if let Some(to) = patch.status {
        complaint_transition(principal, &complaint.hostel_id, complaint.status, to)
            .map_err(|denied| denied.into_error("complaint"))?;
    }
    let staff = principal.manages(Some(&complaint.hostel_id));
    if patch.touches_handling() && !staff {
        return Err(Error::forbidden(
            "Only staff may assign or resolve this complaint",
        ));
    }
    if patch.touches_content() && !staff && complaint.status != ComplaintStatus::Pending {
        return Err(Error::forbidden(
            "Complaints can only be edited while pending",
        ));
    }
    Ok(())
}

impl<R: ComplaintRepository> ComplaintService<R> {
    async fn load_visible(
        &self,
        principal: &Principal,
        id: &ComplaintId,
    ) -> Result<Complaint, Error> {
        let complaint = found(
            self.repo.find(id).await.map_err(map_repository_error)?,
            ENTITY,
        )?;
        ensure_visible(
            HostelFilter::for_principal(principal, None).permits(Some(&complaint.hostel_id)),
            ENTITY,
        )?;
        Ok(complaint)
    }
}

#[async_trait]
impl<R: ComplaintRepository> ComplaintQuery for ComplaintService<R> {
    async fn list(
        &self,
        principal: &Principal,
        criteria: ComplaintCriteria,
        page: PageRequest,
    ) -> Result<Page<Complaint>, Error> {
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

    async fn get(&self, principal: &Principal, id: &ComplaintId) -> Result<Complaint, Error> {
        self.load_visible(principal, id).await
    }
}

#[async_trait]
impl<R: ComplaintRepository> ComplaintCommand for ComplaintService<R> {
    async fn create(&self, principal: &Principal, input: NewComplaint) -> Result<Complaint, Error> {
        let hostel = filing_hostel(principal, input.hostel_id)?;
        let complaint = Complaint::create(
            ComplaintId::random(),
            input,
            hostel,
            principal.user_id,
            self.clock.utc(),
        );
        self.repo
            .insert(&complaint)
            .await
            .map_err(map_repository_error)?;
        info!(complaint_id = %complaint.id, hostel_id = %hostel, "complaint filed");
        Ok(complaint)
    }

    async fn update(
        &self,
        principal: &Principal,
        id: &ComplaintId,
        patch: ComplaintPatch,
    ) -> Result<Complaint, Error> {
        let mut complaint = self.load_visible(principal, id).await?;
        authorise_patch(principal, &complaint, &patch)?;
        check_revision(patch.expected_revision, complaint.revision)?;
        let read_revision = complaint.revision;
        let previous = complaint.status;
        complaint.apply(patch, self.clock.utc());
        self.repo
            .update(&complaint, read_revision)
            .await
            .map_err(map_repository_error)?;
        if previous != complaint.status {
            info!(
                complaint_id = %complaint.id,
                from = previous.as_str(),
                to = complaint.status.as_str(),
                "complaint status changed"
            );
        }
        Ok(complaint)
    }

    async fn delete(&self, principal: &Principal, id: &ComplaintId) -> Result<(), Error> {
        let complaint = self.load_visible(principal, id).await?;
        if !may_manage(principal, Some(&complaint.hostel_id), &complaint.created_by) {
            return Err(not_permitted("delete", ENTITY));
        }
        if !self
            .repo
            .delete(&complaint.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Complaint not found"));
        }
        info!(complaint_id = %complaint.id, "complaint deleted");
        Ok(())
    }
}
