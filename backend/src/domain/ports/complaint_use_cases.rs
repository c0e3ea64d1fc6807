//! Driving ports for complaint use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Complaint, ComplaintCriteria, ComplaintId, ComplaintPatch, Error, NewComplaint, Principal,
};

/// Read-side complaint operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintQuery: Send + Sync {
    /// List complaints visible to `principal`.
    async fn list(
        &self,
        principal: &Principal,
        criteria: ComplaintCriteria,
        page: PageRequest,
    ) -> Result<Page<Complaint>, Error>;

    /// Fetch one complaint: `not_found` when missing, `forbidden` when
    /// hidden.
    async fn get(&self, principal: &Principal, id: &ComplaintId) -> Result<Complaint, Error>;
}

/// Write-side complaint operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintCommand: Send + Sync {
    /// File a complaint as `principal`.
    async fn create(&self, principal: &Principal, input: NewComplaint) -> Result<Complaint, Error>;

    /// Apply a partial update, including status transitions.
    async fn update(
        &self,
        principal: &Principal,
        id: &ComplaintId,
        patch: ComplaintPatch,
    ) -> Result<Complaint, Error>;

    /// Delete a complaint.
    async fn delete(&self, principal: &Principal, id: &ComplaintId) -> Result<(), Error>;
}
