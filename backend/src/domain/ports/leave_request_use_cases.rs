//! Driving ports for leave request use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, LeaveCriteria, LeavePatch, LeaveRequest, LeaveRequestId, NewLeaveRequest, Principal,
};

/// Read-side leave request operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRequestQuery: Send + Sync {
    /// List leave requests visible to `principal`.
    async fn list(
        &self,
        principal: &Principal,
        criteria: LeaveCriteria,
        page: PageRequest,
    ) -> Result<Page<LeaveRequest>, Error>;

    /// Fetch one leave request.
    async fn get(&self, principal: &Principal, id: &LeaveRequestId) -> Result<LeaveRequest, Error>;
}

/// Write-side leave request operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRequestCommand: Send + Sync {
    /// File a leave request; students only.
    async fn create(
        &self,
        principal: &Principal,
        input: NewLeaveRequest,
    ) -> Result<LeaveRequest, Error>;

    /// Apply a partial update or a decision.
    async fn update(
        &self,
        principal: &Principal,
        id: &LeaveRequestId,
        patch: LeavePatch,
    ) -> Result<LeaveRequest, Error>;

    /// Delete a leave request.
    async fn delete(&self, principal: &Principal, id: &LeaveRequestId) -> Result<(), Error>;
}
