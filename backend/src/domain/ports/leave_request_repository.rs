//! Port for leave request persistence.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{LeaveFilter, LeaveRequest, LeaveRequestId};

use super::{Listing, RepositoryError};

/// Port for leave request storage and retrieval.
///
/// Listings are ordered newest first. `update` is revision-conditional.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LeaveRequestRepository: Send + Sync {
    /// Return one page of leave requests matching `filter`.
    async fn list(
        &self,
        filter: &LeaveFilter,
        page: &PageRequest,
    ) -> Result<Listing<LeaveRequest>, RepositoryError>;

    /// Fetch a leave request regardless of visibility.
    async fn find(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError>;

    /// Persist a new leave request.
    async fn insert(&self, request: &LeaveRequest) -> Result<(), RepositoryError>;

    /// Replace a stored leave request when its revision still matches.
    async fn update(
        &self,
        request: &LeaveRequest,
        expected_revision: u32,
    ) -> Result<(), RepositoryError>;

    /// Remove a leave request. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &LeaveRequestId) -> Result<bool, RepositoryError>;
}
