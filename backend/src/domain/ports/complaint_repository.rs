//! Port for complaint persistence.
//!
//! Listings are ordered newest first (`created_at` descending, then id).

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Complaint, ComplaintFilter, ComplaintId};

use super::{Listing, RepositoryError};

/// Port for complaint storage and retrieval.
///
/// `update` is conditional on `expected_revision` in the same way as
/// [`super::EventRepository::update`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Return one page of complaints matching `filter`.
    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PageRequest,
    ) -> Result<Listing<Complaint>, RepositoryError>;

    /// Fetch a complaint regardless of visibility.
    async fn find(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError>;

    /// Persist a new complaint.
    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError>;

    /// Replace a stored complaint when its revision still matches.
    async fn update(
        &self,
        complaint: &Complaint,
        expected_revision: u32,
    ) -> Result<(), RepositoryError>;

    /// Remove a complaint. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &ComplaintId) -> Result<bool, RepositoryError>;
}
