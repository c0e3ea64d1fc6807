//! Port for event persistence.
//!
//! The [`EventRepository`] trait defines the contract for storing and
//! retrieving events. Adapters filter with the supplied [`EventFilter`] and
//! order results by start date, then identifier.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Event, EventFilter, EventId};

use super::{Listing, RepositoryError};

/// Port for event storage and retrieval.
///
/// # Revision Semantics
///
/// - New events are inserted at revision 1.
/// - `update` writes only when the stored revision still equals
///   `expected_revision`; otherwise it fails with
///   [`RepositoryError::RevisionMismatch`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Return one page of events matching `filter`.
    async fn list(
        &self,
        filter: &EventFilter,
        page: &PageRequest,
    ) -> Result<Listing<Event>, RepositoryError>;

    /// Fetch an event regardless of visibility.
    async fn find(&self, id: &EventId) -> Result<Option<Event>, RepositoryError>;

    /// Persist a new event.
    async fn insert(&self, event: &Event) -> Result<(), RepositoryError>;

    /// Replace a stored event when its revision still equals
    /// `expected_revision`.
    async fn update(&self, event: &Event, expected_revision: u32) -> Result<(), RepositoryError>;

    /// Remove an event. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &EventId) -> Result<bool, RepositoryError>;
}
