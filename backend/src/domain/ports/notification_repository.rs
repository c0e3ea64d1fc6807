//! Port for notification persistence.

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{Notification, NotificationFilter, NotificationId, UserId};

use super::{Listing, RepositoryError};

/// Port for notification storage and retrieval.
///
/// Notifications carry no revision; read flags are set with dedicated
/// operations so concurrent readers never overwrite each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Return one page of notifications matching `filter`, newest first.
    async fn list(
        &self,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> Result<Listing<Notification>, RepositoryError>;

    /// Fetch a notification regardless of visibility.
    async fn find(&self, id: &NotificationId) -> Result<Option<Notification>, RepositoryError>;

    /// Persist a new notification.
    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError>;

    /// Add or remove `viewer` from the read set of one notification.
    async fn set_read(
        &self,
        id: &NotificationId,
        viewer: &UserId,
        read: bool,
    ) -> Result<(), RepositoryError>;

    /// Mark every notification matching `filter` as read by its audience
    /// recipient. Returns the number of notifications changed.
    async fn mark_all_read(&self, filter: &NotificationFilter) -> Result<u64, RepositoryError>;

    /// Remove a notification. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &NotificationId) -> Result<bool, RepositoryError>;
}
