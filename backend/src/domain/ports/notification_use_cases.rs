//! Driving ports for notification use-cases.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    Error, NewNotification, Notification, NotificationCriteria, NotificationId, Principal,
};

/// Read-side notification operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationQuery: Send + Sync {
    /// List notifications addressed or broadcast to `principal`.
    async fn list(
        &self,
        principal: &Principal,
        criteria: NotificationCriteria,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error>;

    /// Fetch one notification.
    async fn get(&self, principal: &Principal, id: &NotificationId) -> Result<Notification, Error>;
}

/// Write-side notification operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationCommand: Send + Sync {
    /// Send a notification as `principal`.
    async fn create(
        &self,
        principal: &Principal,
        input: NewNotification,
    ) -> Result<Notification, Error>;

    /// Set the caller's read flag on one notification.
    async fn set_read(
        &self,
        principal: &Principal,
        id: &NotificationId,
        read: bool,
    ) -> Result<Notification, Error>;

    /// Mark everything visible to the caller as read. Returns how many
    /// notifications changed.
    async fn mark_all_read(&self, principal: &Principal) -> Result<u64, Error>;

    /// Delete a notification.
    async fn delete(&self, principal: &Principal, id: &NotificationId) -> Result<(), Error>;
}
