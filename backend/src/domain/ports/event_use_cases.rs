//! Driving ports for event use-cases.
//!
//! Inbound adapters call [`EventQuery`] and [`EventCommand`] with the request
//! principal; implementations apply the visibility filter and permission
//! rules before touching storage.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, Event, EventCriteria, EventId, EventPatch, NewEvent, Principal};

/// Read-side event operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventQuery: Send + Sync {
    /// List events visible to `principal`.
    async fn list(
        &self,
        principal: &Principal,
        criteria: EventCriteria,
        page: PageRequest,
    ) -> Result<Page<Event>, Error>;

    /// Fetch one event: `not_found` when missing, `forbidden` when hidden.
    async fn get(&self, principal: &Principal, id: &EventId) -> Result<Event, Error>;
}

/// Write-side event operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventCommand: Send + Sync {
    /// Create an event as `principal`.
    async fn create(&self, principal: &Principal, input: NewEvent) -> Result<Event, Error>;

    /// Apply a partial update.
    async fn update(
        &self,
        principal: &Principal,
        id: &EventId,
        patch: EventPatch,
    ) -> Result<Event, Error>;

    /// Delete an event.
    async fn delete(&self, principal: &Principal, id: &EventId) -> Result<(), Error>;
}
