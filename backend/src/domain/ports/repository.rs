//! Shared vocabulary for record repositories.
//!
//! Every record table exposes the same shape: a filtered, paginated listing,
//! lookup by id, insert, a revision-conditional update and delete. Adapters
//! report failures with [`RepositoryError`], which services translate into
//! domain errors with [`map_repository_error`].

use pagination::PageRequest;
use tracing::error;

use crate::domain::Error;

use super::define_port_error;

define_port_error! {
    /// Errors raised by record repository adapters.
    pub enum RepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "repository query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Duplicate { message: String } =>
            "duplicate record: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
        /// The record vanished between read and write.
        Missing { message: String } =>
            "record missing: {message}",
    }
}

/// One page of records plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing<T> {
    /// Records on the requested page.
    pub items: Vec<T>,
    /// Number of records matching the filter across all pages.
    pub total: u64,
}

impl<T> Listing<T> {
    /// Build a listing.
    pub fn new(items: Vec<T>, total: u64) -> Self {
        Self { items, total }
    }

    /// An empty listing.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    /// Wrap into the public pagination envelope.
    pub fn into_page(self, request: PageRequest) -> pagination::Page<T> {
        pagination::Page::new(self.items, request, self.total)
    }
}

/// Translate a repository failure into a domain error.
///
/// Connection problems surface as `service_unavailable`, conflicts as
/// `conflict` with the revisions in `details`, and everything else as an
/// internal error.
pub fn map_repository_error(err: RepositoryError) -> Error {
    match err {
        RepositoryError::Connection { message } => {
            error!(%message, "record repository unavailable");
            Error::service_unavailable(format!("repository unavailable: {message}"))
        }
        RepositoryError::Query { message } => {
            error!(%message, "record repository query failed");
            Error::internal(format!("repository error: {message}"))
        }
        RepositoryError::Duplicate { message } => Error::conflict(message),
        RepositoryError::RevisionMismatch { expected, actual } => revision_conflict(Some(expected), actual),
        RepositoryError::Missing { message } => Error::not_found(message),
    }
}

/// Conflict error for a failed optimistic concurrency check.
pub fn revision_conflict(expected: Option<u32>, actual: u32) -> Error {
    let mut details = vec![format!("actualRevision: {actual}")];
    if let Some(expected) = expected {
        details.insert(0, format!("expectedRevision: {expected}"));
    }
    Error::conflict("revision mismatch").with_details(details)
}
