//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to resolve the session user into a full
//! profile (role and hostel included) on every authenticated request.

use async_trait::async_trait;

use crate::domain::{Error, Hostel, User, UserId};

/// Domain use-case port for reading users and hostels.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for the authenticated user.
    ///
    /// A session pointing at a user that no longer exists yields
    /// `unauthorized`.
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Return every hostel, ordered by name.
    async fn list_hostels(&self) -> Result<Vec<Hostel>, Error>;
}
