//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call [`LoginService`] to exchange credentials for the
//! stored account without knowing which directory backs it.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, User};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    ///
    /// Unknown usernames and wrong passwords both yield `unauthorized` with
    /// the same message.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error>;
}
