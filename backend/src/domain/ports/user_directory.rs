//! Port for reading accounts and hostels.
//!
//! Accounts and hostels are owned by the directory. The hostel rules only
//! read them: to authenticate logins, to resolve the request principal and to
//! check that direct notifications stay inside a warden's hostel.

use async_trait::async_trait;

use crate::domain::{Hostel, PasswordDigest, User, UserId};

use super::RepositoryError;

/// Account record: profile plus stored password digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAccount {
    /// Public profile.
    pub user: User,
    /// Argon2id password hash in PHC form.
    pub password_digest: PasswordDigest,
}

/// Port for account and hostel lookups.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a profile by id.
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Fetch an account by login name.
    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError>;

    /// All hostels, ordered by name.
    async fn list_hostels(&self) -> Result<Vec<Hostel>, RepositoryError>;

    /// Insert or replace an account, keyed by username.
    async fn upsert_account(&self, account: &UserAccount) -> Result<(), RepositoryError>;
}
