//! Identity domain service.
//!
//! Authenticates logins against the user directory, resolves session user
//! ids into profiles and seeds the optional bootstrap admin account.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::ports::{
    LoginService, UserAccount, UserDirectory, UserProfileQuery, map_repository_error,
};
use super::{Error, Hostel, LoginCredentials, PasswordDigest, Role, User, UserId};

const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Identity service implementing [`LoginService`] and [`UserProfileQuery`].
#[derive(Clone)]
pub struct IdentityService<D> {
    directory: Arc<D>,
}

impl<D> IdentityService<D> {
    /// Create a new service.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

impl<D: UserDirectory> IdentityService<D> {
    /// Create the admin account named `username` unless it already exists.
    ///
    /// Returns `true` when a new account was written.
    pub async fn ensure_bootstrap_admin(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, Error> {
        let credentials = LoginCredentials::try_from_parts(username, password)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        if self
            .directory
            .find_account(credentials.username())
            .await
            .map_err(map_repository_error)?
            .is_some()
        {
            return Ok(false);
        }
        let password_digest = PasswordDigest::derive(credentials.password())
            .map_err(|err| Error::internal(err.to_string()))?;
        let account = UserAccount {
            user: User {
                id: UserId::random(),
                username: credentials.username().to_owned(),
                display_name: "Administrator".to_owned(),
                role: Role::Admin,
                hostel_id: None,
                room_number: None,
            },
            password_digest,
        };
        self.directory
            .upsert_account(&account)
            .await
            .map_err(map_repository_error)?;
        info!(username = %account.user.username, "bootstrap admin account created");
        Ok(true)
    }
}

#[async_trait]
impl<D: UserDirectory> LoginService for IdentityService<D> {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<User, Error> {
        let account = self
            .directory
            .find_account(credentials.username())
            .await
            .map_err(map_repository_error)?;
        match account {
            Some(account) if account.password_digest.verify(credentials.password()) => {
                Ok(account.user)
            }
            _ => {
                warn!(username = %credentials.username(), "login rejected");
                Err(Error::unauthorized(INVALID_CREDENTIALS))
            }
        }
    }
}

#[async_trait]
impl<D: UserDirectory> UserProfileQuery for IdentityService<D> {
    async fn fetch_profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.directory
            .find_user(user_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    async fn list_hostels(&self) -> Result<Vec<Hostel>, Error> {
        self.directory
            .list_hostels()
            .await
            .map_err(map_repository_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockUserDirectory;
    use rstest::rstest;

    fn account(username: &str, password: &str) -> UserAccount {
        UserAccount {
            user: User {
                id: UserId::random(),
                username: username.to_owned(),
                display_name: "Meera Iyer".to_owned(),
                role: Role::Warden,
                hostel_id: None,
                room_number: None,
            },
            password_digest: PasswordDigest::derive(password).expect("hashing succeeds"),
        }
    }

    #[rstest]
    #[case("meera", "s3cret", true)]
    #[case("meera", "wrong", false)]
    #[case("ghost", "s3cret", false)]
    #[tokio::test]
    async fn authenticate_checks_the_stored_digest(
        #[case] username: &str,
        #[case] password: &str,
        #[case] should_succeed: bool,
    ) {
        let stored = account("meera", "s3cret");
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_account()
            .returning(move |name| Ok((name == "meera").then(|| stored.clone())));
        let service = IdentityService::new(Arc::new(directory));
        let credentials =
            LoginCredentials::try_from_parts(username, password).expect("credentials shape");

        match (should_succeed, service.authenticate(&credentials).await) {
            (true, Ok(user)) => assert_eq!(user.username, "meera"),
            (false, Err(err)) => {
                assert_eq!(err.code(), ErrorCode::Unauthorized);
                assert_eq!(err.message(), INVALID_CREDENTIALS);
            }
            (true, Err(err)) => panic!("expected success, got error: {err:?}"),
            (false, Ok(user)) => panic!("expected failure, got success: {}", user.username),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn stale_sessions_are_unauthorised() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_user().return_once(|_| Ok(None));

        let err = IdentityService::new(Arc::new(directory))
            .fetch_profile(&UserId::random())
            .await
            .expect_err("missing user");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_is_created_once() {
        let mut directory = MockUserDirectory::new();
        directory.expect_find_account().return_once(|_| Ok(None));
        directory
            .expect_upsert_account()
            .withf(|account| {
                account.user.role == Role::Admin && account.password_digest.verify("changeme")
            })
            .times(1)
            .return_once(|_| Ok(()));

        let created = IdentityService::new(Arc::new(directory))
            .ensure_bootstrap_admin("root", "changeme")
            .await
            .expect("bootstrap");
        assert!(created);
    }

    #[rstest]
    #[tokio::test]
    async fn bootstrap_admin_leaves_existing_accounts_alone() {
        let existing = account("root", "other");
        let mut directory = MockUserDirectory::new();
        directory
            .expect_find_account()
            .return_once(move |_| Ok(Some(existing)));

        let created = IdentityService::new(Arc::new(directory))
            .ensure_bootstrap_admin("root", "changeme")
            .await
            .expect("bootstrap");
        assert!(!created);
    }
}
