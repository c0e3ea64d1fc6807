//! Authentication primitives: login credentials and the request principal.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! The [`Principal`] is resolved for every request and passed explicitly into
//! each service call; nothing caches it process-wide.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use zeroize::Zeroizing;

use super::{HostelId, Role, User, UserId};

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    EmptyUsername,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use hostel_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("warden.north", "s3cret").expect("valid");
/// assert_eq!(creds.username(), "warden.north");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Argon2id password hash stored in PHC string form
/// (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`).
///
/// # Examples
/// ```
/// use hostel_backend::domain::PasswordDigest;
///
/// let digest = PasswordDigest::derive("s3cret").expect("hashing succeeds");
/// assert!(digest.as_str().starts_with("$argon2id$"));
/// assert!(digest.verify("s3cret"));
/// assert!(!digest.verify("guess"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

/// Error raised when a stored digest is not a PHC string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password digest must be a PHC string")]
pub struct PasswordDigestFormatError;

/// Error raised when a password cannot be hashed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

impl PasswordDigest {
    /// Hash `password` with Argon2id under a fresh random salt.
    ///
    /// # Errors
    /// Returns [`PasswordHashError`] when the hasher rejects its input.
    pub fn derive(password: &str) -> Result<Self, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHashError {
                message: err.to_string(),
            })?;
        Ok(Self(hash.to_string()))
    }

    /// Wrap a stored digest after checking it parses as a PHC string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, PasswordDigestFormatError> {
        let raw = raw.into();
        PasswordHash::new(&raw).map_err(|_| PasswordDigestFormatError)?;
        Ok(Self(raw))
    }

    /// Whether `password` matches the digest.
    pub fn verify(&self, password: &str) -> bool {
        PasswordHash::new(&self.0).is_ok_and(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
    }

    /// Stored PHC form.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Account identifier.
    pub user_id: UserId,
    /// Granted role.
    pub role: Role,
    /// Hostel affiliation; `None` for admins and unassigned accounts.
    pub hostel_id: Option<HostelId>,
}

impl Principal {
    /// Build a principal.
    pub fn new(user_id: UserId, role: Role, hostel_id: Option<HostelId>) -> Self {
        Self {
            user_id,
            role,
            hostel_id,
        }
    }

    /// Whether the caller is a university-wide administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller is a student.
    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Whether the caller is the warden responsible for `hostel`.
    pub fn is_warden_of(&self, hostel: Option<&HostelId>) -> bool {
        self.role == Role::Warden && hostel.is_some() && self.hostel_id.as_ref() == hostel
    }

    /// Whether the caller may manage records in `hostel`: admins always,
    /// wardens only for their own hostel.
    pub fn manages(&self, hostel: Option<&HostelId>) -> bool {
        self.is_admin() || self.is_warden_of(hostel)
    }

    /// Whether the caller is `user`.
    pub fn is(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role, user.hostel_id)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn valid_credentials_trim_username() {
        let creds = LoginCredentials::try_from_parts("  warden  ", " pass ").expect("valid");
        assert_eq!(creds.username(), "warden");
        assert_eq!(creds.password(), " pass ");
    }

    #[rstest]
    fn digests_are_argon2id_phc_strings() {
        let digest = PasswordDigest::derive("hunter2").expect("hashing succeeds");
        assert!(digest.as_str().starts_with("$argon2id$"));
        assert!(!digest.as_str().contains("hunter2"));
    }

    #[rstest]
    fn digests_round_trip_through_storage() {
        let digest = PasswordDigest::derive("hunter2").expect("hashing succeeds");
        let stored = PasswordDigest::parse(digest.as_str()).expect("well-formed digest");
        assert!(stored.verify("hunter2"));
        assert!(!stored.verify("hunter3"));
    }

    #[rstest]
    #[case("")]
    #[case("no-separator")]
    #[case("salt$6efb3088")]
    fn malformed_digests_are_rejected(#[case] raw: &str) {
        assert_eq!(PasswordDigest::parse(raw), Err(PasswordDigestFormatError));
    }

    #[rstest]
    fn fresh_digests_use_distinct_salts() {
        let first = PasswordDigest::derive("same").expect("hashing succeeds");
        let second = PasswordDigest::derive("same").expect("hashing succeeds");
        assert_ne!(first, second);
        assert!(first.verify("same") && second.verify("same"));
    }

    #[rstest]
    fn warden_manages_only_own_hostel() {
        let own = HostelId::random();
        let other = HostelId::random();
        let warden = Principal::new(UserId::random(), Role::Warden, Some(own));

        assert!(warden.manages(Some(&own)));
        assert!(!warden.manages(Some(&other)));
        assert!(!warden.manages(None));
    }

    #[rstest]
    fn unassigned_warden_manages_nothing() {
        let warden = Principal::new(UserId::random(), Role::Warden, None);
        assert!(!warden.manages(None));
    }

    #[rstest]
    fn admin_manages_everything() {
        let admin = Principal::new(UserId::random(), Role::Admin, None);
        assert!(admin.manages(None));
        assert!(admin.manages(Some(&HostelId::random())));
    }
}
