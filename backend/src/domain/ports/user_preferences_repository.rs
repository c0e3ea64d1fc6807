//! Port for user preferences persistence.
//!
//! The [`UserPreferencesRepository`] trait defines the contract for storing and
//! retrieving user preferences. Adapters implement this trait to provide
//! durable storage (e.g., PostgreSQL) with support for optimistic concurrency
//! via revision checks.

use async_trait::async_trait;

use crate::domain::{UserId, UserPreferences};

use super::define_port_error;

define_port_error! {
    /// Errors raised by user preferences repository adapters.
    pub enum UserPreferencesRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "preferences repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "preferences repository query failed: {message}",
        /// Optimistic concurrency check failed.
        RevisionMismatch { expected: u32, actual: u32 } =>
            "revision mismatch: expected {expected}, found {actual}",
    }
}

/// Port for user preferences storage and retrieval.
///
/// # Revision Semantics
///
/// - New preferences start at revision 1.
/// - Each successful update increments the revision.
/// - Updates that specify `expected_revision` will fail with
///   [`UserPreferencesRepositoryError::RevisionMismatch`] if the current
///   revision doesn't match.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPreferencesRepository: Send + Sync {
    /// Fetch preferences for a user.
    ///
    /// Returns `None` if no preferences have been saved yet for this user.
    /// Callers should initialise default preferences when `None` is returned.
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPreferences>, UserPreferencesRepositoryError>;

    /// Save preferences with optimistic concurrency check.
    ///
    /// # Revision Check
    ///
    /// - If `expected_revision` is `None`, this is an insert of new
    ///   preferences. An existing row yields a revision mismatch.
    /// - If `expected_revision` is `Some(n)`, the update will only succeed if
    ///   the current revision equals `n`. Otherwise,
    ///   [`UserPreferencesRepositoryError::RevisionMismatch`] is returned.
    ///
    /// The caller sets `preferences.revision` to the new value before calling
    /// this method. The repository does not auto-increment the revision.
    async fn save(
        &self,
        preferences: &UserPreferences,
        expected_revision: Option<u32>,
    ) -> Result<(), UserPreferencesRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn revision_mismatch_error_formats_correctly() {
        let error = UserPreferencesRepositoryError::revision_mismatch(2_u32, 5_u32);
        let message = error.to_string();

        assert!(message.contains("expected 2"));
        assert!(message.contains("found 5"));
    }

    #[rstest]
    fn connection_error_keeps_the_cause() {
        let error = UserPreferencesRepositoryError::connection("pool timed out");
        assert_eq!(
            error.to_string(),
            "preferences repository connection failed: pool timed out"
        );
    }
}
