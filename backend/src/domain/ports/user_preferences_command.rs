//! Driving port for user preferences operations.
//!
//! The [`UserPreferencesCommand`] trait defines the inbound contract for
//! updating user preferences with optional optimistic concurrency.

use async_trait::async_trait;

use crate::domain::{Error, PreferencesPatch, UserId, UserPreferences};

/// Request to update user preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePreferencesRequest {
    /// The user whose preferences are being updated.
    pub user_id: UserId,
    /// Fields to change. `patch.expected_revision` is checked when present.
    pub patch: PreferencesPatch,
}

/// Driving port for user preferences operations.
///
/// # Optimistic Concurrency
///
/// When `expected_revision` is provided, the update fails with a conflict
/// error if the current revision doesn't match. Without it the patch is
/// applied on top of whatever is stored.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPreferencesCommand: Send + Sync {
    /// Update user preferences and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The revision check fails (conflict).
    /// - A database or connection error occurs.
    async fn update(&self, request: UpdatePreferencesRequest) -> Result<UserPreferences, Error>;
}
