//! User preferences domain service.
//!
//! This module implements the driving ports for user preferences. Defaults
//! are created lazily on first read, and updates honour an optional
//! optimistic concurrency check.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::debug;

use crate::domain::ports::{
    UpdatePreferencesRequest, UserPreferencesCommand, UserPreferencesQuery,
    UserPreferencesRepository, UserPreferencesRepositoryError, revision_conflict,
};
use crate::domain::service_support::check_revision;
use crate::domain::{Error, UserId, UserPreferences};

/// User preferences service implementing the driving ports.
#[derive(Clone)]
pub struct UserPreferencesService<P> {
    preferences_repo: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<P> UserPreferencesService<P> {
    /// Create a new service with the given repository.
    pub fn new(preferences_repo: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            preferences_repo,
            clock,
        }
    }
}

impl<P> UserPreferencesService<P>
where
    P: UserPreferencesRepository,
{
    fn map_preferences_error(error: UserPreferencesRepositoryError) -> Error {
        match error {
            UserPreferencesRepositoryError::Connection { message } => {
                Error::service_unavailable(format!("preferences repository unavailable: {message}"))
            }
            UserPreferencesRepositoryError::Query { message } => {
                Error::internal(format!("preferences repository error: {message}"))
            }
            UserPreferencesRepositoryError::RevisionMismatch { expected, actual } => {
                revision_conflict(Some(expected), actual)
            }
        }
    }

    async fn fetch_or_create_defaults(&self, user_id: &UserId) -> Result<UserPreferences, Error> {
        if let Some(preferences) = self
            .preferences_repo
            .find_by_user_id(user_id)
            .await
            .map_err(Self::map_preferences_error)?
        {
            return Ok(preferences);
        }

        let defaults = UserPreferences::new_default(*user_id, self.clock.utc());
        match self.preferences_repo.save(&defaults, None).await {
            Ok(()) => {
                debug!(%user_id, "created default preferences");
                Ok(defaults)
            }
            Err(err) => {
                // A concurrent first read may have inserted the row already.
                if let Some(preferences) = self
                    .preferences_repo
                    .find_by_user_id(user_id)
                    .await
                    .map_err(Self::map_preferences_error)?
                {
                    Ok(preferences)
                } else {
                    Err(Self::map_preferences_error(err))
                }
            }
        }
    }
}

#[async_trait]
impl<P> UserPreferencesQuery for UserPreferencesService<P>
where
    P: UserPreferencesRepository,
{
    async fn fetch_preferences(&self, user_id: &UserId) -> Result<UserPreferences, Error> {
        self.fetch_or_create_defaults(user_id).await
    }
}

#[async_trait]
impl<P> UserPreferencesCommand for UserPreferencesService<P>
where
    P: UserPreferencesRepository,
{
    async fn update(&self, request: UpdatePreferencesRequest) -> Result<UserPreferences, Error> {
        let UpdatePreferencesRequest { user_id, patch } = request;
        let current = self
            .preferences_repo
            .find_by_user_id(&user_id)
            .await
            .map_err(Self::map_preferences_error)?;

        let (mut preferences, stored_revision) = match (current, patch.expected_revision) {
            (None, Some(expected)) => return Err(revision_conflict(Some(expected), 0)),
            (None, None) => (UserPreferences::builder(user_id).revision(0).build(), None),
            (Some(existing), expected) => {
                check_revision(expected, existing.revision)?;
                let revision = existing.revision;
                (existing, Some(revision))
            }
        };

        preferences.apply(patch, self.clock.utc());
        self.preferences_repo
            .save(&preferences, stored_revision)
            .await
            .map_err(Self::map_preferences_error)?;
        Ok(preferences)
    }
}

#[cfg(test)]
#[path = "preferences_service_tests.rs"]
mod tests;
