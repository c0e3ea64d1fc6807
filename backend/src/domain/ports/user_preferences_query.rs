//! Driving port for user preferences queries.

use async_trait::async_trait;

use crate::domain::{Error, UserId, UserPreferences};

/// Domain use-case port for reading preferences.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserPreferencesQuery: Send + Sync {
    /// Fetch preferences for `user_id`, falling back to defaults at
    /// revision 0 when nothing has been saved yet.
    async fn fetch_preferences(&self, user_id: &UserId) -> Result<UserPreferences, Error>;
}
