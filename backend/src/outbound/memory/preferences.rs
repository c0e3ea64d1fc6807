//! In-memory preferences store with revision-checked saves.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPreferencesRepository, UserPreferencesRepositoryError};
use crate::domain::{UserId, UserPreferences};

/// Preferences rows keyed by user.
#[derive(Default)]
pub struct MemoryUserPreferencesRepository {
    rows: RwLock<HashMap<UserId, UserPreferences>>,
}

impl MemoryUserPreferencesRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserPreferencesRepository for MemoryUserPreferencesRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPreferences>, UserPreferencesRepositoryError> {
        Ok(self.rows.read().await.get(user_id).cloned())
    }

    async fn save(
        &self,
        preferences: &UserPreferences,
        expected_revision: Option<u32>,
    ) -> Result<(), UserPreferencesRepositoryError> {
        let mut rows = self.rows.write().await;
        let stored = rows.get(&preferences.user_id).map(|row| row.revision);
        match (expected_revision, stored) {
            (None, None) => {}
            (Some(expected), Some(actual)) if expected == actual => {}
            (Some(expected), actual) => {
                return Err(UserPreferencesRepositoryError::revision_mismatch(
                    expected,
                    actual.unwrap_or_default(),
                ));
            }
            (None, Some(actual)) => {
                return Err(UserPreferencesRepositoryError::revision_mismatch(0_u32, actual));
            }
        }
        rows.insert(preferences.user_id, preferences.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::Utc;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn first_save_requires_no_expected_revision() {
        let repo = MemoryUserPreferencesRepository::new();
        let prefs = UserPreferences::new_default(UserId::random(), Utc::now());

        repo.save(&prefs, None).await.expect("insert");
        let second = repo.save(&prefs, None).await.expect_err("already exists");
        assert_eq!(
            second,
            UserPreferencesRepositoryError::revision_mismatch(0_u32, 1_u32)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn updates_check_the_stored_revision() {
        let repo = MemoryUserPreferencesRepository::new();
        let mut prefs = UserPreferences::new_default(UserId::random(), Utc::now());
        repo.save(&prefs, None).await.expect("insert");

        prefs.revision = 2;
        repo.save(&prefs, Some(1)).await.expect("update");
        let stale = repo.save(&prefs, Some(1)).await.expect_err("stale");
        assert_eq!(
            stale,
            UserPreferencesRepositoryError::revision_mismatch(1_u32, 2_u32)
        );
        let stored = repo
            .find_by_user_id(&prefs.user_id)
            .await
            .expect("lookup")
            .expect("row");
        assert_eq!(stored.revision, 2);
    }
}
