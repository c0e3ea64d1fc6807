//! Tests for the user preferences service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::MockUserPreferencesRepository;
use crate::domain::test_support::{fixture_clock, fixture_timestamp};
use crate::domain::{ErrorCode, PreferencesPatch, Theme, UserId, UserPreferences};

fn make_service(
    repo: MockUserPreferencesRepository,
) -> UserPreferencesService<MockUserPreferencesRepository> {
    UserPreferencesService::new(Arc::new(repo), fixture_clock())
}

fn dark_theme(expected_revision: Option<u32>) -> PreferencesPatch {
    PreferencesPatch {
        theme: Some(Theme::Dark),
        expected_revision,
        ..PreferencesPatch::default()
    }
}

#[tokio::test]
async fn fetch_creates_defaults_lazily() {
    let user_id = UserId::random();
    let mut repo = MockUserPreferencesRepository::new();

    repo.expect_find_by_user_id()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_save()
        .withf(|prefs, expected| prefs.revision == 1 && expected.is_none())
        .times(1)
        .return_once(|_, _| Ok(()));

    let prefs = make_service(repo)
        .fetch_preferences(&user_id)
        .await
        .expect("defaults");
    assert_eq!(prefs.user_id, user_id);
    assert!(prefs.email_notifications);
    assert!(!prefs.sms_notifications);
    assert_eq!(prefs.updated_at, fixture_timestamp());
}

#[tokio::test]
async fn fetch_recovers_from_a_concurrent_first_read() {
    let user_id = UserId::random();
    let winner = UserPreferences::builder(user_id).revision(1).build();
    let mut repo = MockUserPreferencesRepository::new();
    let mut calls = 0;

    repo.expect_find_by_user_id().times(2).returning(move |_| {
        calls += 1;
        Ok((calls > 1).then(|| winner.clone()))
    });
    repo.expect_save()
        .times(1)
        .return_once(|_, _| Err(UserPreferencesRepositoryError::revision_mismatch(0_u32, 1_u32)));

    let prefs = make_service(repo)
        .fetch_preferences(&user_id)
        .await
        .expect("winner's row");
    assert_eq!(prefs.revision, 1);
}

#[tokio::test]
async fn update_creates_preferences_when_missing() {
    let user_id = UserId::random();
    let mut repo = MockUserPreferencesRepository::new();

    repo.expect_find_by_user_id()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_save()
        .withf(|_, expected| expected.is_none())
        .times(1)
        .return_once(|_, _| Ok(()));

    let prefs = make_service(repo)
        .update(UpdatePreferencesRequest {
            user_id,
            patch: dark_theme(None),
        })
        .await
        .expect("update succeeds");
    assert_eq!(prefs.revision, 1);
    assert_eq!(prefs.theme, Theme::Dark);
}

#[tokio::test]
async fn update_without_revision_applies_on_top_of_stored_row() {
    let user_id = UserId::random();
    let existing = UserPreferences::builder(user_id).revision(3).build();
    let mut repo = MockUserPreferencesRepository::new();

    repo.expect_find_by_user_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_save()
        .withf(|prefs, expected| prefs.revision == 4 && *expected == Some(3))
        .times(1)
        .return_once(|_, _| Ok(()));

    let prefs = make_service(repo)
        .update(UpdatePreferencesRequest {
            user_id,
            patch: dark_theme(None),
        })
        .await
        .expect("update succeeds");
    assert_eq!(prefs.revision, 4);
}

#[tokio::test]
async fn update_rejects_revision_mismatch() {
    let user_id = UserId::random();
    let existing = UserPreferences::builder(user_id).revision(2).build();
    let mut repo = MockUserPreferencesRepository::new();

    repo.expect_find_by_user_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));

    let error = make_service(repo)
        .update(UpdatePreferencesRequest {
            user_id,
            patch: dark_theme(Some(1)),
        })
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn update_rejects_expected_revision_for_missing_row() {
    let mut repo = MockUserPreferencesRepository::new();
    repo.expect_find_by_user_id()
        .times(1)
        .return_once(|_| Ok(None));

    let error = make_service(repo)
        .update(UpdatePreferencesRequest {
            user_id: UserId::random(),
            patch: dark_theme(Some(2)),
        })
        .await
        .expect_err("conflict");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.details(), ["expectedRevision: 2", "actualRevision: 0"]);
}

#[tokio::test]
async fn connection_failures_surface_as_unavailable() {
    let mut repo = MockUserPreferencesRepository::new();
    repo.expect_find_by_user_id()
        .times(1)
        .return_once(|_| Err(UserPreferencesRepositoryError::connection("refused")));

    let error = make_service(repo)
        .fetch_preferences(&UserId::random())
        .await
        .expect_err("unavailable");
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
