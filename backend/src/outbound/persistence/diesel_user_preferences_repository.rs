//! PostgreSQL-backed `UserPreferencesRepository` implementation using Diesel ORM.
//!
//! Saves are revision-checked: inserts use `ON CONFLICT DO NOTHING` and
//! updates filter on the expected revision, so a zero-row outcome always
//! means another writer got there first.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserPreferencesRepository, UserPreferencesRepositoryError};
use crate::domain::{UserId, UserPreferences};

use super::diesel_helpers::{cast_revision, cast_revision_for_db};
use super::models::UserPreferencesRow;
use super::pool::{DbPool, PoolError};
use super::schema::user_preferences;

/// Diesel-backed preferences storage.
#[derive(Clone)]
pub struct DieselUserPreferencesRepository {
    pool: DbPool,
}

impl DieselUserPreferencesRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPreferencesRepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPreferencesRepositoryError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPreferencesRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPreferencesRepositoryError::query("record not found"),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
            UserPreferencesRepositoryError::query("preferences owner does not exist")
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPreferencesRepositoryError::connection("database connection error")
        }
        _ => UserPreferencesRepositoryError::query("database error"),
    }
}

async fn current_revision<C>(
    conn: &mut C,
    user_id: Uuid,
) -> Result<Option<u32>, UserPreferencesRepositoryError>
where
    C: diesel_async::AsyncConnection<Backend = diesel::pg::Pg> + Send,
{
    user_preferences::table
        .find(user_id)
        .select(user_preferences::revision)
        .first::<i32>(conn)
        .await
        .optional()
        .map(|revision| revision.map(cast_revision))
        .map_err(map_diesel_error)
}

#[async_trait]
impl UserPreferencesRepository for DieselUserPreferencesRepository {
    async fn find_by_user_id(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserPreferences>, UserPreferencesRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserPreferencesRow> = user_preferences::table
            .find(user_id.as_uuid())
            .select(UserPreferencesRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(UserPreferences::try_from)
            .transpose()
            .map_err(|err| UserPreferencesRepositoryError::query(err.to_string()))
    }

    async fn save(
        &self,
        preferences: &UserPreferences,
        expected_revision: Option<u32>,
    ) -> Result<(), UserPreferencesRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserPreferencesRow::from(preferences);
        let user_id = row.user_id;

        let written = match expected_revision {
            None => diesel::insert_into(user_preferences::table)
                .values(&row)
                .on_conflict(user_preferences::user_id)
                .do_nothing()
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?,
            Some(expected) => diesel::update(user_preferences::table)
                .filter(
                    user_preferences::user_id
                        .eq(user_id)
                        .and(user_preferences::revision.eq(cast_revision_for_db(expected))),
                )
                .set(&row)
                .execute(&mut conn)
                .await
                .map_err(map_diesel_error)?,
        };
        if written > 0 {
            return Ok(());
        }

        let actual = current_revision(&mut conn, user_id).await?.unwrap_or_default();
        Err(UserPreferencesRepositoryError::revision_mismatch(
            expected_revision.unwrap_or_default(),
            actual,
        ))
    }
}
