//! PostgreSQL-backed `UserDirectory` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RepositoryError, UserAccount, UserDirectory};
use crate::domain::{Hostel, User, UserId};

use super::diesel_helpers::{map_diesel_error, map_pool_error};
use super::models::{HostelRow, UserRow};
use super::pool::DbPool;
use super::schema::{hostels, users};

/// Diesel-backed account and hostel lookups.
#[derive(Clone)]
pub struct DieselUserDirectory {
    pool: DbPool,
}

impl DieselUserDirectory {
    /// Create a new directory with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for DieselUserDirectory {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row
            .map(UserAccount::try_from)
            .transpose()?
            .map(|account| account.user))
    }

    async fn find_account(&self, username: &str) -> Result<Option<UserAccount>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(UserAccount::try_from)
            .transpose()
    }

    async fn list_hostels(&self) -> Result<Vec<Hostel>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<HostelRow> = hostels::table
            .select(HostelRow::as_select())
            .order((hostels::name.asc(), hostels::id.asc()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Hostel::from).collect())
    }

    async fn upsert_account(&self, account: &UserAccount) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = UserRow::from(account);
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::username)
            .do_update()
            .set(&row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}
