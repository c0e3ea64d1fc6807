//! PostgreSQL-backed `LeaveRequestRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{LeaveRequestRepository, Listing, RepositoryError};
use crate::domain::{LeaveRequest, LeaveFilter, LeaveRequestId};
use crate::filter_by_hostel;

use super::diesel_helpers::{
    cast_count, cast_revision_for_db, disambiguate_update_failure, map_diesel_error,
    map_pool_error, page_bounds,
};
use super::models::LeaveRequestRow;
use super::pool::DbPool;
use super::schema::leave_requests;

/// Diesel-backed leave request storage.
#[derive(Clone)]
pub struct DieselLeaveRequestRepository {
    pool: DbPool,
}

impl DieselLeaveRequestRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &LeaveFilter) -> leave_requests::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        leave_requests::table.into_boxed(),
        leave_requests::hostel_id,
        &filter.scope.hostels
    );
    if let Some(owner) = filter.scope.owner {
        query = query.filter(leave_requests::student_id.eq(*owner.as_uuid()));
    }
    if let Some(status) = filter.status {
        query = query.filter(leave_requests::status.eq(status.as_str()));
    }
    if let Some(kind) = filter.leave_type {
        query = query.filter(leave_requests::leave_type.eq(kind.as_str()));
    }
    query
}

#[async_trait]
impl LeaveRequestRepository for DieselLeaveRequestRepository {
    async fn list(
        &self,
        filter: &LeaveFilter,
        page: &PageRequest,
    ) -> Result<Listing<LeaveRequest>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<LeaveRequestRow> = filtered(filter)
            .select(LeaveRequestRow::as_select())
            .order((leave_requests::created_at.desc(), leave_requests::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(LeaveRequest::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        leave_requests::table
            .find(id.as_uuid())
            .select(LeaveRequestRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(LeaveRequest::try_from)
            .transpose()
    }

    async fn insert(&self, request: &LeaveRequest) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(leave_requests::table)
            .values(LeaveRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        request: &LeaveRequest,
        expected_revision: u32,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *request.id.as_uuid();
        let updated = diesel::update(leave_requests::table)
            .filter(
                leave_requests::id
                    .eq(id)
                    .and(leave_requests::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(LeaveRequestRow::from(request))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = leave_requests::table
            .find(id)
            .select(leave_requests::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(disambiguate_update_failure(
            current,
            expected_revision,
            "leave request not found",
        ))
    }

    async fn delete(&self, id: &LeaveRequestId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(leave_requests::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
