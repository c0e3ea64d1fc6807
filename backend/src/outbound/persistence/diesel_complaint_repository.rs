//! PostgreSQL-backed `ComplaintRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{ComplaintRepository, Listing, RepositoryError};
use crate::domain::{Complaint, ComplaintFilter, ComplaintId};
use crate::filter_by_hostel;

use super::diesel_helpers::{
    cast_count, cast_revision_for_db, disambiguate_update_failure, map_diesel_error,
    map_pool_error, page_bounds,
};
use super::models::ComplaintRow;
use super::pool::DbPool;
use super::schema::complaints;

/// Diesel-backed complaint storage.
#[derive(Clone)]
pub struct DieselComplaintRepository {
    pool: DbPool,
}

impl DieselComplaintRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &ComplaintFilter) -> complaints::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        complaints::table.into_boxed(),
        complaints::hostel_id,
        &filter.hostels
    );
    if let Some(status) = filter.status {
        query = query.filter(complaints::status.eq(status.as_str()));
    }
    if let Some(category) = filter.category {
        query = query.filter(complaints::category.eq(category.as_str()));
    }
    if let Some(priority) = filter.priority {
        query = query.filter(complaints::priority.eq(priority.as_str()));
    }
    query
}

#[async_trait]
impl ComplaintRepository for DieselComplaintRepository {
    async fn list(
        &self,
        filter: &ComplaintFilter,
        page: &PageRequest,
    ) -> Result<Listing<Complaint>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<ComplaintRow> = filtered(filter)
            .select(ComplaintRow::as_select())
            .order((complaints::created_at.desc(), complaints::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Complaint::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &ComplaintId) -> Result<Option<Complaint>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        complaints::table
            .find(id.as_uuid())
            .select(ComplaintRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Complaint::try_from)
            .transpose()
    }

    async fn insert(&self, complaint: &Complaint) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(complaints::table)
            .values(ComplaintRow::from(complaint))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(
        &self,
        complaint: &Complaint,
        expected_revision: u32,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *complaint.id.as_uuid();
        let updated = diesel::update(complaints::table)
            .filter(
                complaints::id
                    .eq(id)
                    .and(complaints::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(ComplaintRow::from(complaint))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = complaints::table
            .find(id)
            .select(complaints::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(disambiguate_update_failure(
            current,
            expected_revision,
            "complaint not found",
        ))
    }

    async fn delete(&self, id: &ComplaintId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(complaints::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
