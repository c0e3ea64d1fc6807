//! PostgreSQL-backed `EventRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{EventRepository, Listing, RepositoryError};
use crate::domain::{Event, EventFilter, EventId};
use crate::filter_by_hostel;

use super::diesel_helpers::{
    cast_count, cast_revision_for_db, disambiguate_update_failure, map_diesel_error,
    map_pool_error, page_bounds,
};
use super::models::EventRow;
use super::pool::DbPool;
use super::schema::events;

/// Diesel-backed event storage.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn filtered(filter: &EventFilter) -> events::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        events::table.into_boxed(),
        events::hostel_id,
        &filter.hostels
    );
    if let Some(from) = filter.starts_from {
        query = query.filter(events::start_date.ge(from));
    }
    if let Some(by) = filter.ends_by {
        query = query.filter(events::end_date.le(by));
    }
    if let Some(kind) = filter.event_type {
        query = query.filter(events::event_type.eq(kind.as_str()));
    }
    query
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn list(
        &self,
        filter: &EventFilter,
        page: &PageRequest,
    ) -> Result<Listing<Event>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<EventRow> = filtered(filter)
            .select(EventRow::as_select())
            .order((events::start_date.asc(), events::id.asc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Event::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &EventId) -> Result<Option<Event>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        events::table
            .find(id.as_uuid())
            .select(EventRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Event::try_from)
            .transpose()
    }

    async fn insert(&self, event: &Event) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(EventRow::from(event))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, event: &Event, expected_revision: u32) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *event.id.as_uuid();
        let updated = diesel::update(events::table)
            .filter(
                events::id
                    .eq(id)
                    .and(events::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(EventRow::from(event))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = events::table
            .find(id)
            .select(events::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(disambiguate_update_failure(
            current,
            expected_revision,
            "event not found",
        ))
    }

    async fn delete(&self, id: &EventId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(events::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
