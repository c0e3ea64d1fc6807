//! PostgreSQL-backed mess repositories: menus, attendance and feedback.
//!
//! Slot uniqueness is enforced by the schema. A clashing insert or update
//! surfaces as [`RepositoryError::Duplicate`].

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageRequest;

use crate::domain::ports::{
    Listing, MessAttendanceRepository, MessFeedbackRepository, MessMenuRepository,
    RepositoryError,
};
use crate::domain::{
    AttendanceId, FeedbackId, MessAttendance, MessAttendanceFilter, MessFeedback,
    MessFeedbackFilter, MessMenu, MessMenuFilter, MessMenuId,
};
use crate::filter_by_hostel;

use super::diesel_helpers::{
    cast_count, cast_revision_for_db, disambiguate_update_failure, map_diesel_error,
    map_pool_error, page_bounds,
};
use super::models::{MessAttendanceRow, MessFeedbackRow, MessMenuRow};
use super::pool::DbPool;
use super::schema::{mess_attendance, mess_feedback, mess_menus};

/// Diesel-backed storage for every mess record.
#[derive(Clone)]
pub struct DieselMessRepository {
    pool: DbPool,
}

impl DieselMessRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn menus(filter: &MessMenuFilter) -> mess_menus::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        mess_menus::table.into_boxed(),
        mess_menus::hostel_id,
        &filter.hostels
    );
    if let Some(date) = filter.date {
        query = query.filter(mess_menus::date.eq(date));
    }
    if let Some(from) = filter.from {
        query = query.filter(mess_menus::date.ge(from));
    }
    if let Some(to) = filter.to {
        query = query.filter(mess_menus::date.le(to));
    }
    if let Some(meal) = filter.meal {
        query = query.filter(mess_menus::meal.eq(meal.as_str()));
    }
    query
}

fn attendance(filter: &MessAttendanceFilter) -> mess_attendance::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        mess_attendance::table.into_boxed(),
        mess_attendance::hostel_id,
        &filter.scope.hostels
    );
    if let Some(owner) = filter.scope.owner {
        query = query.filter(mess_attendance::student_id.eq(*owner.as_uuid()));
    }
    if let Some(date) = filter.date {
        query = query.filter(mess_attendance::date.eq(date));
    }
    if let Some(meal) = filter.meal {
        query = query.filter(mess_attendance::meal.eq(meal.as_str()));
    }
    query
}

fn feedback(filter: &MessFeedbackFilter) -> mess_feedback::BoxedQuery<'static, Pg> {
    let mut query = filter_by_hostel!(
        mess_feedback::table.into_boxed(),
        mess_feedback::hostel_id,
        &filter.scope.hostels
    );
    if let Some(owner) = filter.scope.owner {
        query = query.filter(mess_feedback::student_id.eq(*owner.as_uuid()));
    }
    if let Some(meal) = filter.meal {
        query = query.filter(mess_feedback::meal.eq(meal.as_str()));
    }
    query
}

// Meals sort by their position in the day, not alphabetically.
const MEAL_ORDER: &str = "CASE meal WHEN 'breakfast' THEN 0 WHEN 'lunch' THEN 1 \
                          WHEN 'snacks' THEN 2 ELSE 3 END";

#[async_trait]
impl MessMenuRepository for DieselMessRepository {
    async fn list(
        &self,
        filter: &MessMenuFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessMenu>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = menus(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<MessMenuRow> = menus(filter)
            .select(MessMenuRow::as_select())
            .order(mess_menus::date.asc())
            .then_order_by(diesel::dsl::sql::<diesel::sql_types::Integer>(MEAL_ORDER))
            .then_order_by(mess_menus::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(MessMenu::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &MessMenuId) -> Result<Option<MessMenu>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        mess_menus::table
            .find(id.as_uuid())
            .select(MessMenuRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(MessMenu::try_from)
            .transpose()
    }

    async fn insert(&self, menu: &MessMenu) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(mess_menus::table)
            .values(MessMenuRow::from(menu))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, menu: &MessMenu, expected_revision: u32) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *menu.id.as_uuid();
        let updated = diesel::update(mess_menus::table)
            .filter(
                mess_menus::id
                    .eq(id)
                    .and(mess_menus::revision.eq(cast_revision_for_db(expected_revision))),
            )
            .set(MessMenuRow::from(menu))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated > 0 {
            return Ok(());
        }

        let current: Option<i32> = mess_menus::table
            .find(id)
            .select(mess_menus::revision)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Err(disambiguate_update_failure(
            current,
            expected_revision,
            "menu not found",
        ))
    }

    async fn delete(&self, id: &MessMenuId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(mess_menus::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl MessAttendanceRepository for DieselMessRepository {
    async fn list(
        &self,
        filter: &MessAttendanceFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessAttendance>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = attendance(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<MessAttendanceRow> = attendance(filter)
            .select(MessAttendanceRow::as_select())
            .order(mess_attendance::date.desc())
            .then_order_by(diesel::dsl::sql::<diesel::sql_types::Integer>(MEAL_ORDER))
            .then_order_by(mess_attendance::id.asc())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(MessAttendance::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &AttendanceId) -> Result<Option<MessAttendance>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        mess_attendance::table
            .find(id.as_uuid())
            .select(MessAttendanceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(MessAttendance::try_from)
            .transpose()
    }

    async fn insert(&self, mark: &MessAttendance) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(mess_attendance::table)
            .values(MessAttendanceRow::from(mark))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &AttendanceId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(mess_attendance::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[async_trait]
impl MessFeedbackRepository for DieselMessRepository {
    async fn list(
        &self,
        filter: &MessFeedbackFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessFeedback>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = feedback(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<MessFeedbackRow> = feedback(filter)
            .select(MessFeedbackRow::as_select())
            .order((mess_feedback::created_at.desc(), mess_feedback::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(MessFeedback::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &FeedbackId) -> Result<Option<MessFeedback>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        mess_feedback::table
            .find(id.as_uuid())
            .select(MessFeedbackRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(MessFeedback::try_from)
            .transpose()
    }

    async fn insert(&self, entry: &MessFeedback) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(mess_feedback::table)
            .values(MessFeedbackRow::from(entry))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(mess_feedback::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
