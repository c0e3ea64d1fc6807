//! PostgreSQL-backed `NotificationRepository` implementation using Diesel ORM.
//!
//! Read flags live in the `read_by` array. Marking a notification read
//! appends the viewer with `array_append` so concurrent readers never
//! overwrite each other's flags.

use async_trait::async_trait;
use diesel::dsl::not;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::{Array, Uuid as SqlUuid};
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::ports::{Listing, NotificationRepository, RepositoryError};
use crate::domain::{HostelFilter, Notification, NotificationFilter, NotificationId, UserId};

use super::diesel_helpers::{cast_count, map_diesel_error, map_pool_error, page_bounds};
use super::models::NotificationRow;
use super::pool::DbPool;
use super::schema::notifications;

diesel::define_sql_function! {
    fn array_append(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

diesel::define_sql_function! {
    fn array_remove(array: Array<SqlUuid>, element: SqlUuid) -> Array<SqlUuid>;
}

/// Diesel-backed notification storage.
#[derive(Clone)]
pub struct DieselNotificationRepository {
    pool: DbPool,
}

impl DieselNotificationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Direct notifications for the recipient plus broadcasts the audience may see.
fn filtered(filter: &NotificationFilter) -> notifications::BoxedQuery<'static, Pg> {
    use notifications::{hostel_id, user_id};

    let recipient = *filter.audience.recipient.as_uuid();
    let query = notifications::table.into_boxed();
    let direct = user_id.eq(recipient);
    let mut query = match filter.audience.broadcasts {
        HostelFilter::Any => query.filter(direct.or(user_id.is_null())),
        HostelFilter::Nothing
        | HostelFilter::Only {
            hostel: None,
            include_general: false,
        } => query.filter(direct),
        HostelFilter::Only {
            hostel: None,
            include_general: true,
        } => query.filter(direct.or(user_id.is_null().and(hostel_id.is_null()))),
        HostelFilter::Only {
            hostel: Some(hostel),
            include_general: true,
        } => query.filter(
            direct.or(user_id
                .is_null()
                .and(hostel_id.eq(*hostel.as_uuid()).or(hostel_id.is_null()))),
        ),
        HostelFilter::Only {
            hostel: Some(hostel),
            include_general: false,
        } => query.filter(direct.or(user_id.is_null().and(hostel_id.eq(*hostel.as_uuid())))),
    };
    if let Some(category) = filter.category {
        query = query.filter(notifications::category.eq(category.as_str()));
    }
    if filter.unread_only {
        query = query.filter(not(notifications::read_by.contains(vec![recipient])));
    }
    query
}

#[async_trait]
impl NotificationRepository for DieselNotificationRepository {
    async fn list(
        &self,
        filter: &NotificationFilter,
        page: &PageRequest,
    ) -> Result<Listing<Notification>, RepositoryError> {
        let (limit, offset) = page_bounds(page)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rows: Vec<NotificationRow> = filtered(filter)
            .select(NotificationRow::as_select())
            .order((notifications::created_at.desc(), notifications::id.desc()))
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let items = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Listing::new(items, cast_count(total)))
    }

    async fn find(&self, id: &NotificationId) -> Result<Option<Notification>, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        notifications::table
            .find(id.as_uuid())
            .select(NotificationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
            .map(Notification::try_from)
            .transpose()
    }

    async fn insert(&self, notification: &Notification) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(notifications::table)
            .values(NotificationRow::from(notification))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn set_read(
        &self,
        id: &NotificationId,
        viewer: &UserId,
        read: bool,
    ) -> Result<(), RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *id.as_uuid();
        let viewer = *viewer.as_uuid();

        let changed = if read {
            diesel::update(
                notifications::table
                    .find(id)
                    .filter(not(notifications::read_by.contains(vec![viewer]))),
            )
            .set(notifications::read_by.eq(array_append(notifications::read_by, viewer)))
            .execute(&mut conn)
            .await
        } else {
            diesel::update(notifications::table.find(id))
                .set(notifications::read_by.eq(array_remove(notifications::read_by, viewer)))
                .execute(&mut conn)
                .await
        }
        .map_err(map_diesel_error)?;
        if changed > 0 {
            return Ok(());
        }

        let exists: Option<Uuid> = notifications::table
            .find(id)
            .select(notifications::id)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        match exists {
            Some(_) => Ok(()),
            None => Err(RepositoryError::missing("notification not found")),
        }
    }

    async fn mark_all_read(&self, filter: &NotificationFilter) -> Result<u64, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipient = *filter.audience.recipient.as_uuid();
        let filter = filter.clone();

        let changed = conn
            .transaction(|conn| {
                async move {
                    let pending: Vec<Uuid> = filtered(&filter)
                        .filter(not(notifications::read_by.contains(vec![recipient])))
                        .select(notifications::id)
                        .load(conn)
                        .await?;
                    if pending.is_empty() {
                        return Ok(0);
                    }
                    let targets = notifications::table.filter(notifications::id.eq_any(pending));
                    diesel::update(targets)
                        .set(
                            notifications::read_by
                                .eq(array_append(notifications::read_by, recipient)),
                        )
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(u64::try_from(changed).unwrap_or(u64::MAX))
    }

    async fn delete(&self, id: &NotificationId) -> Result<bool, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(notifications::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}
