//! Notification domain service.
//!
//! Admins notify anyone; wardens broadcast to their own hostel or message a
//! resident of it directly. Read flags are per viewer and never bump any
//! revision.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{
    NotificationCommand, NotificationQuery, NotificationRepository, UserDirectory,
    map_repository_error,
};
use super::service_support::{ensure_visible, found, not_permitted};
use super::{
    Audience, Error, HostelId, NewNotification, Notification, NotificationCriteria,
    NotificationId, Principal, User, UserId,
};

const ENTITY: &str = "Notification";

/// Notification service implementing the notification driving ports.
#[derive(Clone)]
pub struct NotificationService<R, D> {
    repo: Arc<R>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<R, D> NotificationService<R, D> {
    /// Create a new service.
    pub fn new(repo: Arc<R>, directory: Arc<D>, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo,
            directory,
            clock,
        }
    }
}

impl<R, D> NotificationService<R, D>
where
    R: NotificationRepository,
    D: UserDirectory,
{
    async fn load_visible(
        &self,
        principal: &Principal,
        id: &NotificationId,
    ) -> Result<Notification, Error> {
        let notification = found(
            self.repo.find(id).await.map_err(map_repository_error)?,
            ENTITY,
        )?;
        ensure_visible(
            Audience::for_principal(principal).permits(
                notification.user_id.as_ref(),
                notification.hostel_id.as_ref(),
            ),
            ENTITY,
        )?;
        Ok(notification)
    }

    async fn recipient(&self, id: &UserId) -> Result<User, Error> {
        self.directory
            .find_user(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::invalid_request("userId does not match any user")
                    .with_details(["userId does not match any user"])
            })
    }

    /// Resolve the stored hostel for `input`, enforcing who may send what.
    async fn target_hostel(
        &self,
        principal: &Principal,
        input: &NewNotification,
    ) -> Result<Option<HostelId>, Error> {
        if principal.is_student() {
            return Err(Error::forbidden("Students cannot send notifications"));
        }
        let recipient = match input.user_id {
            Some(id) => Some(self.recipient(&id).await?),
            None => None,
        };
        if principal.is_admin() {
            return Ok(input
                .hostel_id
                .or_else(|| recipient.and_then(|user| user.hostel_id)));
        }

        let own = principal
            .hostel_id
            .ok_or_else(|| Error::forbidden("You are not assigned to a hostel"))?;
        if input.hostel_id.is_some_and(|hostel| hostel != own) {
            return Err(Error::forbidden(
                "Wardens may only notify their own hostel",
            ));
        }
        if let Some(user) = recipient
            && user.hostel_id != Some(own)
        {
            return Err(Error::forbidden(
                "Wardens may only message residents of their own hostel",
            ));
        }
        Ok(Some(own))
    }
}

#[async_trait]
impl<R, D> NotificationQuery for NotificationService<R, D>
where
    R: NotificationRepository,
    D: UserDirectory,
{
    async fn list(
        &self,
        principal: &Principal,
        criteria: NotificationCriteria,
        page: PageRequest,
    ) -> Result<Page<Notification>, Error> {
        let filter = criteria.scoped(principal);
        let listing = self
            .repo
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn get(&self, principal: &Principal, id: &NotificationId) -> Result<Notification, Error> {
        self.load_visible(principal, id).await
    }
}

#[async_trait]
impl<R, D> NotificationCommand for NotificationService<R, D>
where
    R: NotificationRepository,
    D: UserDirectory,
{
    async fn create(
        &self,
        principal: &Principal,
        input: NewNotification,
    ) -> Result<Notification, Error> {
        let hostel = self.target_hostel(principal, &input).await?;
        let notification = Notification::create(
            NotificationId::random(),
            input,
            hostel,
            principal.user_id,
            self.clock.utc(),
        );
        self.repo
            .insert(&notification)
            .await
            .map_err(map_repository_error)?;
        info!(
            notification_id = %notification.id,
            direct = notification.user_id.is_some(),
            "notification sent"
        );
        Ok(notification)
    }

    async fn set_read(
        &self,
        principal: &Principal,
        id: &NotificationId,
        read: bool,
    ) -> Result<Notification, Error> {
        let mut notification = self.load_visible(principal, id).await?;
        self.repo
            .set_read(&notification.id, &principal.user_id, read)
            .await
            .map_err(map_repository_error)?;
        notification.set_read(principal.user_id, read);
        Ok(notification)
    }

    async fn mark_all_read(&self, principal: &Principal) -> Result<u64, Error> {
        let filter = NotificationCriteria {
            unread_only: true,
            ..NotificationCriteria::default()
        }
        .scoped(principal);
        let changed = self
            .repo
            .mark_all_read(&filter)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = %principal.user_id, changed, "notifications marked read");
        Ok(changed)
    }

    async fn delete(&self, principal: &Principal, id: &NotificationId) -> Result<(), Error> {
        let notification = self.load_visible(principal, id).await?;
        let recipient = notification
            .user_id
            .is_some_and(|user| principal.is(&user));
        if !(principal.is_admin() || principal.is(&notification.created_by) || recipient) {
            return Err(not_permitted("delete", ENTITY));
        }
        if !self
            .repo
            .delete(&notification.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Notification not found"));
        }
        info!(notification_id = %notification.id, "notification deleted");
        Ok(())
    }
}
