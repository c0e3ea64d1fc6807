//! Notifications addressed to a user or broadcast to a hostel.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Audience, HostelId, NotificationId, Principal, UserId, choice_enum};

choice_enum! {
    /// Topic of a notification.
    pub enum NotificationCategory {
        /// Default topic.
        General => "general",
        /// Official announcements.
        Announcement => "announcement",
        /// Event reminders.
        Event => "event",
        /// Complaint updates.
        Complaint => "complaint",
        /// Leave decisions.
        Leave => "leave",
        /// Mess updates.
        Mess => "mess",
        /// Urgent safety messages.
        Emergency => "emergency",
    }
}

impl Default for NotificationCategory {
    fn default() -> Self {
        Self::General
    }
}

/// A notification.
///
/// `user_id == None` marks a broadcast: to `hostel_id`, or to everyone when
/// that is also `None`. Read state is tracked per viewer in `read_by`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Identifier.
    pub id: NotificationId,
    /// Direct recipient.
    pub user_id: Option<UserId>,
    /// Target hostel for broadcasts.
    pub hostel_id: Option<HostelId>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Topic.
    pub category: NotificationCategory,
    /// Sender.
    pub created_by: UserId,
    /// Viewers who have read it.
    pub read_by: BTreeSet<UserId>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    /// Direct recipient.
    pub user_id: Option<UserId>,
    /// Target hostel.
    pub hostel_id: Option<HostelId>,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Topic.
    pub category: NotificationCategory,
}

impl Notification {
    /// Materialise a new notification.
    pub fn create(
        id: NotificationId,
        input: NewNotification,
        hostel_id: Option<HostelId>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id: input.user_id,
            hostel_id,
            title: input.title,
            message: input.message,
            category: input.category,
            created_by,
            read_by: BTreeSet::new(),
            created_at: now,
        }
    }

    /// Whether `viewer` has read the notification.
    pub fn is_read_by(&self, viewer: &UserId) -> bool {
        self.read_by.contains(viewer)
    }

    /// Set the read flag for `viewer`. Returns whether anything changed.
    pub fn set_read(&mut self, viewer: UserId, read: bool) -> bool {
        if read {
            self.read_by.insert(viewer)
        } else {
            self.read_by.remove(&viewer)
        }
    }
}

/// Caller-supplied list criteria for notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationCriteria {
    /// Only this topic.
    pub category: Option<NotificationCategory>,
    /// Only unread notifications.
    pub unread_only: bool,
}

impl NotificationCriteria {
    /// Combine with the caller's audience.
    pub fn scoped(self, principal: &Principal) -> NotificationFilter {
        NotificationFilter {
            audience: Audience::for_principal(principal),
            category: self.category,
            unread_only: self.unread_only,
        }
    }
}

/// List filter for notifications. Ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationFilter {
    /// Who is looking.
    pub audience: Audience,
    /// Only this topic.
    pub category: Option<NotificationCategory>,
    /// Only notifications the viewer has not read.
    pub unread_only: bool,
}

impl NotificationFilter {
    /// Everything visible to `audience`.
    pub fn visible(audience: Audience) -> Self {
        Self {
            audience,
            category: None,
            unread_only: false,
        }
    }

    /// Whether `notification` passes every predicate.
    pub fn matches(&self, notification: &Notification) -> bool {
        self.audience
            .permits(notification.user_id.as_ref(), notification.hostel_id.as_ref())
            && self.category.is_none_or(|category| notification.category == category)
            && !(self.unread_only && notification.is_read_by(&self.audience.recipient))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::HostelFilter;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn broadcast() -> Notification {
        Notification::create(
            NotificationId::random(),
            NewNotification {
                user_id: None,
                hostel_id: None,
                title: "Water outage".to_owned(),
                message: "No water 10:00-12:00".to_owned(),
                category: NotificationCategory::Announcement,
            },
            None,
            UserId::random(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).single().expect("valid time"),
        )
    }

    #[rstest]
    fn read_state_is_per_viewer(mut broadcast: Notification) {
        let alice = UserId::random();
        let bob = UserId::random();
        assert!(broadcast.set_read(alice, true));
        assert!(!broadcast.set_read(alice, true));
        assert!(broadcast.is_read_by(&alice));
        assert!(!broadcast.is_read_by(&bob));
        assert!(broadcast.set_read(alice, false));
        assert!(!broadcast.is_read_by(&alice));
    }

    #[rstest]
    fn unread_filter_hides_read_items(mut broadcast: Notification) {
        let viewer = UserId::random();
        let mut filter = NotificationFilter::visible(Audience {
            recipient: viewer,
            broadcasts: HostelFilter::Any,
        });
        filter.unread_only = true;
        assert!(filter.matches(&broadcast));
        broadcast.set_read(viewer, true);
        assert!(!filter.matches(&broadcast));
    }
}
