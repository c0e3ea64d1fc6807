//! Role-based visibility filter.
//!
//! Every list and single-record read is narrowed by a [`HostelFilter`]
//! derived from the caller. Admins see everything matching their explicit
//! filters; wardens and students see their own hostel plus general records
//! (`hostel_id == None`). Personal records (leave requests, mess attendance,
//! mess feedback) are additionally narrowed to the owner for students.

use super::{HostelId, Principal, UserId};

/// Effective hostel predicate applied to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostelFilter {
    /// No hostel restriction.
    Any,
    /// Matches no record at all.
    Nothing,
    /// Records in `hostel`, plus general records when `include_general`.
    Only {
        /// Hostel to match; `None` matches only general records.
        hostel: Option<HostelId>,
        /// Whether records without a hostel also match.
        include_general: bool,
    },
}

impl HostelFilter {
    /// Compute the filter for `principal`, ANDed with an optional explicit
    /// hostel requested by the caller.
    ///
    /// # Examples
    /// ```
    /// use hostel_backend::domain::{HostelFilter, HostelId, Principal, Role, UserId};
    ///
    /// let own = HostelId::random();
    /// let student = Principal::new(UserId::random(), Role::Student, Some(own));
    /// let filter = HostelFilter::for_principal(&student, None);
    /// assert!(filter.permits(Some(&own)));
    /// assert!(filter.permits(None));
    /// assert!(!filter.permits(Some(&HostelId::random())));
    /// ```
    pub fn for_principal(principal: &Principal, requested: Option<HostelId>) -> Self {
        if principal.is_admin() {
            return match requested {
                None => Self::Any,
                Some(hostel) => Self::Only {
                    hostel: Some(hostel),
                    include_general: false,
                },
            };
        }

        match requested {
            None => Self::Only {
                hostel: principal.hostel_id,
                include_general: true,
            },
            Some(hostel) if principal.hostel_id == Some(hostel) => Self::Only {
                hostel: Some(hostel),
                include_general: false,
            },
            Some(_) => Self::Nothing,
        }
    }

    /// Whether a record in `hostel` passes the filter.
    pub fn permits(&self, hostel: Option<&HostelId>) -> bool {
        match (self, hostel) {
            (Self::Any, _) => true,
            (Self::Nothing, _) => false,
            (Self::Only { include_general, .. }, None) => *include_general,
            (Self::Only { hostel: wanted, .. }, Some(actual)) => wanted.as_ref() == Some(actual),
        }
    }

    /// Whether the filter can never match, letting adapters skip the query.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Nothing => true,
            Self::Only {
                hostel: None,
                include_general: false,
            } => true,
            _ => false,
        }
    }
}

/// Filter for records that belong to an individual resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordScope {
    /// Hostel predicate.
    pub hostels: HostelFilter,
    /// Owner restriction; `Some` for students, who only see their own.
    pub owner: Option<UserId>,
}

impl RecordScope {
    /// Scope for shared records: hostel filtering only.
    pub fn shared(principal: &Principal, requested_hostel: Option<HostelId>) -> Self {
        Self {
            hostels: HostelFilter::for_principal(principal, requested_hostel),
            owner: None,
        }
    }

    /// Scope for personal records. Students are pinned to themselves;
    /// staff may narrow to a particular owner.
    pub fn personal(
        principal: &Principal,
        requested_hostel: Option<HostelId>,
        requested_owner: Option<UserId>,
    ) -> Self {
        let hostels = HostelFilter::for_principal(principal, requested_hostel);
        if principal.is_student() {
            let hostels = match requested_owner {
                Some(owner) if owner != principal.user_id => HostelFilter::Nothing,
                _ => hostels,
            };
            return Self {
                hostels,
                owner: Some(principal.user_id),
            };
        }
        Self {
            hostels,
            owner: requested_owner,
        }
    }

    /// Whether a record in `hostel` owned by `owner` is visible.
    pub fn permits(&self, hostel: Option<&HostelId>, owner: &UserId) -> bool {
        self.hostels.permits(hostel) && self.owner.is_none_or(|wanted| &wanted == owner)
    }

    /// Whether the scope can never match.
    pub fn is_empty(&self) -> bool {
        self.hostels.is_empty()
    }
}

/// Audience predicate for notifications.
///
/// A notification is visible when it is addressed to the caller, or when it
/// is a broadcast whose hostel passes the caller's hostel filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Audience {
    /// The caller.
    pub recipient: UserId,
    /// Hostel predicate for broadcasts.
    pub broadcasts: HostelFilter,
}

impl Audience {
    /// Audience of `principal`.
    pub fn for_principal(principal: &Principal) -> Self {
        Self {
            recipient: principal.user_id,
            broadcasts: HostelFilter::for_principal(principal, None),
        }
    }

    /// Whether a notification addressed to `user` in `hostel` is visible.
    pub fn permits(&self, user: Option<&UserId>, hostel: Option<&HostelId>) -> bool {
        match user {
            Some(user) => user == &self.recipient,
            None => self.broadcasts.permits(hostel),
        }
    }
}
