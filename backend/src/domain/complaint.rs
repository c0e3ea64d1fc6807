//! Resident complaints.
//!
//! Complaints always belong to a hostel. Content may be edited by the author
//! while the complaint is pending; staff manage assignment, resolution and
//! status (see [`super::transitions`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ComplaintId, HostelFilter, HostelId, Principal, UserId, choice_enum};

choice_enum! {
    /// Area the complaint concerns.
    pub enum ComplaintCategory {
        /// General building upkeep.
        Maintenance => "maintenance",
        /// Wiring, lights, sockets.
        Electrical => "electrical",
        /// Water and drainage.
        Plumbing => "plumbing",
        /// Housekeeping.
        Cleanliness => "cleanliness",
        /// Mess and canteen.
        Food => "food",
        /// Safety and access control.
        Security => "security",
        /// Network connectivity.
        Internet => "internet",
        /// Anything else.
        Other => "other",
    }
}

choice_enum! {
    /// Urgency assigned by the author.
    pub enum ComplaintPriority {
        /// Can wait.
        Low => "low",
        /// Normal handling.
        Medium => "medium",
        /// Needs attention soon.
        High => "high",
        /// Needs attention now.
        Urgent => "urgent",
    }
}

impl Default for ComplaintPriority {
    fn default() -> Self {
        Self::Medium
    }
}

choice_enum! {
    /// Handling status.
    pub enum ComplaintStatus {
        /// Filed, not yet picked up.
        Pending => "pending",
        /// Being worked on.
        InProgress => "in-progress",
        /// Fixed. Terminal.
        Resolved => "resolved",
        /// Declined. Terminal.
        Rejected => "rejected",
    }
}

/// A complaint filed by a resident or staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    /// Identifier.
    pub id: ComplaintId,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Area concerned.
    pub category: ComplaintCategory,
    /// Urgency.
    pub priority: ComplaintPriority,
    /// Handling status.
    pub status: ComplaintStatus,
    /// Hostel the complaint belongs to.
    pub hostel_id: HostelId,
    /// Room concerned, if any.
    pub room_number: Option<String>,
    /// Author.
    pub created_by: UserId,
    /// Staff member handling it.
    pub assigned_to: Option<UserId>,
    /// Resolution notes.
    pub resolution: Option<String>,
    /// When the complaint reached `resolved`.
    pub resolved_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency revision.
    pub revision: u32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new complaint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComplaint {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// Area concerned.
    pub category: ComplaintCategory,
    /// Urgency.
    pub priority: ComplaintPriority,
    /// Requested hostel; required for admins.
    pub hostel_id: Option<HostelId>,
    /// Room concerned.
    pub room_number: Option<String>,
}

/// Partial update for a complaint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintPatch {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New category.
    pub category: Option<ComplaintCategory>,
    /// New priority.
    pub priority: Option<ComplaintPriority>,
    /// New room.
    pub room_number: Option<Option<String>>,
    /// Requested status.
    pub status: Option<ComplaintStatus>,
    /// New assignee.
    pub assigned_to: Option<Option<UserId>>,
    /// New resolution notes.
    pub resolution: Option<Option<String>>,
    /// Revision the client last saw.
    pub expected_revision: Option<u32>,
}

impl ComplaintPatch {
    /// Whether the patch edits author-owned content.
    pub fn touches_content(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.category.is_some()
            || self.priority.is_some()
            || self.room_number.is_some()
    }

    /// Whether the patch edits staff-managed fields other than status.
    pub fn touches_handling(&self) -> bool {
        self.assigned_to.is_some() || self.resolution.is_some()
    }
}

impl Complaint {
    /// Materialise a new pending complaint.
    pub fn create(
        id: ComplaintId,
        input: NewComplaint,
        hostel_id: HostelId,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            category: input.category,
            priority: input.priority,
            status: ComplaintStatus::Pending,
            hostel_id,
            room_number: input.room_number,
            created_by,
            assigned_to: None,
            resolution: None,
            resolved_at: None,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an already-authorised patch.
    pub fn apply(&mut self, patch: ComplaintPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(room_number) = patch.room_number {
            self.room_number = room_number;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(resolution) = patch.resolution {
            self.resolution = resolution;
        }
        if let Some(status) = patch.status {
            self.resolved_at = match status {
                ComplaintStatus::Resolved if self.status == ComplaintStatus::Resolved => {
                    self.resolved_at.or(Some(now))
                }
                ComplaintStatus::Resolved => Some(now),
                _ => None,
            };
            self.status = status;
        }
        self.revision += 1;
        self.updated_at = now;
    }
}

/// Caller-supplied list criteria for complaints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplaintCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Only this status.
    pub status: Option<ComplaintStatus>,
    /// Only this category.
    pub category: Option<ComplaintCategory>,
    /// Only this priority.
    pub priority: Option<ComplaintPriority>,
}

impl ComplaintCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> ComplaintFilter {
        ComplaintFilter {
            hostels: HostelFilter::for_principal(principal, self.hostel_id),
            status: self.status,
            category: self.category,
            priority: self.priority,
        }
    }
}

/// List filter for complaints. Ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintFilter {
    /// Hostel visibility.
    pub hostels: HostelFilter,
    /// Only this status.
    pub status: Option<ComplaintStatus>,
    /// Only this category.
    pub category: Option<ComplaintCategory>,
    /// Only this priority.
    pub priority: Option<ComplaintPriority>,
}

impl ComplaintFilter {
    /// Unfiltered view bounded by `hostels`.
    pub fn visible(hostels: HostelFilter) -> Self {
        Self {
            hostels,
            status: None,
            category: None,
            priority: None,
        }
    }

    /// Whether `complaint` passes every predicate.
    pub fn matches(&self, complaint: &Complaint) -> bool {
        self.hostels.permits(Some(&complaint.hostel_id))
            && self.status.is_none_or(|status| complaint.status == status)
            && self.category.is_none_or(|category| complaint.category == category)
            && self.priority.is_none_or(|priority| complaint.priority == priority)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, hour, 0, 0).single().expect("valid time")
    }

    #[fixture]
    fn complaint() -> Complaint {
        Complaint::create(
            ComplaintId::random(),
            NewComplaint {
                title: "Leaking tap".to_owned(),
                description: "Bathroom tap drips all night".to_owned(),
                category: ComplaintCategory::Plumbing,
                priority: ComplaintPriority::default(),
                hostel_id: None,
                room_number: Some("B-12".to_owned()),
            },
            HostelId::random(),
            UserId::random(),
            at(8),
        )
    }

    #[rstest]
    fn new_complaints_are_pending(complaint: Complaint) {
        assert_eq!(complaint.status, ComplaintStatus::Pending);
        assert_eq!(complaint.priority, ComplaintPriority::Medium);
        assert_eq!(complaint.revision, 1);
    }

    #[rstest]
    fn resolving_stamps_resolved_at(mut complaint: Complaint) {
        complaint.apply(
            ComplaintPatch {
                status: Some(ComplaintStatus::Resolved),
                resolution: Some(Some("Washer replaced".to_owned())),
                ..ComplaintPatch::default()
            },
            at(12),
        );
        assert_eq!(complaint.resolved_at, Some(at(12)));
        assert_eq!(complaint.resolution.as_deref(), Some("Washer replaced"));
        assert_eq!(complaint.revision, 2);
    }

    #[rstest]
    fn reopening_clears_resolved_at(mut complaint: Complaint) {
        complaint.status = ComplaintStatus::Resolved;
        complaint.resolved_at = Some(at(9));
        complaint.apply(
            ComplaintPatch {
                status: Some(ComplaintStatus::InProgress),
                ..ComplaintPatch::default()
            },
            at(12),
        );
        assert_eq!(complaint.resolved_at, None);
    }

    #[rstest]
    fn in_progress_uses_hyphenated_token() {
        let json = serde_json::to_value(ComplaintStatus::InProgress).expect("serialise");
        assert_eq!(json, serde_json::json!("in-progress"));
    }

    #[rstest]
    fn patch_classifies_fields() {
        let content = ComplaintPatch {
            title: Some("x".to_owned()),
            ..ComplaintPatch::default()
        };
        assert!(content.touches_content());
        assert!(!content.touches_handling());

        let handling = ComplaintPatch {
            assigned_to: Some(None),
            ..ComplaintPatch::default()
        };
        assert!(handling.touches_handling());
        assert!(!handling.touches_content());
    }

    #[rstest]
    fn filter_matches_on_every_predicate(complaint: Complaint) {
        let mut filter = ComplaintFilter::visible(HostelFilter::Any);
        filter.category = Some(ComplaintCategory::Plumbing);
        assert!(filter.matches(&complaint));
        filter.status = Some(ComplaintStatus::Resolved);
        assert!(!filter.matches(&complaint));
    }
}
