//! Student leave requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::DATE_ORDER_MESSAGE;
use super::{Error, HostelId, LeaveRequestId, Principal, RecordScope, UserId, choice_enum};

choice_enum! {
    /// Reason category for the absence.
    pub enum LeaveType {
        /// Visiting home.
        Home => "home",
        /// Medical treatment.
        Medical => "medical",
        /// Family or other emergency.
        Emergency => "emergency",
        /// Personal errands.
        Personal => "personal",
        /// Conferences, field trips.
        Academic => "academic",
        /// Anything else.
        Other => "other",
    }
}

choice_enum! {
    /// Decision status.
    pub enum LeaveStatus {
        /// Awaiting a decision.
        Pending => "pending",
        /// Granted. Terminal.
        Approved => "approved",
        /// Refused. Terminal.
        Rejected => "rejected",
    }
}

/// A request by a student to be away from the hostel.
///
/// ## Invariants
/// - `start_date < end_date`.
/// - `approved_by` and `decided_at` are set exactly when the status is
///   terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    /// Identifier.
    pub id: LeaveRequestId,
    /// Requesting student.
    pub student_id: UserId,
    /// Student's hostel at filing time.
    pub hostel_id: Option<HostelId>,
    /// Reason category.
    #[serde(rename = "type")]
    pub leave_type: LeaveType,
    /// Free-form reason.
    pub reason: String,
    /// First instant away.
    pub start_date: DateTime<Utc>,
    /// Return instant.
    pub end_date: DateTime<Utc>,
    /// Where the student will be.
    pub destination: Option<String>,
    /// Decision status.
    pub status: LeaveStatus,
    /// Staff member who decided.
    pub approved_by: Option<UserId>,
    /// Decision remarks.
    pub remarks: Option<String>,
    /// When the decision was made.
    pub decided_at: Option<DateTime<Utc>>,
    /// Optimistic concurrency revision.
    pub revision: u32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new leave request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLeaveRequest {
    /// Reason category.
    pub leave_type: LeaveType,
    /// Free-form reason.
    pub reason: String,
    /// First instant away.
    pub start_date: DateTime<Utc>,
    /// Return instant.
    pub end_date: DateTime<Utc>,
    /// Where the student will be.
    pub destination: Option<String>,
}

/// Partial update for a leave request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeavePatch {
    /// New reason category.
    pub leave_type: Option<LeaveType>,
    /// New reason.
    pub reason: Option<String>,
    /// New start.
    pub start_date: Option<DateTime<Utc>>,
    /// New end.
    pub end_date: Option<DateTime<Utc>>,
    /// New destination.
    pub destination: Option<Option<String>>,
    /// Requested decision.
    pub status: Option<LeaveStatus>,
    /// Decision remarks.
    pub remarks: Option<Option<String>>,
    /// Revision the client last saw.
    pub expected_revision: Option<u32>,
}

impl LeavePatch {
    /// Whether the patch edits either date.
    pub fn touches_dates(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }

    /// Whether the patch edits owner content other than dates.
    pub fn touches_content(&self) -> bool {
        self.leave_type.is_some() || self.reason.is_some() || self.destination.is_some()
    }
}

impl LeaveStatus {
    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl LeaveRequest {
    /// Materialise a new pending request for `student_id`.
    pub fn create(
        id: LeaveRequestId,
        input: NewLeaveRequest,
        student_id: UserId,
        hostel_id: Option<HostelId>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            student_id,
            hostel_id,
            leave_type: input.leave_type,
            reason: input.reason,
            start_date: input.start_date,
            end_date: input.end_date,
            destination: input.destination,
            status: LeaveStatus::Pending,
            approved_by: None,
            remarks: None,
            decided_at: None,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an already-authorised patch. `decided_by` records the caller
    /// when the patch carries a decision.
    pub fn apply(&mut self, patch: LeavePatch, decided_by: UserId, now: DateTime<Utc>) -> Result<(), Error> {
        let start = patch.start_date.unwrap_or(self.start_date);
        let end = patch.end_date.unwrap_or(self.end_date);
        if start >= end {
            return Err(Error::invalid_request(DATE_ORDER_MESSAGE).with_details([DATE_ORDER_MESSAGE]));
        }

        if let Some(leave_type) = patch.leave_type {
            self.leave_type = leave_type;
        }
        if let Some(reason) = patch.reason {
            self.reason = reason;
        }
        if let Some(destination) = patch.destination {
            self.destination = destination;
        }
        if let Some(remarks) = patch.remarks {
            self.remarks = remarks;
        }
        if let Some(status) = patch.status {
            self.status = status;
            self.approved_by = Some(decided_by);
            self.decided_at = Some(now);
        }
        self.start_date = start;
        self.end_date = end;
        self.revision += 1;
        self.updated_at = now;
        Ok(())
    }
}

/// Caller-supplied list criteria for leave requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeaveCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Explicit student.
    pub student_id: Option<UserId>,
    /// Only this status.
    pub status: Option<LeaveStatus>,
    /// Only this reason category.
    pub leave_type: Option<LeaveType>,
}

impl LeaveCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> LeaveFilter {
        LeaveFilter {
            scope: RecordScope::personal(principal, self.hostel_id, self.student_id),
            status: self.status,
            leave_type: self.leave_type,
        }
    }
}

/// List filter for leave requests. Ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveFilter {
    /// Hostel and owner visibility.
    pub scope: RecordScope,
    /// Only this status.
    pub status: Option<LeaveStatus>,
    /// Only this reason category.
    pub leave_type: Option<LeaveType>,
}

impl LeaveFilter {
    /// Unfiltered view bounded by `scope`.
    pub fn visible(scope: RecordScope) -> Self {
        Self {
            scope,
            status: None,
            leave_type: None,
        }
    }

    /// Whether `request` passes every predicate.
    pub fn matches(&self, request: &LeaveRequest) -> bool {
        self.scope.permits(request.hostel_id.as_ref(), &request.student_id)
            && self.status.is_none_or(|status| request.status == status)
            && self.leave_type.is_none_or(|kind| request.leave_type == kind)
    }
}
