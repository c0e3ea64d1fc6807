//! Status transition rules for complaints and leave requests.
//!
//! The checks here are pure decisions; services apply the write when a move
//! is allowed. Authorisation is always decided before the move itself, so a
//! caller who may not act learns nothing about the record's status.
//!
//! Complaint graph:
//!
//! ```text
//! pending ──► in-progress ──► resolved
//!    │              └───────► rejected
//!    ├──► resolved
//!    └──► rejected
//! ```
//!
//! Leave graph: `pending ──► approved | rejected`, both terminal.

use super::{ComplaintStatus, Error, HostelId, LeaveStatus, Principal};

/// Why a status change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionDenied {
    /// The caller may not change this record's status.
    Forbidden,
    /// The caller may act but the requested move is not permitted.
    Invalid {
        /// Current status token.
        from: &'static str,
        /// Requested status token.
        to: &'static str,
    },
    /// The record is decided and its dates can no longer change.
    Frozen {
        /// Current status token.
        status: &'static str,
    },
}

impl TransitionDenied {
    /// Convert to a domain error naming the `entity` kind.
    pub fn into_error(self, entity: &str) -> Error {
        match self {
            Self::Forbidden => {
                Error::forbidden(format!("You are not allowed to change the status of this {entity}"))
            }
            Self::Invalid { from, to } => Error::invalid_transition(format!(
                "Cannot change {entity} status from {from} to {to}"
            )),
            Self::Frozen { status } => Error::invalid_transition(format!(
                "Dates of a {status} {entity} can no longer be changed"
            )),
        }
    }
}

impl ComplaintStatus {
    /// Statuses reachable in one forward step.
    pub fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::InProgress, Self::Resolved, Self::Rejected],
            Self::InProgress => &[Self::Resolved, Self::Rejected],
            Self::Resolved | Self::Rejected => &[],
        }
    }

    /// Whether the status has no forward successors.
    pub fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }
}

/// Decide whether `principal` may move a complaint in `hostel` from `from`
/// to `to`.
///
/// Admins may set any status at any time. The hostel's warden follows the
/// forward graph. Everyone else, the author included, is refused.
///
/// # Examples
/// ```
/// use hostel_backend::domain::{
///     ComplaintStatus, HostelId, Principal, Role, TransitionDenied, UserId,
///     complaint_transition,
/// };
///
/// let hostel = HostelId::random();
/// let warden = Principal::new(UserId::random(), Role::Warden, Some(hostel));
/// assert!(complaint_transition(
///     &warden, &hostel, ComplaintStatus::Pending, ComplaintStatus::InProgress
/// ).is_ok());
/// assert!(matches!(
///     complaint_transition(&warden, &hostel, ComplaintStatus::Resolved, ComplaintStatus::Pending),
///     Err(TransitionDenied::Invalid { .. })
/// ));
/// ```
pub fn complaint_transition(
    principal: &Principal,
    hostel: &HostelId,
    from: ComplaintStatus,
    to: ComplaintStatus,
) -> Result<(), TransitionDenied> {
    if principal.is_admin() {
        return Ok(());
    }
    if !principal.is_warden_of(Some(hostel)) {
        return Err(TransitionDenied::Forbidden);
    }
    if from.successors().contains(&to) {
        Ok(())
    } else {
        Err(TransitionDenied::Invalid {
            from: from.as_str(),
            to: to.as_str(),
        })
    }
}

/// Decide whether `principal` may move a leave request in `hostel` from
/// `from` to `to`.
///
/// Only admins and the hostel's warden decide, and only while the request is
/// pending. Terminal requests refuse every move, admin included.
pub fn leave_transition(
    principal: &Principal,
    hostel: Option<&HostelId>,
    from: LeaveStatus,
    to: LeaveStatus,
) -> Result<(), TransitionDenied> {
    if !principal.manages(hostel) {
        return Err(TransitionDenied::Forbidden);
    }
    match (from, to) {
        (LeaveStatus::Pending, LeaveStatus::Approved | LeaveStatus::Rejected) => Ok(()),
        _ => Err(TransitionDenied::Invalid {
            from: from.as_str(),
            to: to.as_str(),
        }),
    }
}

/// Leave dates freeze once a decision has been made.
pub fn leave_dates_editable(status: LeaveStatus) -> Result<(), TransitionDenied> {
    if status.is_terminal() {
        Err(TransitionDenied::Frozen {
            status: status.as_str(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the transition rules.
    use super::*;
    use crate::domain::{ErrorCode, Role, UserId};
    use rstest::{fixture, rstest};

    #[fixture]
    fn hostel() -> HostelId {
        HostelId::random()
    }

    fn warden_of(hostel: HostelId) -> Principal {
        Principal::new(UserId::random(), Role::Warden, Some(hostel))
    }

    fn admin() -> Principal {
        Principal::new(UserId::random(), Role::Admin, None)
    }

    #[rstest]
    #[case(ComplaintStatus::Pending, ComplaintStatus::InProgress)]
    #[case(ComplaintStatus::Pending, ComplaintStatus::Resolved)]
    #[case(ComplaintStatus::Pending, ComplaintStatus::Rejected)]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Resolved)]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Rejected)]
    fn wardens_follow_the_forward_graph(
        hostel: HostelId,
        #[case] from: ComplaintStatus,
        #[case] to: ComplaintStatus,
    ) {
        assert_eq!(complaint_transition(&warden_of(hostel), &hostel, from, to), Ok(()));
    }

    #[rstest]
    #[case(ComplaintStatus::InProgress, ComplaintStatus::Pending)]
    #[case(ComplaintStatus::Resolved, ComplaintStatus::InProgress)]
    #[case(ComplaintStatus::Rejected, ComplaintStatus::Pending)]
    #[case(ComplaintStatus::Pending, ComplaintStatus::Pending)]
    fn wardens_cannot_move_backwards_or_stay(
        hostel: HostelId,
        #[case] from: ComplaintStatus,
        #[case] to: ComplaintStatus,
    ) {
        let denied = complaint_transition(&warden_of(hostel), &hostel, from, to)
            .expect_err("disallowed move");
        assert_eq!(
            denied,
            TransitionDenied::Invalid {
                from: from.as_str(),
                to: to.as_str()
            }
        );
    }

    #[rstest]
    fn admins_override_the_graph(hostel: HostelId) {
        assert_eq!(
            complaint_transition(&admin(), &hostel, ComplaintStatus::Resolved, ComplaintStatus::Pending),
            Ok(())
        );
    }

    #[rstest]
    fn students_cannot_change_complaint_status(hostel: HostelId) {
        let student = Principal::new(UserId::random(), Role::Student, Some(hostel));
        assert_eq!(
            complaint_transition(&student, &hostel, ComplaintStatus::Pending, ComplaintStatus::Resolved),
            Err(TransitionDenied::Forbidden)
        );
    }

    #[rstest]
    fn foreign_wardens_are_forbidden_before_validity(hostel: HostelId) {
        let outsider = warden_of(HostelId::random());
        assert_eq!(
            complaint_transition(&outsider, &hostel, ComplaintStatus::Resolved, ComplaintStatus::Pending),
            Err(TransitionDenied::Forbidden)
        );
    }

    #[rstest]
    #[case(LeaveStatus::Approved)]
    #[case(LeaveStatus::Rejected)]
    fn pending_leave_can_be_decided(hostel: HostelId, #[case] to: LeaveStatus) {
        assert_eq!(
            leave_transition(&warden_of(hostel), Some(&hostel), LeaveStatus::Pending, to),
            Ok(())
        );
        assert_eq!(leave_transition(&admin(), Some(&hostel), LeaveStatus::Pending, to), Ok(()));
    }

    #[rstest]
    #[case(LeaveStatus::Approved, LeaveStatus::Rejected)]
    #[case(LeaveStatus::Rejected, LeaveStatus::Approved)]
    #[case(LeaveStatus::Approved, LeaveStatus::Pending)]
    #[case(LeaveStatus::Approved, LeaveStatus::Approved)]
    fn decided_leave_is_final_even_for_admins(
        hostel: HostelId,
        #[case] from: LeaveStatus,
        #[case] to: LeaveStatus,
    ) {
        let denied = leave_transition(&admin(), Some(&hostel), from, to).expect_err("terminal");
        assert!(matches!(denied, TransitionDenied::Invalid { .. }));
    }

    #[rstest]
    fn students_cannot_decide_leave(hostel: HostelId) {
        let student = Principal::new(UserId::random(), Role::Student, Some(hostel));
        assert_eq!(
            leave_transition(&student, Some(&hostel), LeaveStatus::Pending, LeaveStatus::Approved),
            Err(TransitionDenied::Forbidden)
        );
    }

    #[rstest]
    fn dates_freeze_after_decision() {
        assert_eq!(leave_dates_editable(LeaveStatus::Pending), Ok(()));
        assert_eq!(
            leave_dates_editable(LeaveStatus::Approved),
            Err(TransitionDenied::Frozen { status: "approved" })
        );
    }

    #[rstest]
    fn denials_map_to_error_codes() {
        assert_eq!(
            TransitionDenied::Forbidden.into_error("complaint").code(),
            ErrorCode::Forbidden
        );
        let err = TransitionDenied::Invalid {
            from: "approved",
            to: "rejected",
        }
        .into_error("leave request");
        assert_eq!(err.code(), ErrorCode::InvalidTransition);
        assert_eq!(err.message(), "Cannot change leave request status from approved to rejected");
    }
}
