//! Helpers shared by the record services.
//!
//! Services resolve a record, check it against the caller's visibility
//! filter, then check write permission and the optional revision guard
//! before mutating anything.

use pagination::{Page, PageRequest};

use super::ports::{Listing, revision_conflict};
use super::{Error, HostelId, Principal, UserId};

/// Resolve an optional lookup into the record or a `not_found` error.
pub(crate) fn found<T>(record: Option<T>, entity: &str) -> Result<T, Error> {
    record.ok_or_else(|| Error::not_found(format!("{entity} not found")))
}

/// Turn a visibility decision into a `forbidden` error.
pub(crate) fn ensure_visible(visible: bool, entity: &str) -> Result<(), Error> {
    if visible {
        Ok(())
    } else {
        Err(Error::forbidden(format!(
            "You do not have access to this {}",
            entity.to_lowercase()
        )))
    }
}

/// Whether `principal` may edit or delete a record in `hostel` created by
/// `creator`: admins, the hostel's warden and the creator.
pub(crate) fn may_manage(principal: &Principal, hostel: Option<&HostelId>, creator: &UserId) -> bool {
    principal.manages(hostel) || principal.is(creator)
}

/// Forbidden error for a write the caller may not perform.
pub(crate) fn not_permitted(action: &str, entity: &str) -> Error {
    Error::forbidden(format!(
        "You are not allowed to {action} this {}",
        entity.to_lowercase()
    ))
}

/// Compare the client's expected revision with the stored one.
pub(crate) fn check_revision(expected: Option<u32>, actual: u32) -> Result<(), Error> {
    match expected {
        Some(expected) if expected != actual => Err(revision_conflict(Some(expected), actual)),
        _ => Ok(()),
    }
}

/// Resolve the hostel a staff member writes into.
///
/// Admins may target any hostel or none. Wardens default to their own hostel
/// and may not target another; a warden without a hostel may not write.
pub(crate) fn staff_target_hostel(
    principal: &Principal,
    requested: Option<HostelId>,
    entity: &str,
) -> Result<Option<HostelId>, Error> {
    if principal.is_admin() {
        return Ok(requested);
    }
    if principal.is_student() {
        return Err(Error::forbidden(format!(
            "Students cannot create {}",
            plural(entity)
        )));
    }
    let own = principal
        .hostel_id
        .ok_or_else(|| Error::forbidden("You are not assigned to a hostel"))?;
    match requested {
        None => Ok(Some(own)),
        Some(hostel) if hostel == own => Ok(Some(hostel)),
        Some(_) => Err(Error::forbidden(format!(
            "Wardens may only create {} for their own hostel",
            plural(entity)
        ))),
    }
}

/// Empty page returned when the visibility filter can never match.
pub(crate) fn empty_page<T>(page: PageRequest) -> Page<T> {
    Listing::empty().into_page(page)
}

fn plural(entity: &str) -> String {
    format!("{}s", entity.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, Role};
    use rstest::rstest;

    #[rstest]
    fn hidden_records_are_forbidden() {
        let err = ensure_visible(false, "Event").expect_err("hidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "You do not have access to this event");
    }

    #[rstest]
    #[case(None, 3, true)]
    #[case(Some(3), 3, true)]
    #[case(Some(2), 3, false)]
    fn revision_guard(#[case] expected: Option<u32>, #[case] actual: u32, #[case] ok: bool) {
        assert_eq!(check_revision(expected, actual).is_ok(), ok);
    }

    #[rstest]
    fn wardens_default_to_their_hostel() {
        let own = HostelId::random();
        let warden = Principal::new(UserId::random(), Role::Warden, Some(own));
        assert_eq!(staff_target_hostel(&warden, None, "Event").expect("own"), Some(own));
        let err = staff_target_hostel(&warden, Some(HostelId::random()), "Event")
            .expect_err("foreign hostel");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(HostelId::random()))]
    fn unassigned_wardens_cannot_write(#[case] requested: Option<HostelId>) {
        let warden = Principal::new(UserId::random(), Role::Warden, None);
        let err = staff_target_hostel(&warden, requested, "Event").expect_err("no hostel");
        assert_eq!(err.code(), ErrorCode::Forbidden);
        assert_eq!(err.message(), "You are not assigned to a hostel");
    }

    #[rstest]
    fn admins_may_write_general_records() {
        let admin = Principal::new(UserId::random(), Role::Admin, None);
        assert_eq!(staff_target_hostel(&admin, None, "Event").expect("general"), None);
    }

    #[rstest]
    fn students_cannot_write_staff_records() {
        let student = Principal::new(UserId::random(), Role::Student, Some(HostelId::random()));
        let err = staff_target_hostel(&student, None, "Event").expect_err("student");
        assert_eq!(err.message(), "Students cannot create events");
    }

    #[rstest]
    fn creators_manage_their_own_records() {
        let student = Principal::new(UserId::random(), Role::Student, Some(HostelId::random()));
        assert!(may_manage(&student, None, &student.user_id));
        assert!(!may_manage(&student, None, &UserId::random()));
    }
}
