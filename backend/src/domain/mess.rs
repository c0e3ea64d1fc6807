//! Mess (dining hall) menus, attendance and feedback.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    AttendanceId, FeedbackId, HostelFilter, HostelId, MessMenuId, Principal, RecordScope, UserId,
    choice_enum,
};

choice_enum! {
    /// Meal slot of the day.
    pub enum Meal {
        /// Morning meal.
        Breakfast => "breakfast",
        /// Midday meal.
        Lunch => "lunch",
        /// Evening snacks.
        Snacks => "snacks",
        /// Evening meal.
        Dinner => "dinner",
    }
}

/// Menu for one meal on one day.
///
/// ## Invariants
/// - Unique per `(hostel_id, date, meal)`.
/// - `items` is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessMenu {
    /// Identifier.
    pub id: MessMenuId,
    /// Hostel mess; `None` for the central mess.
    pub hostel_id: Option<HostelId>,
    /// Day served.
    pub date: NaiveDate,
    /// Meal slot.
    pub meal: Meal,
    /// Dishes served.
    pub items: Vec<String>,
    /// Author.
    pub created_by: UserId,
    /// Optimistic concurrency revision.
    pub revision: u32,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last update instant.
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessMenu {
    /// Requested hostel.
    pub hostel_id: Option<HostelId>,
    /// Day served.
    pub date: NaiveDate,
    /// Meal slot.
    pub meal: Meal,
    /// Dishes served.
    pub items: Vec<String>,
}

/// Partial update for a menu.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessMenuPatch {
    /// New day.
    pub date: Option<NaiveDate>,
    /// New meal slot.
    pub meal: Option<Meal>,
    /// New dishes.
    pub items: Option<Vec<String>>,
    /// Revision the client last saw.
    pub expected_revision: Option<u32>,
}

impl MessMenu {
    /// Materialise a new menu.
    pub fn create(
        id: MessMenuId,
        input: NewMessMenu,
        hostel_id: Option<HostelId>,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            hostel_id,
            date: input.date,
            meal: input.meal,
            items: input.items,
            created_by,
            revision: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an already-authorised patch.
    pub fn apply(&mut self, patch: MessMenuPatch, now: DateTime<Utc>) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(meal) = patch.meal {
            self.meal = meal;
        }
        if let Some(items) = patch.items {
            self.items = items;
        }
        self.revision += 1;
        self.updated_at = now;
    }

    /// Whether `other` occupies the same `(hostel, date, meal)` slot.
    pub fn same_slot(&self, other: &Self) -> bool {
        self.hostel_id == other.hostel_id && self.date == other.date && self.meal == other.meal
    }
}

/// Caller-supplied list criteria for menus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessMenuCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Exact day.
    pub date: Option<NaiveDate>,
    /// Earliest day, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest day, inclusive.
    pub to: Option<NaiveDate>,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessMenuCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> MessMenuFilter {
        MessMenuFilter {
            hostels: HostelFilter::for_principal(principal, self.hostel_id),
            date: self.date,
            from: self.from,
            to: self.to,
            meal: self.meal,
        }
    }
}

/// List filter for menus. Ordered by date, then meal slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessMenuFilter {
    /// Hostel visibility.
    pub hostels: HostelFilter,
    /// Exact day.
    pub date: Option<NaiveDate>,
    /// Earliest day, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest day, inclusive.
    pub to: Option<NaiveDate>,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessMenuFilter {
    /// Unfiltered view bounded by `hostels`.
    pub fn visible(hostels: HostelFilter) -> Self {
        Self {
            hostels,
            date: None,
            from: None,
            to: None,
            meal: None,
        }
    }

    /// Whether `menu` passes every predicate.
    pub fn matches(&self, menu: &MessMenu) -> bool {
        self.hostels.permits(menu.hostel_id.as_ref())
            && self.date.is_none_or(|date| menu.date == date)
            && self.from.is_none_or(|from| menu.date >= from)
            && self.to.is_none_or(|to| menu.date <= to)
            && self.meal.is_none_or(|meal| menu.meal == meal)
    }
}

/// Attendance mark for one student at one meal.
///
/// Unique per `(student_id, date, meal)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessAttendance {
    /// Identifier.
    pub id: AttendanceId,
    /// Student marked.
    pub student_id: UserId,
    /// Student's hostel.
    pub hostel_id: Option<HostelId>,
    /// Day.
    pub date: NaiveDate,
    /// Meal slot.
    pub meal: Meal,
    /// Whether the student ate.
    pub present: bool,
    /// Who recorded the mark.
    pub recorded_by: UserId,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Validated input for an attendance mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessAttendance {
    /// Student to mark; students always mark themselves.
    pub student_id: Option<UserId>,
    /// Day.
    pub date: NaiveDate,
    /// Meal slot.
    pub meal: Meal,
    /// Whether the student ate.
    pub present: bool,
}

impl MessAttendance {
    /// Whether `other` marks the same `(student, date, meal)` slot.
    pub fn same_slot(&self, other: &Self) -> bool {
        self.student_id == other.student_id && self.date == other.date && self.meal == other.meal
    }
}

/// Caller-supplied list criteria for attendance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessAttendanceCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Explicit student.
    pub student_id: Option<UserId>,
    /// Exact day.
    pub date: Option<NaiveDate>,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessAttendanceCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> MessAttendanceFilter {
        MessAttendanceFilter {
            scope: RecordScope::personal(principal, self.hostel_id, self.student_id),
            date: self.date,
            meal: self.meal,
        }
    }
}

/// List filter for attendance. Ordered newest day first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessAttendanceFilter {
    /// Hostel and owner visibility.
    pub scope: RecordScope,
    /// Exact day.
    pub date: Option<NaiveDate>,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessAttendanceFilter {
    /// Unfiltered view bounded by `scope`.
    pub fn visible(scope: RecordScope) -> Self {
        Self {
            scope,
            date: None,
            meal: None,
        }
    }

    /// Whether `mark` passes every predicate.
    pub fn matches(&self, mark: &MessAttendance) -> bool {
        self.scope.permits(mark.hostel_id.as_ref(), &mark.student_id)
            && self.date.is_none_or(|date| mark.date == date)
            && self.meal.is_none_or(|meal| mark.meal == meal)
    }
}

/// Error raised when a rating falls outside `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("rating must be between {min} and {max}", min = Rating::MIN, max = Rating::MAX)]
pub struct RatingOutOfRange;

/// Feedback score from 1 (poor) to 5 (excellent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    /// Lowest score.
    pub const MIN: u8 = 1;
    /// Highest score.
    pub const MAX: u8 = 5;

    /// Validate a score.
    pub fn new(value: u8) -> Result<Self, RatingOutOfRange> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingOutOfRange)
        }
    }

    /// Numeric score.
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = RatingOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(value: Rating) -> Self {
        value.0
    }
}

/// Feedback left by a student about the mess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessFeedback {
    /// Identifier.
    pub id: FeedbackId,
    /// Author.
    pub student_id: UserId,
    /// Author's hostel.
    pub hostel_id: Option<HostelId>,
    /// Day the feedback concerns.
    pub date: NaiveDate,
    /// Meal concerned, if specific.
    pub meal: Option<Meal>,
    /// Score.
    pub rating: Rating,
    /// Free-form comment.
    pub comment: Option<String>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
}

/// Validated input for feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessFeedback {
    /// Day concerned.
    pub date: NaiveDate,
    /// Meal concerned.
    pub meal: Option<Meal>,
    /// Score.
    pub rating: Rating,
    /// Free-form comment.
    pub comment: Option<String>,
}

/// Caller-supplied list criteria for feedback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessFeedbackCriteria {
    /// Explicit hostel.
    pub hostel_id: Option<HostelId>,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessFeedbackCriteria {
    /// Combine with the caller's visibility.
    pub fn scoped(self, principal: &Principal) -> MessFeedbackFilter {
        MessFeedbackFilter {
            scope: RecordScope::personal(principal, self.hostel_id, None),
            meal: self.meal,
        }
    }
}

/// List filter for feedback. Ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessFeedbackFilter {
    /// Hostel and owner visibility.
    pub scope: RecordScope,
    /// Meal slot.
    pub meal: Option<Meal>,
}

impl MessFeedbackFilter {
    /// Unfiltered view bounded by `scope`.
    pub fn visible(scope: RecordScope) -> Self {
        Self { scope, meal: None }
    }

    /// Whether `feedback` passes every predicate.
    pub fn matches(&self, feedback: &MessFeedback) -> bool {
        self.scope.permits(feedback.hostel_id.as_ref(), &feedback.student_id)
            && self.meal.is_none_or(|meal| feedback.meal == Some(meal))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).single().expect("valid time")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    #[rstest]
    #[case(0, false)]
    #[case(1, true)]
    #[case(5, true)]
    #[case(6, false)]
    fn ratings_are_bounded(#[case] value: u8, #[case] valid: bool) {
        assert_eq!(Rating::new(value).is_ok(), valid);
    }

    #[rstest]
    fn rating_error_names_the_range() {
        assert_eq!(RatingOutOfRange.to_string(), "rating must be between 1 and 5");
    }

    #[rstest]
    fn rating_deserialisation_is_checked() {
        assert!(serde_json::from_str::<Rating>("4").is_ok());
        assert!(serde_json::from_str::<Rating>("9").is_err());
    }

    #[rstest]
    fn menu_slots_compare_hostel_date_and_meal() {
        let hostel = Some(HostelId::random());
        let input = NewMessMenu {
            hostel_id: hostel,
            date: day(1),
            meal: Meal::Lunch,
            items: vec!["Dal".to_owned()],
        };
        let first = MessMenu::create(MessMenuId::random(), input.clone(), hostel, UserId::random(), now());
        let mut second = MessMenu::create(MessMenuId::random(), input, hostel, UserId::random(), now());
        assert!(first.same_slot(&second));
        second.apply(
            MessMenuPatch {
                meal: Some(Meal::Dinner),
                ..MessMenuPatch::default()
            },
            now(),
        );
        assert!(!first.same_slot(&second));
        assert_eq!(second.revision, 2);
    }

    #[rstest]
    fn menu_filter_range_is_inclusive() {
        let menu = MessMenu::create(
            MessMenuId::random(),
            NewMessMenu {
                hostel_id: None,
                date: day(5),
                meal: Meal::Breakfast,
                items: vec!["Poha".to_owned()],
            },
            None,
            UserId::random(),
            now(),
        );
        let mut filter = MessMenuFilter::visible(HostelFilter::Any);
        filter.from = Some(day(5));
        filter.to = Some(day(5));
        assert!(filter.matches(&menu));
        filter.to = Some(day(4));
        assert!(!filter.matches(&menu));
    }
}
