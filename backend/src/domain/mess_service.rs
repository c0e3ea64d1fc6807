//! Mess domain service: menus, attendance and feedback.
//!
//! Menus are staff-managed and visible like events. Attendance and feedback
//! are personal records: students see their own, wardens their hostel's.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use pagination::{Page, PageRequest};
use tracing::info;

use super::ports::{
    MessAttendanceRepository, MessCommand, MessFeedbackRepository, MessMenuRepository, MessQuery,
    UserDirectory, map_repository_error,
};
use super::service_support::{
    check_revision, empty_page, ensure_visible, found, not_permitted, staff_target_hostel,
};
use super::{
    AttendanceId, Error, FeedbackId, HostelFilter, HostelId, MessAttendance,
    MessAttendanceCriteria, MessFeedback, MessFeedbackCriteria, MessMenu, MessMenuCriteria,
    MessMenuId, MessMenuPatch, NewMessAttendance, NewMessFeedback, NewMessMenu, Principal, Role,
    UserId,
};

const MENU: &str = "Menu";
const ATTENDANCE: &str = "Attendance record";
const FEEDBACK: &str = "Feedback";
const ITEMS_REQUIRED: &str = "items must contain at least one dish";

/// Repositories backing [`MessService`].
pub struct MessRepositories<M, A, F> {
    /// Menu storage.
    pub menus: Arc<M>,
    /// Attendance storage.
    pub attendance: Arc<A>,
    /// Feedback storage.
    pub feedback: Arc<F>,
}

/// Mess service implementing the mess driving ports.
pub struct MessService<M, A, F, D> {
    menus: Arc<M>,
    attendance: Arc<A>,
    feedback: Arc<F>,
    directory: Arc<D>,
    clock: Arc<dyn Clock>,
}

impl<M, A, F, D> Clone for MessService<M, A, F, D> {
    fn clone(&self) -> Self {
        Self {
            menus: Arc::clone(&self.menus),
            attendance: Arc::clone(&self.attendance),
            feedback: Arc::clone(&self.feedback),
            directory: Arc::clone(&self.directory),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<M, A, F, D> MessService<M, A, F, D> {
    /// Create a new service.
    pub fn new(
        repositories: MessRepositories<M, A, F>,
        directory: Arc<D>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            menus: repositories.menus,
            attendance: repositories.attendance,
            feedback: repositories.feedback,
            directory,
            clock,
        }
    }
}

fn ensure_items(items: &[String]) -> Result<(), Error> {
    if items.iter().any(|item| !item.trim().is_empty()) {
        Ok(())
    } else {
        Err(Error::invalid_request(ITEMS_REQUIRED).with_details([ITEMS_REQUIRED]))
    }
}

impl<M, A, F, D> MessService<M, A, F, D>
where
    M: MessMenuRepository,
    A: MessAttendanceRepository,
    F: MessFeedbackRepository,
    D: UserDirectory,
{
    async fn load_menu(&self, principal: &Principal, id: &MessMenuId) -> Result<MessMenu, Error> {
        let menu = found(
            self.menus.find(id).await.map_err(map_repository_error)?,
            MENU,
        )?;
        ensure_visible(
            HostelFilter::for_principal(principal, None).permits(menu.hostel_id.as_ref()),
            MENU,
        )?;
        Ok(menu)
    }

    async fn load_managed_menu(
        &self,
        principal: &Principal,
        id: &MessMenuId,
        action: &str,
    ) -> Result<MessMenu, Error> {
        let menu = self.load_menu(principal, id).await?;
        if !principal.manages(menu.hostel_id.as_ref()) {
            return Err(not_permitted(action, MENU));
        }
        Ok(menu)
    }

    /// Resolve who an attendance mark is for and which hostel it lands in.
    async fn attendance_subject(
        &self,
        principal: &Principal,
        requested: Option<UserId>,
    ) -> Result<(UserId, Option<HostelId>), Error> {
        if principal.is_student() {
            return match requested {
                Some(student) if !principal.is(&student) => Err(Error::forbidden(
                    "Students may only mark their own attendance",
                )),
                _ => Ok((principal.user_id, principal.hostel_id)),
            };
        }

        let student_id = requested.ok_or_else(|| {
            Error::invalid_request("studentId is required").with_details(["studentId is required"])
        })?;
        let student = self
            .directory
            .find_user(&student_id)
            .await
            .map_err(map_repository_error)?
            .filter(|user| user.role == Role::Student)
            .ok_or_else(|| {
                Error::invalid_request("studentId does not match any student")
                    .with_details(["studentId does not match any student"])
            })?;
        if !principal.manages(student.hostel_id.as_ref()) {
            return Err(Error::forbidden(
                "Wardens may only record attendance for their own hostel",
            ));
        }
        Ok((student.id, student.hostel_id))
    }
}

#[async_trait]
impl<M, A, F, D> MessQuery for MessService<M, A, F, D>
where
    M: MessMenuRepository,
    A: MessAttendanceRepository,
    F: MessFeedbackRepository,
    D: UserDirectory,
{
    async fn list_menus(
        &self,
        principal: &Principal,
        criteria: MessMenuCriteria,
        page: PageRequest,
    ) -> Result<Page<MessMenu>, Error> {
        let filter = criteria.scoped(principal);
        if filter.hostels.is_empty() {
            return Ok(empty_page(page));
        }
        let listing = self
            .menus
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn get_menu(&self, principal: &Principal, id: &MessMenuId) -> Result<MessMenu, Error> {
        self.load_menu(principal, id).await
    }

    async fn list_attendance(
        &self,
        principal: &Principal,
        criteria: MessAttendanceCriteria,
        page: PageRequest,
    ) -> Result<Page<MessAttendance>, Error> {
        let filter = criteria.scoped(principal);
        if filter.scope.is_empty() {
            return Ok(empty_page(page));
        }
        let listing = self
            .attendance
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }

    async fn list_feedback(
        &self,
        principal: &Principal,
        criteria: MessFeedbackCriteria,
        page: PageRequest,
    ) -> Result<Page<MessFeedback>, Error> {
        let filter = criteria.scoped(principal);
        if filter.scope.is_empty() {
            return Ok(empty_page(page));
        }
        let listing = self
            .feedback
            .list(&filter, &page)
            .await
            .map_err(map_repository_error)?;
        Ok(listing.into_page(page))
    }
}

#[async_trait]
impl<M, A, F, D> MessCommand for MessService<M, A, F, D>
where
    M: MessMenuRepository,
    A: MessAttendanceRepository,
    F: MessFeedbackRepository,
    D: UserDirectory,
{
    async fn create_menu(&self, principal: &Principal, input: NewMessMenu) -> Result<MessMenu, Error> {
        let hostel = staff_target_hostel(principal, input.hostel_id, MENU)?;
        ensure_items(&input.items)?;
        let menu = MessMenu::create(
            MessMenuId::random(),
            input,
            hostel,
            principal.user_id,
            self.clock.utc(),
        );
        self.menus
            .insert(&menu)
            .await
            .map_err(map_repository_error)?;
        info!(menu_id = %menu.id, date = %menu.date, meal = menu.meal.as_str(), "mess menu published");
        Ok(menu)
    }

    async fn update_menu(
        &self,
        principal: &Principal,
        id: &MessMenuId,
        patch: MessMenuPatch,
    ) -> Result<MessMenu, Error> {
        let mut menu = self.load_managed_menu(principal, id, "update").await?;
        if let Some(items) = &patch.items {
            ensure_items(items)?;
        }
        check_revision(patch.expected_revision, menu.revision)?;
        let read_revision = menu.revision;
        menu.apply(patch, self.clock.utc());
        self.menus
            .update(&menu, read_revision)
            .await
            .map_err(map_repository_error)?;
        Ok(menu)
    }

    async fn delete_menu(&self, principal: &Principal, id: &MessMenuId) -> Result<(), Error> {
        let menu = self.load_managed_menu(principal, id, "delete").await?;
        if !self
            .menus
            .delete(&menu.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Menu not found"));
        }
        info!(menu_id = %menu.id, "mess menu deleted");
        Ok(())
    }

    async fn mark_attendance(
        &self,
        principal: &Principal,
        input: NewMessAttendance,
    ) -> Result<MessAttendance, Error> {
        let (student_id, hostel_id) = self.attendance_subject(principal, input.student_id).await?;
        let mark = MessAttendance {
            id: AttendanceId::random(),
            student_id,
            hostel_id,
            date: input.date,
            meal: input.meal,
            present: input.present,
            recorded_by: principal.user_id,
            created_at: self.clock.utc(),
        };
        self.attendance
            .insert(&mark)
            .await
            .map_err(map_repository_error)?;
        info!(attendance_id = %mark.id, student_id = %mark.student_id, "attendance recorded");
        Ok(mark)
    }

    async fn delete_attendance(&self, principal: &Principal, id: &AttendanceId) -> Result<(), Error> {
        let mark = found(
            self.attendance
                .find(id)
                .await
                .map_err(map_repository_error)?,
            ATTENDANCE,
        )?;
        if !principal.manages(mark.hostel_id.as_ref()) {
            return Err(not_permitted("delete", ATTENDANCE));
        }
        if !self
            .attendance
            .delete(&mark.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Attendance record not found"));
        }
        Ok(())
    }

    async fn submit_feedback(
        &self,
        principal: &Principal,
        input: NewMessFeedback,
    ) -> Result<MessFeedback, Error> {
        if !principal.is_student() {
            return Err(Error::forbidden("Only students can submit feedback"));
        }
        let feedback = MessFeedback {
            id: FeedbackId::random(),
            student_id: principal.user_id,
            hostel_id: principal.hostel_id,
            date: input.date,
            meal: input.meal,
            rating: input.rating,
            comment: input.comment,
            created_at: self.clock.utc(),
        };
        self.feedback
            .insert(&feedback)
            .await
            .map_err(map_repository_error)?;
        info!(feedback_id = %feedback.id, rating = feedback.rating.get(), "mess feedback submitted");
        Ok(feedback)
    }

    async fn delete_feedback(&self, principal: &Principal, id: &FeedbackId) -> Result<(), Error> {
        let feedback = found(
            self.feedback.find(id).await.map_err(map_repository_error)?,
            FEEDBACK,
        )?;
        if !principal.manages(feedback.hostel_id.as_ref()) {
            return Err(not_permitted("delete", FEEDBACK));
        }
        if !self
            .feedback
            .delete(&feedback.id)
            .await
            .map_err(map_repository_error)?
        {
            return Err(Error::not_found("Feedback not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Service-level coverage with mocked ports.
    use super::*;
    use crate::domain::ports::{
        MockMessAttendanceRepository, MockMessFeedbackRepository, MockMessMenuRepository,
        MockUserDirectory, RepositoryError,
    };
    use crate::domain::test_support::{admin, fixture_clock, student_of, warden_of};
    use crate::domain::{ErrorCode, Meal, Rating, User};
    use chrono::NaiveDate;
    use rstest::rstest;

    type Service = MessService<
        MockMessMenuRepository,
        MockMessAttendanceRepository,
        MockMessFeedbackRepository,
        MockUserDirectory,
    >;

    #[derive(Default)]
    struct Mocks {
        menus: MockMessMenuRepository,
        attendance: MockMessAttendanceRepository,
        feedback: MockMessFeedbackRepository,
        directory: MockUserDirectory,
    }

    impl Mocks {
        fn into_service(self) -> Service {
            MessService::new(
                MessRepositories {
                    menus: Arc::new(self.menus),
                    attendance: Arc::new(self.attendance),
                    feedback: Arc::new(self.feedback),
                },
                Arc::new(self.directory),
                fixture_clock(),
            )
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid day")
    }

    fn new_menu(items: &[&str]) -> NewMessMenu {
        NewMessMenu {
            hostel_id: None,
            date: day(),
            meal: Meal::Lunch,
            items: items.iter().map(|item| (*item).to_owned()).collect(),
        }
    }

    fn student_record(hostel: HostelId) -> User {
        User {
            id: UserId::random(),
            username: "ravi".to_owned(),
            display_name: "Ravi K".to_owned(),
            role: Role::Student,
            hostel_id: Some(hostel),
            room_number: None,
        }
    }

    #[rstest]
    #[tokio::test]
    async fn menus_need_at_least_one_dish() {
        let err = Mocks::default()
            .into_service()
            .create_menu(&admin(), new_menu(&["  "]))
            .await
            .expect_err("empty");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_menu_slots_conflict() {
        let mut mocks = Mocks::default();
        mocks
            .menus
            .expect_insert()
            .return_once(|_| Err(RepositoryError::duplicate("menu slot taken")));

        let err = mocks
            .into_service()
            .create_menu(&warden_of(HostelId::random()), new_menu(&["Dal", "Rice"]))
            .await
            .expect_err("duplicate");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn students_cannot_publish_menus() {
        let err = Mocks::default()
            .into_service()
            .create_menu(&student_of(HostelId::random()), new_menu(&["Dal"]))
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn students_mark_only_themselves() {
        let student = student_of(HostelId::random());
        let err = Mocks::default()
            .into_service()
            .mark_attendance(
                &student,
                NewMessAttendance {
                    student_id: Some(UserId::random()),
                    date: day(),
                    meal: Meal::Dinner,
                    present: true,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn wardens_record_attendance_for_their_residents() {
        let hostel = HostelId::random();
        let resident = student_record(hostel);
        let resident_id = resident.id;
        let warden = warden_of(hostel);
        let warden_id = warden.user_id;
        let mut mocks = Mocks::default();
        mocks
            .directory
            .expect_find_user()
            .return_once(move |_| Ok(Some(resident)));
        mocks
            .attendance
            .expect_insert()
            .withf(move |mark| {
                mark.student_id == resident_id
                    && mark.recorded_by == warden_id
                    && mark.hostel_id == Some(hostel)
            })
            .times(1)
            .return_once(|_| Ok(()));

        mocks
            .into_service()
            .mark_attendance(
                &warden,
                NewMessAttendance {
                    student_id: Some(resident_id),
                    date: day(),
                    meal: Meal::Breakfast,
                    present: false,
                },
            )
            .await
            .expect("recorded");
    }

    #[rstest]
    #[tokio::test]
    async fn wardens_cannot_record_for_other_hostels() {
        let resident = student_record(HostelId::random());
        let resident_id = resident.id;
        let mut mocks = Mocks::default();
        mocks
            .directory
            .expect_find_user()
            .return_once(move |_| Ok(Some(resident)));

        let err = mocks
            .into_service()
            .mark_attendance(
                &warden_of(HostelId::random()),
                NewMessAttendance {
                    student_id: Some(resident_id),
                    date: day(),
                    meal: Meal::Breakfast,
                    present: true,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn only_students_leave_feedback() {
        let err = Mocks::default()
            .into_service()
            .submit_feedback(
                &admin(),
                NewMessFeedback {
                    date: day(),
                    meal: None,
                    rating: Rating::new(4).expect("rating"),
                    comment: None,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn feedback_is_stamped_with_the_students_hostel() {
        let hostel = HostelId::random();
        let student = student_of(hostel);
        let mut mocks = Mocks::default();
        mocks
            .feedback
            .expect_insert()
            .withf(move |feedback| feedback.hostel_id == Some(hostel))
            .times(1)
            .return_once(|_| Ok(()));

        let feedback = mocks
            .into_service()
            .submit_feedback(
                &student,
                NewMessFeedback {
                    date: day(),
                    meal: Some(Meal::Snacks),
                    rating: Rating::new(5).expect("rating"),
                    comment: Some("Great samosas".to_owned()),
                },
            )
            .await
            .expect("submitted");
        assert_eq!(feedback.student_id, student.user_id);
    }
}
