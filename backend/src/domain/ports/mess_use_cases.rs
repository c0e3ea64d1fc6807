//! Driving ports for mess use-cases: menus, attendance and feedback.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{
    AttendanceId, Error, FeedbackId, MessAttendance, MessAttendanceCriteria, MessFeedback,
    MessFeedbackCriteria, MessMenu, MessMenuCriteria, MessMenuId, MessMenuPatch,
    NewMessAttendance, NewMessFeedback, NewMessMenu, Principal,
};

/// Read-side mess operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessQuery: Send + Sync {
    /// List menus visible to `principal`.
    async fn list_menus(
        &self,
        principal: &Principal,
        criteria: MessMenuCriteria,
        page: PageRequest,
    ) -> Result<Page<MessMenu>, Error>;

    /// Fetch one menu.
    async fn get_menu(&self, principal: &Principal, id: &MessMenuId) -> Result<MessMenu, Error>;

    /// List attendance marks visible to `principal`.
    async fn list_attendance(
        &self,
        principal: &Principal,
        criteria: MessAttendanceCriteria,
        page: PageRequest,
    ) -> Result<Page<MessAttendance>, Error>;

    /// List feedback visible to `principal`.
    async fn list_feedback(
        &self,
        principal: &Principal,
        criteria: MessFeedbackCriteria,
        page: PageRequest,
    ) -> Result<Page<MessFeedback>, Error>;
}

/// Write-side mess operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessCommand: Send + Sync {
    /// Publish a menu.
    async fn create_menu(&self, principal: &Principal, input: NewMessMenu) -> Result<MessMenu, Error>;

    /// Edit a menu.
    async fn update_menu(
        &self,
        principal: &Principal,
        id: &MessMenuId,
        patch: MessMenuPatch,
    ) -> Result<MessMenu, Error>;

    /// Remove a menu.
    async fn delete_menu(&self, principal: &Principal, id: &MessMenuId) -> Result<(), Error>;

    /// Record attendance.
    async fn mark_attendance(
        &self,
        principal: &Principal,
        input: NewMessAttendance,
    ) -> Result<MessAttendance, Error>;

    /// Remove an attendance mark.
    async fn delete_attendance(&self, principal: &Principal, id: &AttendanceId) -> Result<(), Error>;

    /// Leave feedback; students only.
    async fn submit_feedback(
        &self,
        principal: &Principal,
        input: NewMessFeedback,
    ) -> Result<MessFeedback, Error>;

    /// Remove feedback.
    async fn delete_feedback(&self, principal: &Principal, id: &FeedbackId) -> Result<(), Error>;
}
