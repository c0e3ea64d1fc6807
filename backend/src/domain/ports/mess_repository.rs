//! Ports for mess menus, attendance and feedback persistence.
//!
//! Menus are unique per `(hostel, date, meal)` and attendance marks per
//! `(student, date, meal)`; adapters report violations with
//! [`RepositoryError::Duplicate`].

use async_trait::async_trait;
use pagination::PageRequest;

use crate::domain::{
    AttendanceId, FeedbackId, MessAttendance, MessAttendanceFilter, MessFeedback,
    MessFeedbackFilter, MessMenu, MessMenuFilter, MessMenuId,
};

use super::{Listing, RepositoryError};

/// Port for menu storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessMenuRepository: Send + Sync {
    /// Return one page of menus matching `filter`, by date then meal.
    async fn list(
        &self,
        filter: &MessMenuFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessMenu>, RepositoryError>;

    /// Fetch a menu regardless of visibility.
    async fn find(&self, id: &MessMenuId) -> Result<Option<MessMenu>, RepositoryError>;

    /// Persist a new menu.
    async fn insert(&self, menu: &MessMenu) -> Result<(), RepositoryError>;

    /// Replace a stored menu when its revision still matches.
    async fn update(&self, menu: &MessMenu, expected_revision: u32) -> Result<(), RepositoryError>;

    /// Remove a menu. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &MessMenuId) -> Result<bool, RepositoryError>;
}

/// Port for attendance storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessAttendanceRepository: Send + Sync {
    /// Return one page of marks matching `filter`, newest day first.
    async fn list(
        &self,
        filter: &MessAttendanceFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessAttendance>, RepositoryError>;

    /// Fetch a mark regardless of visibility.
    async fn find(&self, id: &AttendanceId) -> Result<Option<MessAttendance>, RepositoryError>;

    /// Persist a new mark.
    async fn insert(&self, mark: &MessAttendance) -> Result<(), RepositoryError>;

    /// Remove a mark. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &AttendanceId) -> Result<bool, RepositoryError>;
}

/// Port for feedback storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessFeedbackRepository: Send + Sync {
    /// Return one page of feedback matching `filter`, newest first.
    async fn list(
        &self,
        filter: &MessFeedbackFilter,
        page: &PageRequest,
    ) -> Result<Listing<MessFeedback>, RepositoryError>;

    /// Fetch feedback regardless of visibility.
    async fn find(&self, id: &FeedbackId) -> Result<Option<MessFeedback>, RepositoryError>;

    /// Persist new feedback.
    async fn insert(&self, feedback: &MessFeedback) -> Result<(), RepositoryError>;

    /// Remove feedback. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &FeedbackId) -> Result<bool, RepositoryError>;
}
