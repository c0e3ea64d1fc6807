//! Driving port for report exports.

use async_trait::async_trait;

use crate::domain::{Error, Principal, RenderedReport, ReportEntity, ReportFormat, ReportPeriod};

/// Parameters of a report export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRequest {
    /// Record collection to export.
    pub entity: ReportEntity,
    /// Output format.
    pub format: ReportFormat,
    /// Period filter applied to each record's reference day.
    pub period: ReportPeriod,
}

/// Domain use-case port for report generation. Staff only.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReportQuery: Send + Sync {
    /// Render every record visible to `principal` that falls in the period.
    async fn export(
        &self,
        principal: &Principal,
        request: ReportRequest,
    ) -> Result<RenderedReport, Error>;
}
