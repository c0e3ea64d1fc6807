//! Report export service.
//!
//! Reports reuse the record queries so the caller's visibility filter
//! applies unchanged. Every page is gathered, restricted to the requested
//! period and handed to the formatter.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use pagination::{MAX_LIMIT, Page, PageRequest};
use tracing::info;

use super::ports::{
    ComplaintQuery, EventQuery, LeaveRequestQuery, MessQuery, ReportQuery, ReportRequest,
};
use super::{
    ComplaintCriteria, Error, EventCriteria, LeaveCriteria, MessAttendanceCriteria,
    MessFeedbackCriteria, Principal, RenderedReport, ReportEntity, render_report,
};

/// Record queries a report can draw from.
#[derive(Clone)]
pub struct ReportSources {
    /// Event listing.
    pub events: Arc<dyn EventQuery>,
    /// Complaint listing.
    pub complaints: Arc<dyn ComplaintQuery>,
    /// Leave request listing.
    pub leave_requests: Arc<dyn LeaveRequestQuery>,
    /// Attendance and feedback listing.
    pub mess: Arc<dyn MessQuery>,
}

/// Report service implementing [`ReportQuery`].
#[derive(Clone)]
pub struct ReportService {
    sources: ReportSources,
}

impl ReportService {
    /// Create a new service.
    pub fn new(sources: ReportSources) -> Self {
        Self { sources }
    }
}

/// Drain every page produced by `fetch`.
async fn collect_all<T, F, Fut>(fetch: F) -> Result<Vec<T>, Error>
where
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, Error>>,
{
    let mut request = PageRequest::first(MAX_LIMIT);
    let mut items = Vec::new();
    loop {
        let page = fetch(request).await?;
        let more = page.has_more();
        items.extend(page.items);
        if !more {
            return Ok(items);
        }
        request = request.next();
    }
}

#[async_trait]
impl ReportQuery for ReportService {
    async fn export(
        &self,
        principal: &Principal,
        request: ReportRequest,
    ) -> Result<RenderedReport, Error> {
        if principal.is_student() {
            return Err(Error::forbidden("Students cannot export reports"));
        }
        let ReportRequest {
            entity,
            format,
            period,
        } = request;
        let sources = &self.sources;

        let rendered = match entity {
            ReportEntity::Events => {
                let rows = collect_all(|page| {
                    sources.events.list(principal, EventCriteria::default(), page)
                })
                .await?;
                render_report(entity, format, period, &rows)
            }
            ReportEntity::Complaints => {
                let rows = collect_all(|page| {
                    sources
                        .complaints
                        .list(principal, ComplaintCriteria::default(), page)
                })
                .await?;
                render_report(entity, format, period, &rows)
            }
            ReportEntity::LeaveRequests => {
                let rows = collect_all(|page| {
                    sources
                        .leave_requests
                        .list(principal, LeaveCriteria::default(), page)
                })
                .await?;
                render_report(entity, format, period, &rows)
            }
            ReportEntity::MessAttendance => {
                let rows = collect_all(|page| {
                    sources
                        .mess
                        .list_attendance(principal, MessAttendanceCriteria::default(), page)
                })
                .await?;
                render_report(entity, format, period, &rows)
            }
            ReportEntity::MessFeedback => {
                let rows = collect_all(|page| {
                    sources
                        .mess
                        .list_feedback(principal, MessFeedbackCriteria::default(), page)
                })
                .await?;
                render_report(entity, format, period, &rows)
            }
        }
        .map_err(|err| Error::internal(err.to_string()))?;

        info!(
            entity = entity.as_str(),
            format = format.as_str(),
            period = %period.label(),
            bytes = rendered.body.len(),
            "report exported"
        );
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    //! Coverage for paging and period filtering with mocked queries.
    use super::*;
    use crate::domain::ports::{
        MockComplaintQuery, MockEventQuery, MockLeaveRequestQuery, MockMessQuery,
    };
    use crate::domain::test_support::{admin, at, student_of};
    use crate::domain::{
        ErrorCode, Event, EventId, EventType, HostelId, NewEvent, ReportFormat, ReportPeriod,
        UserId,
    };
    use chrono::{Duration, TimeZone, Utc};
    use rstest::rstest;

    fn sources(events: MockEventQuery) -> ReportSources {
        ReportSources {
            events: Arc::new(events),
            complaints: Arc::new(MockComplaintQuery::new()),
            leave_requests: Arc::new(MockLeaveRequestQuery::new()),
            mess: Arc::new(MockMessQuery::new()),
        }
    }

    fn event_on(year: i32, month: u32, title: &str) -> Event {
        let start = Utc
            .with_ymd_and_hms(year, month, 10, 18, 0, 0)
            .single()
            .expect("valid date");
        Event::create(
            EventId::random(),
            NewEvent {
                title: title.to_owned(),
                description: None,
                start_date: start,
                end_date: start + Duration::hours(2),
                location: None,
                event_type: EventType::Sports,
                hostel_id: None,
            },
            None,
            UserId::random(),
            at(8),
        )
    }

    #[rstest]
    #[tokio::test]
    async fn students_cannot_export() {
        let err = ReportService::new(sources(MockEventQuery::new()))
            .export(
                &student_of(HostelId::random()),
                ReportRequest {
                    entity: ReportEntity::Events,
                    format: ReportFormat::Csv,
                    period: ReportPeriod::All,
                },
            )
            .await
            .expect_err("forbidden");
        assert_eq!(err.code(), ErrorCode::Forbidden);
    }

    #[rstest]
    #[tokio::test]
    async fn every_page_is_gathered_and_filtered_by_period() {
        let mut events = MockEventQuery::new();
        events.expect_list().times(2).returning(|_, _, page| {
            let items = if page.page() == 1 {
                vec![event_on(2024, 3, "Cricket"), event_on(2024, 4, "Football")]
            } else {
                vec![event_on(2024, 3, "Chess")]
            };
            Ok(Page::new(items, page, 101))
        });

        let report = ReportService::new(sources(events))
            .export(
                &admin(),
                ReportRequest {
                    entity: ReportEntity::Events,
                    format: ReportFormat::Csv,
                    period: ReportPeriod::Month {
                        year: 2024,
                        month: 3,
                    },
                },
            )
            .await
            .expect("report");

        assert_eq!(report.filename, "events-2024-03.csv");
        let body = String::from_utf8(report.body).expect("utf8");
        assert!(body.contains("Cricket"));
        assert!(body.contains("Chess"));
        assert!(!body.contains("Football"));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_exports_keep_the_known_header() {
        let mut events = MockEventQuery::new();
        events
            .expect_list()
            .returning(|_, _, page| Ok(Page::new(Vec::new(), page, 0)));

        let report = ReportService::new(sources(events))
            .export(
                &admin(),
                ReportRequest {
                    entity: ReportEntity::Events,
                    format: ReportFormat::Csv,
                    period: ReportPeriod::All,
                },
            )
            .await
            .expect("report");
        let body = String::from_utf8(report.body).expect("utf8");
        assert!(body.starts_with("id,title,"));
        assert_eq!(body.lines().count(), 1);
    }
}
