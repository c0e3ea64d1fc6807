//! Report downloads.
//!
//! ```text
//! GET /api/v1/reports/{entity}?format=csv|html&period=all|YYYY|YYYY-MM
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::ports::ReportRequest;
use crate::domain::{FieldErrors, ReportEntity, ReportFormat, ReportPeriod};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::rejected;

/// Query parameters accepted by `GET /api/v1/reports/{entity}`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQueryParams {
    /// `csv` (default) or `html`.
    pub format: Option<String>,
    /// `all` (default), `YYYY` or `YYYY-MM`.
    pub period: Option<String>,
}

fn parse_report_request(entity: &str, query: &ReportQueryParams) -> ApiResult<ReportRequest> {
    let mut errors = FieldErrors::default();
    let entity = errors.required_choice::<ReportEntity>("entity", Some(entity));
    let format = errors.optional_choice::<ReportFormat>("format", query.format.as_deref());
    let period = match query.period.as_deref().map(str::trim) {
        None | Some("") => Some(ReportPeriod::All),
        Some(raw) => errors.check(raw.parse::<ReportPeriod>().map_err(|err| err.to_string())),
    };
    match (entity, format, period) {
        (Some(entity), Some(format), Some(period)) if errors.is_empty() => Ok(ReportRequest {
            entity,
            format: format.unwrap_or(ReportFormat::Csv),
            period,
        }),
        _ => Err(rejected(errors)),
    }
}

/// Export a record collection as CSV or printable HTML.
#[utoipa::path(
    get,
    path = "/api/v1/reports/{entity}",
    params(
        ("entity" = String, Path, description = "events, complaints, leave-requests, mess-attendance or mess-feedback"),
        ReportQueryParams
    ),
    responses(
        (
            status = 200,
            description = "Rendered report",
            headers(("Content-Disposition" = String, description = "Attachment filename")),
            content(("text/csv"), ("text/html"))
        ),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Students cannot export", body = ErrorSchema)
    ),
    tags = ["reports"],
    operation_id = "exportReport"
)]
#[get("/reports/{entity}")]
pub async fn export_report(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    query: web::Query<ReportQueryParams>,
) -> ApiResult<HttpResponse> {
    let request = parse_report_request(&path, &query)?;
    let report = state.reports.export(&caller.principal(), request).await?;
    Ok(HttpResponse::Ok()
        .content_type(report.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(report.filename)],
        })
        .body(report.body))
}
