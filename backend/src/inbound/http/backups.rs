//! Backup administration endpoints. Admin only.
//!
//! ```text
//! GET    /api/v1/backups?page&limit
//! POST   /api/v1/backups                 {"label": "..."}
//! GET    /api/v1/backups/download?id=<uuid>
//! POST   /api/v1/backups/restore?id=<uuid>
//! DELETE /api/v1/backups?id=<uuid>
//! ```

use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{BackupId, FieldErrors};
use crate::inbound::http::ApiResult;
use crate::inbound::http::principal::Caller;
use crate::inbound::http::schemas::{
    BackupPageSchema, BackupSchema, ErrorSchema, MessageSchema, RestoreSchema,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{IdQuery, TITLE_MAX, page_request, rejected, require_id};

/// Query parameters accepted by `GET /api/v1/backups`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BackupListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Optional request body for `POST /api/v1/backups`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateBackupRequest {
    /// Defaults to a timestamped label.
    #[schema(example = "before term start")]
    pub label: Option<String>,
}

/// List stored backups, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/backups",
    params(BackupListQuery),
    responses(
        (status = 200, description = "A page of backups", body = BackupPageSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["backups"],
    operation_id = "listBackups"
)]
#[get("/backups")]
pub async fn list_backups(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<BackupListQuery>,
) -> ApiResult<HttpResponse> {
    let mut errors = FieldErrors::default();
    let Some(page) = page_request(&mut errors, query.page.as_deref(), query.limit.as_deref())
    else {
        return Err(rejected(errors));
    };
    let backups = state.backups_query.list(&caller.principal(), page).await?;
    Ok(HttpResponse::Ok().json(backups))
}

/// Snapshot every record table.
#[utoipa::path(
    post,
    path = "/api/v1/backups",
    request_body(content = CreateBackupRequest, description = "Optional label"),
    responses(
        (status = 201, description = "Backup created", body = BackupSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Admins only", body = ErrorSchema)
    ),
    tags = ["backups"],
    operation_id = "createBackup"
)]
#[post("/backups")]
pub async fn create_backup(
    state: web::Data<HttpState>,
    caller: Caller,
    payload: Option<web::Json<CreateBackupRequest>>,
) -> ApiResult<HttpResponse> {
    let request = payload.map(web::Json::into_inner).unwrap_or_default();
    let mut errors = FieldErrors::default();
    let Some(label) = errors.optional_text("label", request.label.as_deref(), TITLE_MAX) else {
        return Err(rejected(errors));
    };
    let backup = state.backups.create(&caller.principal(), label).await?;
    Ok(HttpResponse::Created().json(backup))
}

/// Download a backup payload as JSON.
#[utoipa::path(
    get,
    path = "/api/v1/backups/download",
    params(("id" = String, Query, description = "Backup identifier")),
    responses(
        (
            status = 200,
            description = "Backup payload",
            headers(("Content-Disposition" = String, description = "Attachment filename")),
            content_type = "application/json"
        ),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "No such backup", body = ErrorSchema)
    ),
    tags = ["backups"],
    operation_id = "downloadBackup"
)]
#[get("/backups/download")]
pub async fn download_backup(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: BackupId = require_id(&query)?;
    let download = state.backups_query.download(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/json")
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(download.filename)],
        })
        .body(download.body))
}

/// Replace every record table with a backup's contents.
#[utoipa::path(
    post,
    path = "/api/v1/backups/restore",
    params(("id" = String, Query, description = "Backup identifier")),
    responses(
        (status = 200, description = "Backup restored", body = RestoreSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "No such backup", body = ErrorSchema),
        (status = 409, description = "Payload failed integrity verification", body = ErrorSchema)
    ),
    tags = ["backups"],
    operation_id = "restoreBackup"
)]
#[post("/backups/restore")]
pub async fn restore_backup(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: BackupId = require_id(&query)?;
    let outcome = state.backups.restore(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Backup restored successfully",
        "backup": outcome.backup,
        "restoredRecords": outcome.restored_records,
    })))
}

/// Delete a backup.
#[utoipa::path(
    delete,
    path = "/api/v1/backups",
    params(("id" = String, Query, description = "Backup identifier")),
    responses(
        (status = 200, description = "Backup deleted", body = MessageSchema),
        (status = 403, description = "Admins only", body = ErrorSchema),
        (status = 404, description = "No such backup", body = ErrorSchema)
    ),
    tags = ["backups"],
    operation_id = "deleteBackup"
)]
#[delete("/backups")]
pub async fn delete_backup(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<IdQuery>,
) -> ApiResult<HttpResponse> {
    let id: BackupId = require_id(&query)?;
    state.backups.delete(&caller.principal(), &id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Backup deleted successfully" })))
}
