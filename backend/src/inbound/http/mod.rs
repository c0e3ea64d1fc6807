//! HTTP inbound adapter exposing REST endpoints.
//!
//! Every resource lives under `/api/v1`; [`configure_api`] mounts them on a
//! scope. Health probes and API docs are mounted by the server outside it.

use actix_web::web;

pub mod backups;
pub mod complaints;
pub mod error;
pub mod events;
pub mod health;
pub mod leave_requests;
pub mod mess;
pub mod notifications;
pub mod preferences;
pub mod principal;
pub mod reports;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod users;
pub mod validation;

pub use error::ApiResult;

use error::{json_error_handler, query_error_handler};

/// Register extractor configuration and every `/api/v1` handler.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .service(users::login)
        .service(users::logout)
        .service(users::current_user)
        .service(users::list_hostels)
        .service(preferences::get_preferences)
        .service(preferences::update_preferences)
        .service(events::list_events)
        .service(events::create_event)
        .service(events::update_event)
        .service(events::delete_event)
        .service(complaints::list_complaints)
        .service(complaints::create_complaint)
        .service(complaints::update_complaint)
        .service(complaints::delete_complaint)
        .service(leave_requests::list_leave_requests)
        .service(leave_requests::create_leave_request)
        .service(leave_requests::update_leave_request)
        .service(leave_requests::delete_leave_request)
        .service(notifications::mark_all_read)
        .service(notifications::list_notifications)
        .service(notifications::create_notification)
        .service(notifications::update_notification)
        .service(notifications::delete_notification)
        .service(mess::list_menus)
        .service(mess::create_menu)
        .service(mess::update_menu)
        .service(mess::delete_menu)
        .service(mess::list_attendance)
        .service(mess::mark_attendance)
        .service(mess::delete_attendance)
        .service(mess::list_feedback)
        .service(mess::submit_feedback)
        .service(mess::delete_feedback)
        .service(backups::download_backup)
        .service(backups::restore_backup)
        .service(backups::list_backups)
        .service(backups::create_backup)
        .service(backups::delete_backup)
        .service(reports::export_report);
}
