//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL via
//! `diesel-async` and a `bb8` pool.
//!
//! - **Thin adapters**: repositories translate between Diesel rows and domain
//!   records. Visibility filters become SQL predicates; no hostel rules live
//!   here.
//! - **Internal models**: row structs (`models.rs`) and the schema
//!   (`schema.rs`) never leave this module.
//! - **Conditional writes**: revisioned updates filter on the expected
//!   revision and report a zero-row outcome as a revision mismatch.
//!
//! # Example
//!
//! ```no_run
//! use hostel_backend::outbound::persistence::{DbPool, DieselEventRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/hostel")).await?;
//! let events = DieselEventRepository::new(pool);
//! # let _ = events;
//! # Ok(())
//! # }
//! ```

mod diesel_backup_repository;
mod diesel_complaint_repository;
mod diesel_event_repository;
pub(crate) mod diesel_helpers;
mod diesel_leave_request_repository;
mod diesel_mess_repository;
mod diesel_notification_repository;
mod diesel_user_directory;
mod diesel_user_preferences_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_backup_repository::{DieselBackupRepository, DieselRecordSnapshotStore};
pub use diesel_complaint_repository::DieselComplaintRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_leave_request_repository::DieselLeaveRequestRepository;
pub use diesel_mess_repository::DieselMessRepository;
pub use diesel_notification_repository::DieselNotificationRepository;
pub use diesel_user_directory::DieselUserDirectory;
pub use diesel_user_preferences_repository::DieselUserPreferencesRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
