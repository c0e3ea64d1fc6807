//! Outbound adapters implementing the driven ports.
//!
//! - **memory**: lock-guarded in-process stores used when no database URL
//!   is configured and throughout the HTTP tests.
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM.
//!
//! Adapters translate between domain records and their storage
//! representation. They contain no hostel rules.

pub mod memory;
pub mod persistence;
