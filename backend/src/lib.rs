//! Hostel management backend.
//!
//! Hexagonal layout: [`domain`] holds records, rules and services behind
//! ports; [`inbound`] adapts HTTP onto the driving ports; [`outbound`]
//! implements the driven ports over memory or PostgreSQL; [`wiring`] composes
//! them into the state the handlers consume.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wiring;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
