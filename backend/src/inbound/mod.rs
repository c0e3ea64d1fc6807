//! Inbound adapters translating external requests into domain service calls.
//! HTTP is the only transport; handlers live under [`http`].

pub mod http;
