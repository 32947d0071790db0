//! HTTP request handlers for the Skybridge API.
//!
//! Handlers follow a consistent pattern:
//! - Method dispatch and extraction at the edge, pipeline logic in the
//!   relay crate
//! - Tracing for observability
//! - Standardized JSON error responses with stable messages
//!
//! # Handler Organization
//!
//! - `relay` - The flight-date relay endpoint (POST, plus the OPTIONS
//!   preflight and the GET browser test page)
//! - `health` - Liveness probe

pub mod health;
pub mod relay;

pub use health::liveness_check;
pub use relay::relay_flight_date;
