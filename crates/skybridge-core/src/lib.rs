//! Core domain model for the Skybridge flight-date relay.
//!
//! Provides the inbound event types, request validation, payload
//! normalization, error taxonomy, clock abstraction, and audit sink used
//! across the relay pipeline. The other crates depend on these foundational
//! types for consistency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod error;
pub mod event;
pub mod normalize;
pub mod time;
pub mod validate;

pub use audit::{AuditRecord, AuditSink, FileAuditSink, NoOpAuditSink};
pub use error::{RelayError, Result};
pub use event::{ClientMetadata, DateTimeSelection, FlightId, InboundEvent, RequestMeta};
pub use normalize::{
    normalize, FlightSchedule, NormalizedPayload, PayloadMetadata, ValidationFlags,
};
pub use time::{Clock, RealClock, TestClock};
pub use validate::{validate_request, ValidatedRequest};
