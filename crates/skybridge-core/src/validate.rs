//! Request validation: method gate and body parsing.
//!
//! Runs before any normalization or side effect. A request either yields a
//! typed [`InboundEvent`] plus the raw JSON document, or one of the two
//! pre-parse rejections.

use crate::{error::RelayError, event::InboundEvent, Result};

/// A validated request: the typed event plus the raw document.
///
/// The raw value is kept verbatim so failure responses and audit records
/// can echo exactly what the caller sent.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    /// Typed view of the selection event.
    pub event: InboundEvent,
    /// The body as parsed JSON, unmodified.
    pub raw: serde_json::Value,
}

/// Validates method and body, producing the inbound event.
///
/// # Errors
///
/// Returns [`RelayError::InvalidMethod`] for anything but POST and
/// [`RelayError::MalformedInput`] when the body is empty, not JSON, or not
/// shaped like a selection event.
pub fn validate_request(method: &str, body: &[u8]) -> Result<ValidatedRequest> {
    if method != "POST" {
        return Err(RelayError::InvalidMethod);
    }
    parse_event(body)
}

/// Parses a request body into a validated event.
///
/// # Errors
///
/// Returns [`RelayError::MalformedInput`] when the body cannot produce an
/// [`InboundEvent`].
pub fn parse_event(body: &[u8]) -> Result<ValidatedRequest> {
    if body.is_empty() {
        return Err(RelayError::MalformedInput);
    }

    let raw: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| RelayError::MalformedInput)?;
    let event: InboundEvent =
        serde_json::from_value(raw.clone()).map_err(|_| RelayError::MalformedInput)?;

    Ok(ValidatedRequest { event, raw })
}
