//! Payload normalization into the canonical downstream shape.
//!
//! Turns a tolerant [`InboundEvent`] into the fixed [`NormalizedPayload`]
//! the automation endpoint expects. Normalization is total: absent inbound
//! fields become sentinels, never errors. Derived fields (`is_future`,
//! `days_until`, validation flags) are computed against the injected clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    event::{InboundEvent, RequestMeta},
    time::Clock,
};

/// Constant event type stamped on every normalized payload.
pub const EVENT_TYPE: &str = "flight_date_selection";

/// Source recorded when the client did not name one.
pub const DEFAULT_SOURCE: &str = "telegram_web_app";

/// Action recorded when the client did not name one.
pub const DEFAULT_ACTION: &str = "unknown";

/// Sentinel for absent string fields.
pub const UNKNOWN: &str = "unknown";

/// Wall-clock format used for every formatted timestamp, UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SECONDS_PER_DAY: i64 = 86_400;

/// Canonical payload forwarded to the automation endpoint.
///
/// The shape is fixed: consumers can rely on every field except
/// `user_input` and `telegram_user`, which are present only when the
/// client sent them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedPayload {
    /// Always [`EVENT_TYPE`].
    pub event_type: String,
    /// Server wall clock at normalization, [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Server wall clock at normalization, epoch seconds.
    pub server_time: i64,
    /// Originating surface, defaulted to [`DEFAULT_SOURCE`].
    pub source: String,
    /// User action, defaulted to [`DEFAULT_ACTION`].
    pub action: String,
    /// The selection with derived schedule fields, always present.
    pub flight_schedule: FlightSchedule,
    /// Raw picker state, passed through when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_input: Option<serde_json::Value>,
    /// Telegram user object, passed through when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telegram_user: Option<serde_json::Value>,
    /// Request context, client-reported values first.
    pub metadata: PayloadMetadata,
    /// Field-level validity flags for the automation side.
    pub validation: ValidationFlags,
}

/// The picked flight date with derived schedule fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightSchedule {
    /// Calendar date or [`UNKNOWN`].
    pub date: String,
    /// 24-hour time or [`UNKNOWN`].
    pub time_24h: String,
    /// 12-hour time or [`UNKNOWN`].
    pub time_12h: String,
    /// Display rendering or [`UNKNOWN`].
    pub formatted_display: String,
    /// Selection instant as epoch seconds, `0` when absent.
    pub unix_timestamp: i64,
    /// ISO 8601 rendering or [`UNKNOWN`].
    pub iso_timestamp: String,
    /// Whether the selection lies strictly after the server clock.
    pub is_future: bool,
    /// Whole days between now and the selection, floored toward negative
    /// infinity; negative for past selections, `0` when no timestamp.
    pub days_until: i64,
}

/// Request context recorded alongside the selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadMetadata {
    /// Client-reported IP, else the socket peer, else [`UNKNOWN`].
    pub ip_address: String,
    /// Client-reported user agent, else the request header, else [`UNKNOWN`].
    pub user_agent: String,
    /// Client timezone or [`UNKNOWN`].
    pub timezone: String,
    /// Client language or [`UNKNOWN`].
    pub language: String,
    /// Client screen resolution or [`UNKNOWN`].
    pub screen_resolution: String,
    /// Host name serving the request or [`UNKNOWN`].
    pub server_name: String,
    /// Wall clock when this payload was built, [`TIMESTAMP_FORMAT`].
    pub processed_at: String,
}

/// Field-level validity flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFlags {
    /// True when a date was supplied (anything but the sentinel).
    pub is_valid_date: bool,
    /// True when a 24-hour time was supplied (anything but the sentinel).
    pub is_valid_time: bool,
    /// Mirrors `flight_schedule.is_future`.
    pub is_future_date: bool,
    /// Constant `"valid"`. The field carries no signal; it exists because
    /// downstream automations already key on its presence.
    pub data_integrity: String,
}

/// Normalizes one inbound event into the canonical payload.
///
/// Total over all inputs: every absent field gets a sentinel and derived
/// fields are computed from whatever is present.
pub fn normalize(
    event: &InboundEvent,
    meta: &RequestMeta,
    clock: &dyn Clock,
) -> NormalizedPayload {
    let now = DateTime::<Utc>::from(clock.now_system());
    let now_epoch = now.timestamp();
    let stamp = now.format(TIMESTAMP_FORMAT).to_string();

    let selection = event.date_time.clone().unwrap_or_default();
    let unix_timestamp = selection.unix_timestamp.unwrap_or(0);
    let is_future = unix_timestamp > now_epoch;
    // div_euclid floors toward negative infinity, so a selection 25 hours
    // in the past is -2 days, not -1.
    let days_until = if unix_timestamp > 0 {
        (unix_timestamp - now_epoch).div_euclid(SECONDS_PER_DAY)
    } else {
        0
    };

    let flight_schedule = FlightSchedule {
        date: selection.date.unwrap_or_else(unknown),
        time_24h: selection.time_24h.unwrap_or_else(unknown),
        time_12h: selection.time_12h.unwrap_or_else(unknown),
        formatted_display: selection.formatted.unwrap_or_else(unknown),
        unix_timestamp,
        iso_timestamp: selection.iso_string.unwrap_or_else(unknown),
        is_future,
        days_until,
    };

    let client = event.metadata.clone().unwrap_or_default();
    let metadata = PayloadMetadata {
        ip_address: event
            .ip_address
            .clone()
            .or_else(|| meta.remote_addr.clone())
            .unwrap_or_else(unknown),
        user_agent: client
            .user_agent
            .or_else(|| meta.user_agent.clone())
            .unwrap_or_else(unknown),
        timezone: client.timezone.unwrap_or_else(unknown),
        language: client.language.unwrap_or_else(unknown),
        screen_resolution: client.screen_resolution.unwrap_or_else(unknown),
        server_name: meta.server_name.clone().unwrap_or_else(unknown),
        processed_at: stamp.clone(),
    };

    let validation = ValidationFlags {
        is_valid_date: flight_schedule.date != UNKNOWN,
        is_valid_time: flight_schedule.time_24h != UNKNOWN,
        is_future_date: is_future,
        data_integrity: "valid".to_string(),
    };

    NormalizedPayload {
        event_type: EVENT_TYPE.to_string(),
        timestamp: stamp,
        server_time: now_epoch,
        source: event.source.clone().unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        action: event.action.clone().unwrap_or_else(|| DEFAULT_ACTION.to_string()),
        flight_schedule,
        user_input: event.user_selection.clone(),
        telegram_user: event.telegram_user.clone(),
        metadata,
        validation,
    }
}

fn unknown() -> String {
    UNKNOWN.to_string()
}
