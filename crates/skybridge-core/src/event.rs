//! Inbound event model and strongly-typed identifiers.
//!
//! Defines the shape of a flight-date selection event as sent by the
//! Telegram mini-app. Every field is optional: the picker runs on devices
//! and webviews we do not control, so the relay tolerates partial events
//! and fills in sentinels during normalization instead of rejecting them.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation identifier attached to each successfully relayed selection.
///
/// Rendered with a `FLIGHT_` prefix so support staff can grep one selection
/// across the caller response, logs, and the downstream automation run.
///
/// # Example
///
/// ```
/// use skybridge_core::event::FlightId;
/// let id = FlightId::new();
/// assert!(id.to_string().starts_with("FLIGHT_"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlightId(pub Uuid);

impl FlightId {
    /// Creates a new random flight ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FlightId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FLIGHT_{}", self.0.simple())
    }
}

impl From<Uuid> for FlightId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// One flight-date selection event as posted by the mini-app.
///
/// Constructed once per request by the validator and immutable afterwards.
/// Unknown fields are ignored; absent fields stay `None` and are defaulted
/// during normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Originating surface, e.g. `telegram_web_app`.
    pub source: Option<String>,
    /// What the user did, e.g. `date_time_selected`.
    pub action: Option<String>,
    /// The picked date and time, when the picker got that far.
    pub date_time: Option<DateTimeSelection>,
    /// Raw picker state as the mini-app chose to report it.
    pub user_selection: Option<serde_json::Value>,
    /// Telegram user object forwarded by the web app, shape unspecified.
    pub telegram_user: Option<serde_json::Value>,
    /// Client-reported environment details.
    pub metadata: Option<ClientMetadata>,
    /// Client-reported IP address, preferred over the socket address.
    pub ip_address: Option<String>,
}

/// Date and time the user picked, in the mini-app's own vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateTimeSelection {
    /// Calendar date, e.g. `2026-09-12`.
    pub date: Option<String>,
    /// Time of day in 24-hour notation, e.g. `14:30`.
    pub time_24h: Option<String>,
    /// Time of day in 12-hour notation, e.g. `2:30 PM`.
    pub time_12h: Option<String>,
    /// Human-readable rendering shown in the picker.
    pub formatted: Option<String>,
    /// Selection instant as epoch seconds.
    pub unix_timestamp: Option<i64>,
    /// Selection instant in ISO 8601 form.
    pub iso_string: Option<String>,
}

/// Environment details reported by the client alongside the selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientMetadata {
    /// Browser user agent of the webview.
    pub user_agent: Option<String>,
    /// IANA timezone name, e.g. `Europe/Berlin`.
    pub timezone: Option<String>,
    /// BCP 47 language tag of the client.
    pub language: Option<String>,
    /// Screen resolution, e.g. `390x844`.
    pub screen_resolution: Option<String>,
}

/// Server-observed context of the HTTP request carrying the event.
///
/// Collected by the HTTP surface and handed to the normalizer, which uses
/// it as the fallback when the client did not report the same detail.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    /// Peer address of the connection.
    pub remote_addr: Option<String>,
    /// `User-Agent` request header.
    pub user_agent: Option<String>,
    /// Host name the request was addressed to, without the port.
    pub server_name: Option<String>,
}
