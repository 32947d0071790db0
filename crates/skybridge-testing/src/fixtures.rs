//! Test data builders for inbound flight-date events.
//!
//! Builds the JSON documents the Telegram mini-app sends, with sensible
//! defaults one week past the pinned test clock.

use serde_json::{json, Map, Value};

/// Builder for inbound flight-date selection events.
///
/// `build` produces the wire document; only fields that were set appear,
/// so tests can exercise partial and empty payloads.
pub struct InboundEventBuilder {
    source: Option<String>,
    action: Option<String>,
    date: Option<String>,
    time_24h: Option<String>,
    time_12h: Option<String>,
    formatted: Option<String>,
    unix_timestamp: Option<i64>,
    iso_string: Option<String>,
    user_selection: Option<Value>,
    telegram_user: Option<Value>,
    metadata: Option<Value>,
    ip_address: Option<String>,
}

impl InboundEventBuilder {
    /// Creates a builder with nothing set; `build` yields `{}`.
    pub fn new() -> Self {
        Self {
            source: None,
            action: None,
            date: None,
            time_24h: None,
            time_12h: None,
            formatted: None,
            unix_timestamp: None,
            iso_string: None,
            user_selection: None,
            telegram_user: None,
            metadata: None,
            ip_address: None,
        }
    }

    /// Creates a builder describing a complete mini-app selection:
    /// 2026-01-08 14:30 UTC, one week after [`crate::BASE_EPOCH`].
    pub fn with_defaults() -> Self {
        Self {
            source: Some("telegram_web_app".to_string()),
            action: Some("date_time_selected".to_string()),
            date: Some("2026-01-08".to_string()),
            time_24h: Some("14:30".to_string()),
            time_12h: Some("2:30 PM".to_string()),
            formatted: Some("Thursday, January 8, 2026 at 2:30 PM (14:30)".to_string()),
            unix_timestamp: Some(1_767_882_600),
            iso_string: Some("2026-01-08T14:30:00.000Z".to_string()),
            user_selection: Some(json!({
                "hour": 14,
                "minute": 30,
                "date_picker_value": "2026-01-08",
            })),
            telegram_user: Some(json!({
                "telegram_id": 123_456_789,
                "telegram_username": "testuser",
            })),
            metadata: Some(json!({
                "user_agent": "Mozilla/5.0 (Telegram Mini App)",
                "timezone": "Europe/Berlin",
                "language": "de-DE",
                "screen_resolution": "390x844",
            })),
            ip_address: None,
        }
    }

    /// Sets the reported source application.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the reported user action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Sets the selected calendar date (`YYYY-MM-DD`).
    #[must_use]
    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the selected 24-hour time (`HH:MM`).
    #[must_use]
    pub fn time_24h(mut self, time: impl Into<String>) -> Self {
        self.time_24h = Some(time.into());
        self
    }

    /// Sets the selection's unix timestamp.
    #[must_use]
    pub fn unix_timestamp(mut self, timestamp: i64) -> Self {
        self.unix_timestamp = Some(timestamp);
        self
    }

    /// Sets the raw user-selection block.
    #[must_use]
    pub fn user_selection(mut self, value: Value) -> Self {
        self.user_selection = Some(value);
        self
    }

    /// Sets the Telegram user block.
    #[must_use]
    pub fn telegram_user(mut self, value: Value) -> Self {
        self.telegram_user = Some(value);
        self
    }

    /// Sets the client metadata block.
    #[must_use]
    pub fn metadata(mut self, value: Value) -> Self {
        self.metadata = Some(value);
        self
    }

    /// Sets the client-reported IP address.
    #[must_use]
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Builds the wire document.
    pub fn build(self) -> Value {
        let mut root = Map::new();

        if let Some(source) = self.source {
            root.insert("source".to_string(), Value::String(source));
        }
        if let Some(action) = self.action {
            root.insert("action".to_string(), Value::String(action));
        }

        let mut selection = Map::new();
        if let Some(date) = self.date {
            selection.insert("date".to_string(), Value::String(date));
        }
        if let Some(time_24h) = self.time_24h {
            selection.insert("time_24h".to_string(), Value::String(time_24h));
        }
        if let Some(time_12h) = self.time_12h {
            selection.insert("time_12h".to_string(), Value::String(time_12h));
        }
        if let Some(formatted) = self.formatted {
            selection.insert("formatted".to_string(), Value::String(formatted));
        }
        if let Some(unix_timestamp) = self.unix_timestamp {
            selection.insert("unix_timestamp".to_string(), Value::from(unix_timestamp));
        }
        if let Some(iso_string) = self.iso_string {
            selection.insert("iso_string".to_string(), Value::String(iso_string));
        }
        if !selection.is_empty() {
            root.insert("date_time".to_string(), Value::Object(selection));
        }

        if let Some(user_selection) = self.user_selection {
            root.insert("user_selection".to_string(), user_selection);
        }
        if let Some(telegram_user) = self.telegram_user {
            root.insert("telegram_user".to_string(), telegram_user);
        }
        if let Some(metadata) = self.metadata {
            root.insert("metadata".to_string(), metadata);
        }
        if let Some(ip_address) = self.ip_address {
            root.insert("ip_address".to_string(), Value::String(ip_address));
        }

        Value::Object(root)
    }

    /// Builds the wire document as request-body bytes.
    pub fn build_bytes(self) -> Vec<u8> {
        self.build().to_string().into_bytes()
    }
}

impl Default for InboundEventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use skybridge_core::InboundEvent;

    use super::*;

    #[test]
    fn empty_builder_yields_empty_document() {
        assert_eq!(InboundEventBuilder::new().build(), json!({}));
    }

    #[test]
    fn defaults_parse_as_an_inbound_event() {
        let document = InboundEventBuilder::with_defaults().build();
        let event: InboundEvent =
            serde_json::from_value(document).expect("defaults parse as inbound event");

        let selection = event.date_time.expect("selection present");
        assert_eq!(selection.date.as_deref(), Some("2026-01-08"));
        assert_eq!(selection.unix_timestamp, Some(1_767_882_600));
        assert!(event.telegram_user.is_some());
    }

    #[test]
    fn selection_block_appears_only_when_a_field_is_set() {
        let without = InboundEventBuilder::new().source("web_test").build();
        assert!(without.get("date_time").is_none());

        let with = InboundEventBuilder::new().date("2026-03-01").build();
        assert_eq!(with["date_time"]["date"], "2026-03-01");
    }
}
