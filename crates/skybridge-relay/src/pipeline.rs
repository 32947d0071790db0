//! End-to-end relay pipeline.
//!
//! Drives one inbound request through validation, normalization, the
//! single forwarding attempt, and reconciliation, emitting audit records
//! at each stage. The pipeline owns the forwarding client, the clock, and
//! the audit sink; the HTTP surface owns nothing but extraction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use skybridge_core::{
    audit::{AuditRecord, AuditSink},
    error::RelayError,
    event::{FlightId, RequestMeta},
    normalize::{normalize, UNKNOWN},
    time::Clock,
    validate, Result,
};

use crate::{
    client::{ClientConfig, ForwardClient, ForwardOutcome},
    reconcile::{reconcile, RelayResult},
    PLACEHOLDER_MARKER,
};

/// Message attached to every successful relay response.
pub const FORWARD_SUCCESS_MESSAGE: &str = "Flight date data sent to n8n successfully";

/// Message attached to every failed forwarding response.
pub const FORWARD_FAILURE_MESSAGE: &str = "Failed to send flight date to n8n";

/// Returns true when a destination URL is absent or never configured.
pub fn is_placeholder(url: &str) -> bool {
    let url = url.trim();
    url.is_empty() || url.contains(PLACEHOLDER_MARKER)
}

/// Relay configuration independent of the HTTP surface.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Destination webhook URL. `None` (or a placeholder) disables
    /// forwarding; the configuration failure is reported per request.
    pub webhook_url: Option<String>,
    /// Forwarding client settings.
    pub client: ClientConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self { webhook_url: None, client: ClientConfig::default() }
    }
}

/// Successful relay response, as serialized to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayAccepted {
    /// Always `true`.
    pub success: bool,
    /// Always [`FORWARD_SUCCESS_MESSAGE`].
    pub message: String,
    /// Downstream response body, parsed when it is JSON.
    pub n8n_response: serde_json::Value,
    /// Server wall clock of the relay attempt.
    pub timestamp: String,
    /// Correlation identifier with the `FLIGHT_` prefix.
    pub flight_id: String,
}

/// Failed relay response, as serialized to the caller.
///
/// Pre-parse rejections carry only the error message; later failures echo
/// the caller's document and the relay timestamp as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRejected {
    /// Always `false`.
    pub success: bool,
    /// Stable error message for the caller.
    pub error: String,
    /// Downstream failure detail, present for forwarding failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n8n_error: Option<String>,
    /// The caller's JSON document, echoed once it parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_data: Option<serde_json::Value>,
    /// Server wall clock of the relay attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl RelayRejected {
    /// Rejection before any event parsed: the error message alone.
    pub fn bare(error: &RelayError) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            n8n_error: None,
            received_data: None,
            timestamp: None,
        }
    }

    /// Rejection because no destination is configured.
    pub fn not_configured(received: serde_json::Value, timestamp: String) -> Self {
        Self {
            success: false,
            error: RelayError::WebhookNotConfigured.to_string(),
            n8n_error: None,
            received_data: Some(received),
            timestamp: Some(timestamp),
        }
    }

    /// Rejection after a failed forwarding attempt.
    pub fn forward_failed(
        cause: &RelayError,
        received: serde_json::Value,
        timestamp: String,
    ) -> Self {
        Self {
            success: false,
            error: FORWARD_FAILURE_MESSAGE.to_string(),
            n8n_error: Some(cause.to_string()),
            received_data: Some(received),
            timestamp: Some(timestamp),
        }
    }
}

/// Wire-level outcome of one relay request.
#[derive(Debug, Clone)]
pub enum RelayResponse {
    /// Payload forwarded and accepted downstream.
    Accepted(RelayAccepted),
    /// Relaying stopped; `error` says where.
    Rejected {
        /// The failure that stopped the pipeline.
        error: RelayError,
        /// Body to serialize for the caller.
        body: RelayRejected,
    },
}

/// The relay pipeline.
///
/// Cheap to clone; handler tasks share the underlying client and sink.
#[derive(Debug, Clone)]
pub struct Relay {
    webhook_url: Option<String>,
    client: ForwardClient,
    clock: Arc<dyn Clock>,
    audit: Arc<dyn AuditSink>,
}

impl Relay {
    /// Builds the pipeline from configuration.
    ///
    /// A placeholder destination is treated as unconfigured here, once,
    /// instead of on every request.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Configuration`] when the forwarding client
    /// cannot be built.
    pub fn new(
        config: RelayConfig,
        clock: Arc<dyn Clock>,
        audit: Arc<dyn AuditSink>,
    ) -> Result<Self> {
        let webhook_url = config.webhook_url.filter(|url| !is_placeholder(url));
        let client = ForwardClient::new(config.client)?;

        Ok(Self { webhook_url, client, clock, audit })
    }

    /// Returns true when a destination is configured.
    pub fn is_configured(&self) -> bool {
        self.webhook_url.is_some()
    }

    /// Processes one inbound request end to end.
    ///
    /// Total: every failure mode maps to a [`RelayResponse`], never an
    /// `Err`. Exactly one forwarding attempt is made, and only when the
    /// event parsed and a destination is configured.
    pub async fn process(&self, method: &str, body: &[u8], meta: RequestMeta) -> RelayResponse {
        let validated = match validate::validate_request(method, body) {
            Ok(validated) => validated,
            Err(error) => {
                warn!(%error, "rejecting request before parse");
                return RelayResponse::Rejected { body: RelayRejected::bare(&error), error };
            },
        };

        self.audit
            .record(AuditRecord::EventReceived {
                at: self.now(),
                remote_addr: meta.remote_addr.clone().unwrap_or_else(|| UNKNOWN.to_string()),
                payload: validated.raw.clone(),
            })
            .await;

        let payload = normalize(&validated.event, &meta, self.clock.as_ref());
        let stamp = payload.timestamp.clone();

        let Some(url) = self.webhook_url.as_deref() else {
            let error = RelayError::WebhookNotConfigured;
            warn!("dropping event: no destination configured");
            self.audit
                .record(AuditRecord::RelaySkipped { at: self.now(), reason: error.to_string() })
                .await;
            return RelayResponse::Rejected {
                body: RelayRejected::not_configured(validated.raw, stamp),
                error,
            };
        };

        let serialized = match serde_json::to_string(&payload) {
            Ok(serialized) => serialized,
            Err(e) => {
                let error = RelayError::configuration(format!("payload serialization failed: {e}"));
                self.audit
                    .record(AuditRecord::RelaySkipped {
                        at: self.now(),
                        reason: error.to_string(),
                    })
                    .await;
                return RelayResponse::Rejected {
                    body: RelayRejected::forward_failed(&error, validated.raw, stamp),
                    error,
                };
            },
        };
        let payload_size = serialized.len();

        let outcome = self.client.forward(url, serialized).await;

        let (status, response, error_text) = match &outcome {
            ForwardOutcome::Sent { status, body } => (Some(*status), Some(body.clone()), None),
            ForwardOutcome::Failed { cause } => (None, None, Some(cause.clone())),
        };
        self.audit
            .record(AuditRecord::ForwardAttempted {
                at: self.now(),
                url: url.to_string(),
                payload_size,
                status,
                response,
                error: error_text,
            })
            .await;

        match reconcile(outcome) {
            RelayResult::Success { response } => {
                let flight_id = FlightId::new();
                info!(%flight_id, "flight date forwarded downstream");
                RelayResponse::Accepted(RelayAccepted {
                    success: true,
                    message: FORWARD_SUCCESS_MESSAGE.to_string(),
                    n8n_response: response,
                    timestamp: stamp,
                    flight_id: flight_id.to_string(),
                })
            },
            RelayResult::Failure { error, body: _ } => {
                warn!(%error, "flight date forwarding failed");
                RelayResponse::Rejected {
                    body: RelayRejected::forward_failed(&error, validated.raw, stamp),
                    error,
                }
            },
        }
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.clock.now_system())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, PoisonError};

    use serde_json::json;
    use skybridge_core::time::TestClock;
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    /// 2026-01-01 00:00:00 UTC.
    const NOW: u64 = 1_767_225_600;

    #[derive(Debug, Default)]
    struct CapturingSink {
        records: Mutex<Vec<AuditRecord>>,
    }

    impl CapturingSink {
        fn records(&self) -> Vec<AuditRecord> {
            self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }
    }

    #[async_trait::async_trait]
    impl AuditSink for CapturingSink {
        async fn record(&self, record: AuditRecord) {
            self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record);
        }
    }

    fn relay_to(url: Option<String>, audit: Arc<CapturingSink>) -> Relay {
        let config = RelayConfig { webhook_url: url, client: ClientConfig::default() };
        Relay::new(config, Arc::new(TestClock::at_unix_seconds(NOW)), audit)
            .expect("build relay")
    }

    fn event_json() -> serde_json::Value {
        json!({
            "source": "telegram_web_app",
            "action": "date_time_selected",
            "date_time": {
                "date": "2026-01-08",
                "time_24h": "14:30",
                "unix_timestamp": 1_767_882_600i64,
            }
        })
    }

    fn event_body() -> Vec<u8> {
        serde_json::to_vec(&event_json()).expect("serialize event")
    }

    #[tokio::test]
    async fn accepted_response_carries_full_contract() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&mock_server)
            .await;

        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(Some(mock_server.uri()), audit);

        let response = relay.process("POST", &event_body(), RequestMeta::default()).await;

        match response {
            RelayResponse::Accepted(accepted) => {
                assert!(accepted.success);
                assert_eq!(accepted.message, FORWARD_SUCCESS_MESSAGE);
                assert_eq!(accepted.n8n_response, json!({"ok": true}));
                assert_eq!(accepted.timestamp, "2026-01-01 00:00:00");
                assert!(accepted.flight_id.starts_with("FLIGHT_"));
            },
            RelayResponse::Rejected { error, .. } => panic!("unexpected rejection: {error}"),
        }
    }

    #[tokio::test]
    async fn forwarded_payload_is_the_normalized_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(Some(mock_server.uri()), audit);

        relay.process("POST", &event_body(), RequestMeta::default()).await;

        let requests = mock_server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);

        let forwarded: serde_json::Value =
            serde_json::from_slice(&requests[0].body).expect("forwarded body is JSON");
        assert_eq!(forwarded["event_type"], "flight_date_selection");
        assert_eq!(forwarded["source"], "telegram_web_app");
        assert_eq!(forwarded["action"], "date_time_selected");
        assert_eq!(forwarded["flight_schedule"]["date"], "2026-01-08");
        assert_eq!(forwarded["flight_schedule"]["is_future"], true);
        assert_eq!(forwarded["flight_schedule"]["days_until"], 7);
        assert_eq!(forwarded["validation"]["is_valid_date"], true);
        assert_eq!(forwarded["validation"]["is_valid_time"], true);
    }

    #[tokio::test]
    async fn downstream_error_reported_in_body() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(Some(mock_server.uri()), audit.clone());

        let response = relay.process("POST", &event_body(), RequestMeta::default()).await;

        match response {
            RelayResponse::Rejected { error, body } => {
                assert!(matches!(error, RelayError::DownstreamStatus { status: 500 }));
                assert!(!body.success);
                assert_eq!(body.error, FORWARD_FAILURE_MESSAGE);
                assert_eq!(body.n8n_error.as_deref(), Some("HTTP 500"));
                assert_eq!(body.received_data, Some(event_json()));
                assert_eq!(body.timestamp.as_deref(), Some("2026-01-01 00:00:00"));
            },
            RelayResponse::Accepted(_) => panic!("5xx must not relay successfully"),
        }

        let records = audit.records();
        let attempt = records
            .iter()
            .find_map(|record| match record {
                AuditRecord::ForwardAttempted { status, response, .. } => {
                    Some((*status, response.clone()))
                },
                _ => None,
            })
            .expect("forward attempt audited");
        assert_eq!(attempt.0, Some(500));
        assert_eq!(attempt.1.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn transport_failure_reports_cause_not_status() {
        let audit = Arc::new(CapturingSink::default());
        // Port 1 is never listening.
        let relay = relay_to(Some("http://127.0.0.1:1".to_string()), audit.clone());

        let response = relay.process("POST", &event_body(), RequestMeta::default()).await;

        match response {
            RelayResponse::Rejected { error, body } => {
                assert!(matches!(error, RelayError::Transport { .. }));
                let cause = body.n8n_error.expect("cause attached");
                assert!(!cause.starts_with("HTTP "), "transport cause looks like a status: {cause}");
            },
            RelayResponse::Accepted(_) => panic!("dead destination must not relay"),
        }

        let records = audit.records();
        assert!(records.iter().any(|record| matches!(
            record,
            AuditRecord::ForwardAttempted { status: None, error: Some(_), .. }
        )));
    }

    #[tokio::test]
    async fn unconfigured_destination_short_circuits() {
        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(None, audit.clone());
        assert!(!relay.is_configured());

        let response = relay.process("POST", &event_body(), RequestMeta::default()).await;

        match response {
            RelayResponse::Rejected { error, body } => {
                assert!(matches!(error, RelayError::WebhookNotConfigured));
                assert_eq!(body.error, "N8N webhook URL not configured");
                assert!(body.n8n_error.is_none());
                assert_eq!(body.received_data, Some(event_json()));
                assert!(body.timestamp.is_some());
            },
            RelayResponse::Accepted(_) => panic!("unconfigured relay must not succeed"),
        }

        let records = audit.records();
        assert_eq!(records.len(), 2);
        assert!(matches!(records[0], AuditRecord::EventReceived { .. }));
        assert!(matches!(records[1], AuditRecord::RelaySkipped { .. }));
    }

    #[tokio::test]
    async fn placeholder_destination_treated_as_unconfigured() {
        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(
            Some("https://your-n8n-domain.com/webhook/telegram-flight-date".to_string()),
            audit,
        );

        assert!(!relay.is_configured());

        let response = relay.process("POST", &event_body(), RequestMeta::default()).await;
        assert!(matches!(
            response,
            RelayResponse::Rejected { error: RelayError::WebhookNotConfigured, .. }
        ));
    }

    #[tokio::test]
    async fn malformed_body_rejected_without_audit() {
        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(None, audit.clone());

        let response = relay.process("POST", b"not json", RequestMeta::default()).await;

        match response {
            RelayResponse::Rejected { error, body } => {
                assert!(matches!(error, RelayError::MalformedInput));
                assert_eq!(body.error, "Invalid JSON data");
                assert!(body.received_data.is_none());
                assert!(body.timestamp.is_none());
            },
            RelayResponse::Accepted(_) => panic!("malformed input must not relay"),
        }

        assert!(audit.records().is_empty());
    }

    #[tokio::test]
    async fn non_post_method_rejected() {
        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(None, audit);

        let response = relay.process("PUT", &event_body(), RequestMeta::default()).await;

        match response {
            RelayResponse::Rejected { error, body } => {
                assert!(matches!(error, RelayError::InvalidMethod));
                assert_eq!(body.error, "Only POST method allowed");
                assert!(body.received_data.is_none());
            },
            RelayResponse::Accepted(_) => panic!("PUT must not relay"),
        }
    }

    #[tokio::test]
    async fn audit_trail_echoes_the_raw_document() {
        let mock_server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let audit = Arc::new(CapturingSink::default());
        let relay = relay_to(Some(mock_server.uri()), audit.clone());
        let meta = RequestMeta { remote_addr: Some("10.0.0.7".to_string()), ..Default::default() };

        relay.process("POST", &event_body(), meta).await;

        let records = audit.records();
        match &records[0] {
            AuditRecord::EventReceived { remote_addr, payload, .. } => {
                assert_eq!(remote_addr, "10.0.0.7");
                assert_eq!(payload, &event_json());
            },
            other => panic!("first record should be the received event, got {other:?}"),
        }
    }

    #[test]
    fn placeholder_detection() {
        assert!(is_placeholder(""));
        assert!(is_placeholder("   "));
        assert!(is_placeholder("https://your-n8n-domain.com/webhook/telegram-flight-date"));

        assert!(!is_placeholder("https://n8n.example.com/webhook/flight-date"));
    }
}
