//! HTTP client for payload forwarding.
//!
//! One POST per inbound event with a fixed timeout, custom user agent, TLS
//! verification, and no redirect following. Completed exchanges surface
//! their status for the reconciler; everything else becomes a transport
//! cause that is never shaped like an HTTP status.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};

use skybridge_core::{error::RelayError, Result};

use crate::{DEFAULT_TIMEOUT_SECONDS, FORWARD_USER_AGENT};

/// Configuration for the forwarding client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Timeout covering the whole request, connect to body.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Whether to verify downstream TLS certificates.
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            user_agent: FORWARD_USER_AGENT.to_string(),
            verify_tls: true,
        }
    }
}

/// Result of one forwarding attempt.
#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    /// The HTTP exchange completed; the status is not interpreted here.
    Sent {
        /// HTTP status code returned by the destination.
        status: u16,
        /// Raw response body.
        body: String,
    },
    /// The request never completed an HTTP exchange.
    Failed {
        /// Transport failure description (timeout, DNS, TLS, connect).
        cause: String,
    },
}

/// HTTP client for forwarding normalized payloads.
///
/// Redirects are not followed: a 3xx answer is handed to the reconciler
/// as-is rather than chased to a new location the operator never vetted.
#[derive(Debug, Clone)]
pub struct ForwardClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ForwardClient {
    /// Creates a new forwarding client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Configuration`] if the HTTP client cannot be
    /// built with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                RelayError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a forwarding client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Forwards a serialized JSON payload to the destination URL.
    ///
    /// Never called with an unconfigured destination; the pipeline gates
    /// on that before serializing the payload.
    pub async fn forward(&self, url: &str, body: String) -> ForwardOutcome {
        let started = std::time::Instant::now();

        let span = info_span!("forward_payload", url = %url, payload_size = body.len());

        async move {
            tracing::debug!("starting forward attempt");

            let response = match self
                .client
                .post(url)
                .header("content-type", "application/json")
                .body(body)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    let duration = started.elapsed();
                    tracing::warn!(duration_ms = duration.as_millis(), "request failed: {}", e);
                    return ForwardOutcome::Failed { cause: self.transport_cause(&e) };
                },
            };

            let status = response.status().as_u16();

            let body = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("failed to read response body: {}", e);
                    return ForwardOutcome::Failed { cause: self.transport_cause(&e) };
                },
            };

            tracing::debug!(
                status,
                duration_ms = started.elapsed().as_millis(),
                "received response"
            );

            ForwardOutcome::Sent { status, body }
        }
        .instrument(span)
        .await
    }

    /// Describes a reqwest failure as a transport cause.
    fn transport_cause(&self, error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("request timed out after {}s", self.config.timeout.as_secs())
        } else if error.is_connect() {
            format!("connection failed: {error}")
        } else {
            error.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn completed_exchange_reports_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/webhook"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&mock_server)
            .await;

        let client = ForwardClient::with_defaults().unwrap();
        let outcome =
            client.forward(&format!("{}/webhook", mock_server.uri()), "{}".to_string()).await;

        match outcome {
            ForwardOutcome::Sent { status, body } => {
                assert_eq!(status, 200);
                assert_eq!(body, r#"{"ok":true}"#);
            },
            ForwardOutcome::Failed { cause } => panic!("unexpected failure: {cause}"),
        }
    }

    #[tokio::test]
    async fn error_statuses_still_count_as_sent() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = ForwardClient::with_defaults().unwrap();
        let outcome = client.forward(&mock_server.uri(), "{}".to_string()).await;

        match outcome {
            ForwardOutcome::Sent { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "Internal Server Error");
            },
            ForwardOutcome::Failed { cause } => panic!("unexpected failure: {cause}"),
        }
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_failure() {
        let client = ForwardClient::with_defaults().unwrap();

        // Port 1 is never listening.
        let outcome = client.forward("http://127.0.0.1:1/webhook", "{}".to_string()).await;

        match outcome {
            ForwardOutcome::Failed { cause } => {
                assert!(!cause.starts_with("HTTP "), "transport cause looks like a status: {cause}");
            },
            ForwardOutcome::Sent { status, .. } => panic!("unexpected exchange: {status}"),
        }
    }

    #[tokio::test]
    async fn requests_carry_relay_user_agent_and_json_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::header("user-agent", FORWARD_USER_AGENT))
            .and(matchers::header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let client = ForwardClient::with_defaults().unwrap();
        let outcome = client.forward(&mock_server.uri(), "{}".to_string()).await;

        assert!(matches!(outcome, ForwardOutcome::Sent { status: 200, .. }));
    }

    #[tokio::test]
    async fn redirects_are_not_followed() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/webhook"))
            .respond_with(
                ResponseTemplate::new(302).append_header("location", "/elsewhere"),
            )
            .mount(&mock_server)
            .await;

        let client = ForwardClient::with_defaults().unwrap();
        let outcome =
            client.forward(&format!("{}/webhook", mock_server.uri()), "{}".to_string()).await;

        // The 302 itself is the outcome; /elsewhere is never requested.
        assert!(matches!(outcome, ForwardOutcome::Sent { status: 302, .. }));
    }

    #[test]
    fn default_config_matches_contract() {
        let config = ClientConfig::default();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "Skybridge-Flight-Relay/1.0");
        assert!(config.verify_tls);
    }
}
