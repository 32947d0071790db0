//! HTTP mocking for the n8n downstream.
//!
//! Thin wrapper over wiremock that names the interactions relay tests
//! care about: what the destination answers, and what it received.

use std::time::Duration;

use serde_json::Value;
use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

/// Mock n8n webhook destination.
pub struct MockDownstream {
    server: MockServer,
}

impl MockDownstream {
    /// Starts a mock server on an ephemeral port.
    pub async fn start() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Base URI of the mock server.
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// A realistic-looking webhook URL on the mock server.
    pub fn webhook_url(&self) -> String {
        format!("{}/webhook/telegram-flight-date", self.server.uri())
    }

    /// Answers every POST with the given status and JSON body.
    pub async fn respond_json(&self, status: u16, body: Value) {
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answers every POST with the given status and plain-text body.
    pub async fn respond_text(&self, status: u16, body: &str) {
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answers every POST with the given status and JSON body, but only
    /// after the delay elapses. Models a slow n8n workflow.
    pub async fn respond_json_after(&self, status: u16, body: Value, delay: Duration) {
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body).set_delay(delay))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the destination received.
    pub async fn request_count(&self) -> usize {
        self.server.received_requests().await.map_or(0, |requests| requests.len())
    }

    /// JSON bodies of every received request, in arrival order.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                serde_json::from_slice(&request.body).expect("downstream received JSON body")
            })
            .collect()
    }
}
