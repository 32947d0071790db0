//! Test infrastructure and utilities for deterministic relay testing.
//!
//! Provides a ready-made downstream mock, a pinned clock, a recording
//! audit sink, and fixture builders so integration tests read as
//! scenarios instead of setup code.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, PoisonError};

use skybridge_core::{AuditRecord, AuditSink};
use skybridge_relay::{ClientConfig, Relay, RelayConfig};

pub mod fixtures;
pub mod http;

pub use fixtures::InboundEventBuilder;
pub use http::MockDownstream;
pub use skybridge_core::{Clock, TestClock};

/// 2026-01-01 00:00:00 UTC; every pinned test clock starts here.
pub const BASE_EPOCH: u64 = 1_767_225_600;

/// Audit sink that records everything for later assertions.
#[derive(Debug, Default)]
pub struct RecordingAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl RecordingAuditSink {
    /// Snapshot of the records captured so far.
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// True when nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

#[async_trait::async_trait]
impl AuditSink for RecordingAuditSink {
    async fn record(&self, record: AuditRecord) {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record);
    }
}

/// Test environment for relay scenarios.
///
/// Bundles the pieces every end-to-end test needs:
/// - A wiremock downstream standing in for n8n
/// - A deterministic clock pinned to [`BASE_EPOCH`]
/// - An audit sink that records instead of writing files
pub struct TestEnv {
    /// Mock n8n destination.
    pub downstream: MockDownstream,
    /// Deterministic clock for time-based assertions.
    pub clock: TestClock,
    /// Captured audit records.
    pub audit: Arc<RecordingAuditSink>,
}

impl TestEnv {
    /// Creates a fresh environment with its own mock downstream.
    pub async fn new() -> Self {
        Self {
            downstream: MockDownstream::start().await,
            clock: TestClock::at_unix_seconds(BASE_EPOCH),
            audit: Arc::new(RecordingAuditSink::default()),
        }
    }

    /// Builds a relay pointed at the mock downstream.
    pub fn relay(&self) -> Relay {
        self.relay_with_url(Some(self.downstream.uri()))
    }

    /// Builds a relay with an explicit (or absent) destination.
    pub fn relay_with_url(&self, webhook_url: Option<String>) -> Relay {
        let config = RelayConfig { webhook_url, client: ClientConfig::default() };
        Relay::new(config, Arc::new(self.clock.clone()), self.audit.clone())
            .expect("relay builds from test config")
    }
}
