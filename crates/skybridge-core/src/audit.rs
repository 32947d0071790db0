//! Audit sink for per-request diagnostics.
//!
//! The relay keeps no state, so the audit trail is the only place to
//! answer "what did we receive and what did n8n say". Sinks must swallow
//! their own failures: diagnostics can never interfere with relaying.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// One diagnostic record emitted by the relay pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditRecord {
    /// An inbound selection event arrived and parsed.
    EventReceived {
        /// When the event was recorded.
        at: DateTime<Utc>,
        /// Peer address of the caller.
        remote_addr: String,
        /// The caller's JSON document, verbatim.
        payload: serde_json::Value,
    },

    /// One outbound forwarding attempt finished.
    ForwardAttempted {
        /// When the attempt was recorded.
        at: DateTime<Utc>,
        /// Destination URL.
        url: String,
        /// Size of the serialized payload in bytes.
        payload_size: usize,
        /// HTTP status, when an exchange completed.
        status: Option<u16>,
        /// Raw downstream body, when an exchange completed.
        response: Option<String>,
        /// Transport failure description, when it did not.
        error: Option<String>,
    },

    /// Relaying stopped before any outbound attempt.
    RelaySkipped {
        /// When the skip was recorded.
        at: DateTime<Utc>,
        /// Why nothing was sent.
        reason: String,
    },
}

/// Destination for audit records.
///
/// Implementations must not propagate failures back to the pipeline; log
/// and drop is the worst acceptable outcome.
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync + std::fmt::Debug {
    /// Records one diagnostic entry.
    async fn record(&self, record: AuditRecord);
}

/// Audit sink that discards all records.
///
/// Used when auditing is disabled by configuration.
#[derive(Debug, Default)]
pub struct NoOpAuditSink;

impl NoOpAuditSink {
    /// Creates a new no-op sink.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl AuditSink for NoOpAuditSink {
    async fn record(&self, _record: AuditRecord) {}
}

/// Audit sink appending JSON lines to a file.
///
/// One record per line, written in a single append so concurrent requests
/// cannot interleave partial lines. Write failures are logged at warn
/// level and dropped; the file is created on first write.
#[derive(Debug, Clone)]
pub struct FileAuditSink {
    path: PathBuf,
}

impl FileAuditSink {
    /// Creates a sink writing to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path the sink appends to.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// `entry` must carry its own newline: one write per record, so
    /// concurrent appenders never split a line.
    async fn append(&self, entry: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait::async_trait]
impl AuditSink for FileAuditSink {
    async fn record(&self, record: AuditRecord) {
        let mut line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize audit record");
                return;
            },
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!(error = %e, path = %self.path.display(), "failed to append audit record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn received(remote_addr: &str) -> AuditRecord {
        AuditRecord::EventReceived {
            at: Utc::now(),
            remote_addr: remote_addr.to_string(),
            payload: serde_json::json!({"source": "telegram_web_app"}),
        }
    }

    #[tokio::test]
    async fn no_op_sink_discards_records() {
        let sink = NoOpAuditSink::new();
        sink.record(received("10.0.0.1")).await;
    }

    #[tokio::test]
    async fn file_sink_appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("audit.jsonl");
        let sink = FileAuditSink::new(&path);

        sink.record(received("10.0.0.1")).await;
        sink.record(AuditRecord::ForwardAttempted {
            at: Utc::now(),
            url: "https://n8n.example.com/webhook".to_string(),
            payload_size: 512,
            status: Some(200),
            response: Some(r#"{"ok":true}"#.to_string()),
            error: None,
        })
        .await;

        let contents = tokio::fs::read_to_string(&path).await.expect("read audit file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditRecord = serde_json::from_str(lines[0]).expect("parse first record");
        assert!(matches!(first, AuditRecord::EventReceived { .. }));

        let second: serde_json::Value = serde_json::from_str(lines[1]).expect("parse second line");
        assert_eq!(second["kind"], "forward_attempted");
        assert_eq!(second["status"], 200);
        assert_eq!(second["payload_size"], 512);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_every_line_parseable() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("audit.jsonl");
        let sink = std::sync::Arc::new(FileAuditSink::new(&path));

        // Large bodies make a torn append visible as an unparseable line.
        let body = "x".repeat(600);

        let mut writers = Vec::new();
        for task in 0..16u32 {
            let sink = sink.clone();
            let body = body.clone();
            writers.push(tokio::spawn(async move {
                for i in 0..32usize {
                    sink.record(AuditRecord::ForwardAttempted {
                        at: Utc::now(),
                        url: format!("https://n8n.example.com/webhook/{task}"),
                        payload_size: i,
                        status: Some(200),
                        response: Some(body.clone()),
                        error: None,
                    })
                    .await;
                }
            }));
        }
        for writer in writers {
            writer.await.expect("writer task");
        }

        let contents = tokio::fs::read_to_string(&path).await.expect("read audit file");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 16 * 32);
        for line in &lines {
            let parsed: AuditRecord = serde_json::from_str(line).expect("every line parses");
            assert!(matches!(parsed, AuditRecord::ForwardAttempted { .. }));
        }
    }

    #[tokio::test]
    async fn file_sink_swallows_write_failures() {
        // Directory path cannot be opened as a file; the record is dropped
        // without propagating an error.
        let dir = tempfile::tempdir().expect("create temp dir");
        let sink = FileAuditSink::new(dir.path());

        sink.record(received("10.0.0.1")).await;
    }

    #[test]
    fn records_round_trip_through_json() {
        let record = AuditRecord::RelaySkipped {
            at: Utc::now(),
            reason: "N8N webhook URL not configured".to_string(),
        };

        let line = serde_json::to_string(&record).expect("serialize record");
        let parsed: AuditRecord = serde_json::from_str(&line).expect("parse record");
        assert!(matches!(parsed, AuditRecord::RelaySkipped { .. }));
    }
}
