//! Reconciliation of forwarding outcomes into caller-facing results.
//!
//! The accepted status range is `[200, 400)`: redirects count as accepted
//! because the client never follows them, so a 3xx is the destination's
//! final word. Status failures keep the raw downstream body for the audit
//! trail; transport failures carry only their cause.

use skybridge_core::error::RelayError;

use crate::client::ForwardOutcome;

/// Reconciled outcome of one relay attempt.
#[derive(Debug, Clone)]
pub enum RelayResult {
    /// Downstream accepted the payload.
    Success {
        /// Downstream response body, parsed as JSON when it is JSON,
        /// otherwise the raw text as a JSON string.
        response: serde_json::Value,
    },
    /// Forwarding failed; `error` names the cause.
    Failure {
        /// Transport or downstream-status error.
        error: RelayError,
        /// Raw downstream body for diagnostics, when an exchange completed.
        body: Option<String>,
    },
}

/// Maps a forwarding outcome onto the caller-facing result.
pub fn reconcile(outcome: ForwardOutcome) -> RelayResult {
    match outcome {
        ForwardOutcome::Failed { cause } => {
            RelayResult::Failure { error: RelayError::transport(cause), body: None }
        },
        ForwardOutcome::Sent { status, body } if (200..400).contains(&status) => {
            let response = match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(parsed) => parsed,
                Err(_) => serde_json::Value::String(body),
            };
            RelayResult::Success { response }
        },
        ForwardOutcome::Sent { status, body } => RelayResult::Failure {
            error: RelayError::downstream_status(status),
            body: Some(body),
        },
    }
}
