//! Outbound forwarding and reconciliation for the Skybridge relay.
//!
//! Owns the side-effecting half of the pipeline: one HTTP POST of the
//! normalized payload to the configured n8n endpoint, and the mapping of
//! whatever comes back into the stable caller-facing contract. Exactly one
//! attempt per inbound event; there is no queueing or retrying here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod pipeline;
pub mod reconcile;

pub use client::{ClientConfig, ForwardClient, ForwardOutcome};
pub use pipeline::{
    is_placeholder, Relay, RelayAccepted, RelayConfig, RelayRejected, RelayResponse,
    FORWARD_FAILURE_MESSAGE, FORWARD_SUCCESS_MESSAGE,
};
pub use reconcile::{reconcile, RelayResult};

/// Default timeout for forwarding requests, in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// User agent sent on every forwarding request.
pub const FORWARD_USER_AGENT: &str = "Skybridge-Flight-Relay/1.0";

/// Marker identifying a destination URL that was never configured.
pub const PLACEHOLDER_MARKER: &str = "your-n8n-domain";
