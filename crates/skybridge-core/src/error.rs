//! Error taxonomy for relay operations.
//!
//! Every failure mode is recovered locally into a caller-facing response;
//! none aborts the process. Display strings double as the wire-level error
//! messages the mini-app shows, so they are part of the caller contract.

use thiserror::Error;

/// Result type alias for relay operations.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure modes of the relay pipeline.
#[derive(Debug, Clone, Error)]
pub enum RelayError {
    /// Request used an HTTP method other than POST.
    #[error("Only POST method allowed")]
    InvalidMethod,

    /// Request body was empty or could not be parsed into a selection event.
    #[error("Invalid JSON data")]
    MalformedInput,

    /// Destination webhook URL is unset or still the shipped placeholder.
    #[error("N8N webhook URL not configured")]
    WebhookNotConfigured,

    /// Relay setup prevented an outbound attempt.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem
        message: String,
    },

    /// Outbound request never completed an HTTP exchange.
    ///
    /// The cause describes the transport failure (timeout, DNS, TLS,
    /// connect) and is never shaped like an HTTP status.
    #[error("{cause}")]
    Transport {
        /// Description of the transport failure
        cause: String,
    },

    /// Downstream answered outside the accepted `[200, 400)` status range.
    #[error("HTTP {status}")]
    DownstreamStatus {
        /// HTTP status code returned by the destination
        status: u16,
    },
}

impl RelayError {
    /// Creates a configuration error from a message.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Creates a transport error from a cause description.
    pub fn transport(cause: impl Into<String>) -> Self {
        Self::Transport { cause: cause.into() }
    }

    /// Creates a downstream status error.
    pub fn downstream_status(status: u16) -> Self {
        Self::DownstreamStatus { status }
    }

    /// Returns true when the failure happened before an event was parsed.
    ///
    /// Pre-parse rejections are the only ones reported with a 4xx status;
    /// everything later is reported in the response body instead.
    pub fn is_pre_parse(&self) -> bool {
        matches!(self, Self::InvalidMethod | Self::MalformedInput)
    }
}
