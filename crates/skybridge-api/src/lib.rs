//! Skybridge HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod handlers;
pub mod server;

use std::sync::Arc;

use skybridge_core::Clock;
use skybridge_relay::Relay;

pub use config::Config;
pub use server::{create_router, start_server};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The relay pipeline.
    pub relay: Arc<Relay>,
    /// Clock for handler-visible timestamps.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Creates handler state from its parts.
    pub fn new(relay: Arc<Relay>, clock: Arc<dyn Clock>) -> Self {
        Self { relay, clock }
    }
}
