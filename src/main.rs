//! Skybridge flight-date relay service.
//!
//! Main entry point for the relay server. Initializes tracing, loads
//! configuration, wires the pipeline together, and serves the HTTP
//! surface until shutdown.

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use skybridge_api::{start_server, AppState, Config};
use skybridge_core::{AuditSink, Clock, FileAuditSink, NoOpAuditSink, RealClock};
use skybridge_relay::Relay;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from defaults, config.toml, and environment
    let config = Config::load()?;

    init_tracing(&config.rust_log);

    info!("Starting Skybridge flight-date relay");

    match config.configured_webhook_url() {
        Some(url) => info!(webhook_url = %url, "Forward destination configured"),
        None => warn!(
            "N8N webhook URL not configured; relay requests will be rejected until it is set"
        ),
    }

    let addr = config.parse_server_addr()?;

    let clock: Arc<dyn Clock> = Arc::new(RealClock::new());
    let audit: Arc<dyn AuditSink> = match config.audit_log() {
        Some(path) => {
            info!(path = %path.display(), "Audit log enabled");
            Arc::new(FileAuditSink::new(path))
        },
        None => {
            info!("Audit log disabled");
            Arc::new(NoOpAuditSink)
        },
    };

    let relay = Relay::new(config.to_relay_config(), clock.clone(), audit)
        .context("Failed to build relay pipeline")?;
    let state = AppState::new(Arc::new(relay), clock);

    info!(addr = %addr, "Skybridge is ready to relay flight dates");

    start_server(state, addr, Duration::from_secs(config.request_timeout))
        .await
        .context("Server failed")?;

    info!("Skybridge shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
///
/// `RUST_LOG` wins over the configured directives; an unparsable value
/// falls back to `info` instead of refusing to start.
fn init_tracing(directives: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(directives))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
