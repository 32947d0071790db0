//! Health check handler for service monitoring.
//!
//! The relay holds no external state worth probing (the n8n destination is
//! checked per request), so a single liveness endpoint is enough.

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use tracing::{debug, instrument};

use crate::AppState;

/// Liveness check endpoint for orchestration probes.
///
/// Returns a simple response indicating the service process is alive.
/// This is a minimal check that doesn't test external dependencies,
/// focusing only on whether the HTTP server is responding.
#[instrument(name = "liveness_check", skip(app_state))]
pub async fn liveness_check(State(app_state): State<AppState>) -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": chrono::DateTime::<chrono::Utc>::from(app_state.clock.now_system()),
        "service": "skybridge-api"
    });

    (StatusCode::OK, Json(response)).into_response()
}
