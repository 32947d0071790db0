//! Flight-date relay handler.
//!
//! One route, dispatched by method: OPTIONS answers the CORS preflight,
//! GET serves a browser test page, POST runs the relay pipeline. Every
//! other method is rejected by the pipeline with 405.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use skybridge_core::{RelayError, RequestMeta};
use skybridge_relay::RelayResponse;
use tracing::{info, instrument};

use crate::AppState;

/// Interactive page for exercising the relay from a browser.
const TEST_PAGE: &str = include_str!("../static/test_page.html");

/// Relays a flight-date selection to the configured n8n webhook.
///
/// The response body is always JSON. Rejections before the event parses
/// map to 405 (wrong method) or 400 (malformed body); every later failure
/// is reported inside a 200 response so the mini-app can always read the
/// outcome.
#[instrument(
    name = "relay_flight_date",
    skip(state, headers, body),
    fields(
        method = %method,
        remote_addr = %addr,
        content_length = body.len(),
    )
)]
pub async fn relay_flight_date(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    if method == Method::GET {
        return Html(TEST_PAGE).into_response();
    }

    info!("Processing flight date relay request");

    let meta = request_meta(addr, &headers);
    match state.relay.process(method.as_str(), &body, meta).await {
        RelayResponse::Accepted(accepted) => (StatusCode::OK, Json(accepted)).into_response(),
        RelayResponse::Rejected { error, body } => {
            (rejection_status(&error), Json(body)).into_response()
        },
    }
}

/// Maps a pipeline failure to the response status.
///
/// Only the two pre-parse rejections change the status; later failures
/// keep 200 and report through the body.
fn rejection_status(error: &RelayError) -> StatusCode {
    match error {
        RelayError::InvalidMethod => StatusCode::METHOD_NOT_ALLOWED,
        RelayError::MalformedInput => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    }
}

/// Collects connection-level request context for the pipeline.
fn request_meta(addr: SocketAddr, headers: &HeaderMap) -> RequestMeta {
    let user_agent =
        headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()).map(ToString::to_string);

    let server_name = headers.get(header::HOST).and_then(|v| v.to_str().ok()).map(strip_port);

    RequestMeta { remote_addr: Some(addr.ip().to_string()), user_agent, server_name }
}

/// Drops a trailing `:port` from a Host header value.
///
/// Bare IPv6 addresses are left alone: only a bracketed name or one with
/// no other colon can carry a port.
fn strip_port(host: &str) -> String {
    match host.rsplit_once(':') {
        Some((name, port))
            if !port.is_empty()
                && port.bytes().all(|b| b.is_ascii_digit())
                && (name.ends_with(']') || !name.contains(':')) =>
        {
            name.to_string()
        },
        _ => host.to_string(),
    }
}
