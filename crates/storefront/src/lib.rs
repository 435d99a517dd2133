//! FreshCart Storefront library.
//!
//! A server-rendered storefront over the FreshCart commerce API. The binary
//! in `main.rs` only loads configuration, sets up tracing and serves the
//! router built here, so the whole application can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod views;

use axum::{Router, extract::Request, middleware as axum_middleware};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{Span, field, info_span};

use crate::middleware::session::SessionKeyError;
use crate::state::AppState;

/// Directory static assets are served from.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the full application router.
///
/// Layers, innermost first: sessions, security headers, request id,
/// request tracing, then the Sentry hub and transaction layers.
///
/// # Errors
///
/// Returns an error if the session secret cannot be used as a signing key.
pub fn build_app(state: AppState) -> Result<Router, SessionKeyError> {
    let session_layer = middleware::create_session_layer(state.config())?;

    Ok(routes::routes()
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}

/// Request span with an empty `request_id` field for the request id
/// middleware to fill in.
fn request_span(request: &Request) -> Span {
    info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = field::Empty,
    )
}
