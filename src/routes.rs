//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{id}`   - Short URL redirect (public)
//! - `GET  /ping`   - Storage liveness probe (public)
//! - `/api/*`       - REST API (caller identified by `X-User-Id`)

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower_http::LatencyUnit;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Constructs the application router with all routes and request tracing.
///
/// Each request gets an `INFO` span with method, URI and version; responses
/// are logged with status and latency in milliseconds.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/{id}", get(redirect_handler))
        .nest("/api", api::routes::api_routes())
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
}
