//! API routes
//!
//! - [`health`] - liveness
//! - [`print`] - print jobs

pub mod health;
pub mod middleware;
pub mod print;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Receipts are small; anything larger is a client bug
const MAX_BODY_BYTES: usize = 256 * 1024;
/// Concurrent requests; jobs for one printer queue behind its lock anyway
const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Build the application router
pub fn build_app(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(print::router())
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(ConcurrencyLimitLayer::new(MAX_CONCURRENT_REQUESTS))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
