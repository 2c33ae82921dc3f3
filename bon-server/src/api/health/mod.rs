//! Health check
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /health | GET | Liveness |
//!
//! ```json
//! { "status": "ok", "service": "bon-server", "version": "0.1.0" }
//! ```

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "bon-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
