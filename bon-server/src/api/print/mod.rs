//! Print API
//!
//! | Path | Method | Description |
//! |------|--------|-------------|
//! | /print/test | POST | Test page on an ad-hoc printer |
//! | /print/receipt | POST | Receipt; routed as RECEIPT without a printer |
//! | /print/epson/qr | POST | QR card; routed as QR_CARD without a printer |
//! | /print/test-kind | POST | Test page on the printer routed for a kind |
//! | /print/drawer | POST | Cash drawer pulse |
//! | /print/status | GET | Reachability of the tenant's receipt printer |
//!
//! The tenant is taken from the `X-Tenant-Id` header.

mod handler;
pub mod request;

pub use handler::TENANT_HEADER;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/print", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/test", post(handler::test_print))
        .route("/receipt", post(handler::print_receipt))
        .route("/epson/qr", post(handler::print_qr))
        .route("/test-kind", post(handler::test_kind))
        .route("/drawer", post(handler::open_drawer))
        .route("/status", get(handler::status))
}
