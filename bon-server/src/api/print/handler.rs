//! Print API Handlers

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use bon_printer::QR_MAX_BYTES;
use serde::Serialize;
use shared::error::{ApiResponse, AppError, AppResult};
use shared::models::{PrintKind, Vendor};
use tracing::info;

use super::request::{
    DrawerRequest, QrRequest, ReceiptRequest, TestKindRequest, TestPrintRequest, optional_printer,
};
use crate::core::ServerState;
use crate::printing::PrintReport;

/// Tenant header
pub const TENANT_HEADER: &str = "x-tenant-id";

/// Unwrap a JSON body, reporting parse failures as `INVALID_PAYLOAD`
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::invalid_payload(rejection.body_text()))
}

fn tenant(state: &ServerState, headers: &HeaderMap) -> String {
    headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(state.default_tenant())
        .to_string()
}

/// POST /print/test - test page
pub async fn test_print(
    State(state): State<ServerState>,
    payload: Result<Json<TestPrintRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PrintReport>> {
    let req = body(payload)?;
    let printer = req
        .printer
        .ok_or_else(|| AppError::missing_printer_fields("Printer is required"))?
        .into_config()?;

    let report = state.print_service.test_print(&printer).await?;
    Ok(ApiResponse::success(report))
}

/// POST /print/receipt - print a receipt
pub async fn print_receipt(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<ReceiptRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PrintReport>> {
    let req = body(payload)?;

    let report = match optional_printer(req.printer)? {
        Some(printer) => {
            state
                .print_service
                .print_receipt(&req.content.into_job(printer))
                .await?
        }
        None => {
            let tenant = tenant(&state, &headers);
            state
                .print_service
                .print_kind(&tenant, PrintKind::Receipt, req.content)
                .await?
        }
    };
    Ok(ApiResponse::success(report))
}

/// POST /print/epson/qr - print a QR card
pub async fn print_qr(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<QrRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PrintReport>> {
    let req = body(payload)?;
    if req.data.trim().is_empty() {
        return Err(AppError::invalid_payload("QR data is required"));
    }
    if req.data.len() > QR_MAX_BYTES {
        return Err(AppError::invalid_payload(format!(
            "QR data too long: {} bytes (max {})",
            req.data.len(),
            QR_MAX_BYTES
        )));
    }

    // Plain ESC/POS on this endpoint means an Epson QR command set
    let generic_driver = req
        .printer
        .as_ref()
        .and_then(|p| p.driver.as_deref())
        .is_some_and(|d| d.trim() == "ESC_POS_TCP");

    let printer = match optional_printer(req.printer)? {
        Some(mut printer) => {
            if generic_driver && printer.vendor == Vendor::GenericEscpos {
                printer.vendor = Vendor::Epson;
            }
            printer
        }
        None => {
            let tenant = tenant(&state, &headers);
            state.print_service.resolve(&tenant, PrintKind::QrCard)?
        }
    };

    let report = state
        .print_service
        .print_qr(&printer, &req.data, req.caption.as_deref())
        .await?;
    Ok(ApiResponse::success(report))
}

/// POST /print/test-kind - routed test page
pub async fn test_kind(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<TestKindRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PrintReport>> {
    let req = body(payload)?;
    let tenant = tenant(&state, &headers);
    info!(tenant = %tenant, kind = %req.kind, "Routed test print");

    let report = state.print_service.test_kind(&tenant, req.kind).await?;
    Ok(ApiResponse::success(report))
}

/// POST /print/drawer - kick the cash drawer
pub async fn open_drawer(
    State(state): State<ServerState>,
    headers: HeaderMap,
    payload: Result<Json<DrawerRequest>, JsonRejection>,
) -> AppResult<ApiResponse<PrintReport>> {
    let req = body(payload)?;

    let printer = match optional_printer(req.printer)? {
        Some(printer) => printer,
        None => {
            let tenant = tenant(&state, &headers);
            state.print_service.resolve(&tenant, PrintKind::Receipt)?
        }
    };

    let report = state.print_service.open_drawer(&printer).await?;
    Ok(ApiResponse::success(report))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrinterStatus {
    printer_id: String,
    address: String,
    vendor: Vendor,
    online: bool,
}

/// GET /print/status - receipt printer reachability
pub async fn status(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> AppResult<ApiResponse<PrinterStatus>> {
    let tenant = tenant(&state, &headers);
    let printer = state.print_service.resolve(&tenant, PrintKind::Receipt)?;
    let online = state.print_service.printer_online(&printer).await;

    Ok(ApiResponse::success(PrinterStatus {
        printer_id: printer.id.clone(),
        address: printer.address(),
        vendor: printer.vendor,
        online,
    }))
}
