//! Print job orchestration
//!
//! render -> encode -> send -> report. One job is one connection; failures
//! are returned to the caller and never retried.

use bon_printer::{Directive, Encoder, NetworkPrinter};
use shared::models::{PrintKind, PrinterConfig, ReceiptContent, ReceiptJob};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use super::locks::PrinterLocks;
use super::renderer::ReceiptRenderer;
use super::router::{PrintRouter, PrinterDirectory};
use super::types::{PrintJobError, PrintJobResult, PrintReport};
use crate::core::Config;

/// Print service
///
/// Responsibilities:
/// - Validate the printer and pick the vendor encoder before any I/O
/// - Render receipts, test pages, QR cards and drawer pulses
/// - Serialize jobs per printer address
#[derive(Clone)]
pub struct PrintService {
    router: PrintRouter,
    locks: Arc<PrinterLocks>,
    write_timeout: Duration,
    post_write_grace: Duration,
    shutdown: CancellationToken,
}

impl PrintService {
    pub fn new(
        config: &Config,
        directory: Arc<dyn PrinterDirectory>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            router: PrintRouter::new(directory),
            locks: Arc::new(PrinterLocks::new()),
            write_timeout: config.write_timeout(),
            post_write_grace: config.post_write_grace(),
            shutdown,
        }
    }

    /// Resolve the printer for a print kind
    pub fn resolve(&self, tenant: &str, kind: PrintKind) -> PrintJobResult<PrinterConfig> {
        Ok(self.router.resolve(tenant, kind)?)
    }

    // === Receipts ===

    /// Print a receipt on the printer named in the job
    #[instrument(
        skip(self, job),
        fields(job_id = %uuid::Uuid::new_v4(), printer_id = %job.printer.id, lines = job.lines.len())
    )]
    pub async fn print_receipt(&self, job: &ReceiptJob) -> PrintJobResult<PrintReport> {
        let printer = &job.printer;
        printer.validate().map_err(PrintJobError::InvalidPrinter)?;
        job.validate().map_err(PrintJobError::InvalidJob)?;
        let encoder = Encoder::for_vendor(printer.vendor)?;

        let builder = ReceiptRenderer::new(printer).render(job);
        let data = encoder.encode(builder.directives(), printer.ascii_safe_mode)?;

        self.deliver(printer, &data).await
    }

    /// Route a receipt by kind, then print it
    pub async fn print_kind(
        &self,
        tenant: &str,
        kind: PrintKind,
        content: ReceiptContent,
    ) -> PrintJobResult<PrintReport> {
        let printer = self.resolve(tenant, kind)?;
        info!(tenant, %kind, printer_id = %printer.id, "Routed receipt");
        self.print_receipt(&content.into_job(printer)).await
    }

    // === Raw jobs ===

    /// Encode and send a directive sequence as-is
    #[instrument(
        skip(self, printer, directives),
        fields(job_id = %uuid::Uuid::new_v4(), printer_id = %printer.id, directives = directives.len())
    )]
    pub async fn print_raw(
        &self,
        printer: &PrinterConfig,
        directives: &[Directive],
    ) -> PrintJobResult<PrintReport> {
        printer.validate().map_err(PrintJobError::InvalidPrinter)?;
        let encoder = Encoder::for_vendor(printer.vendor)?;
        let data = encoder.encode(directives, printer.ascii_safe_mode)?;

        self.deliver(printer, &data).await
    }

    /// Print a test page
    pub async fn test_print(&self, printer: &PrinterConfig) -> PrintJobResult<PrintReport> {
        let builder = ReceiptRenderer::new(printer).render_test(None);
        self.print_raw(printer, builder.directives()).await
    }

    /// Print a test page on the printer routed for `kind`
    pub async fn test_kind(&self, tenant: &str, kind: PrintKind) -> PrintJobResult<PrintReport> {
        let printer = self.resolve(tenant, kind)?;
        let builder = ReceiptRenderer::new(&printer).render_test(Some(kind));
        self.print_raw(&printer, builder.directives()).await
    }

    /// Pulse the cash drawer
    ///
    /// Explicit request; kicks the configured pin even if the printer is
    /// not flagged as having a drawer.
    pub async fn open_drawer(&self, printer: &PrinterConfig) -> PrintJobResult<PrintReport> {
        if !printer.drawer_enabled {
            warn!(printer_id = %printer.id, "Drawer kick on printer without drawer flag");
        }
        let builder = ReceiptRenderer::new(printer).render_drawer();
        self.print_raw(printer, builder.directives()).await
    }

    /// Print a QR code with an optional caption
    pub async fn print_qr(
        &self,
        printer: &PrinterConfig,
        data: &str,
        caption: Option<&str>,
    ) -> PrintJobResult<PrintReport> {
        let builder = ReceiptRenderer::new(printer).render_qr(data, caption);
        self.print_raw(printer, builder.directives()).await
    }

    /// Connect-only reachability check
    pub async fn printer_online(&self, printer: &PrinterConfig) -> bool {
        NetworkPrinter::from_config(printer).probe().await
    }

    /// Send one payload while holding the printer's lock
    async fn deliver(&self, printer: &PrinterConfig, data: &[u8]) -> PrintJobResult<PrintReport> {
        let addr = printer.address();
        let _guard = self.locks.acquire(&addr).await;

        let report = NetworkPrinter::from_config(printer)
            .with_write_timeout(self.write_timeout)
            .with_post_write_grace(self.post_write_grace)
            .send_cancellable(data, &self.shutdown)
            .await?;

        Ok(PrintReport::new(&printer.id, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printing::router::InMemoryDirectory;
    use shared::error::PrintErrorKind;
    use shared::models::{PrintRoute, ReceiptLine, ReceiptTotals, Vendor};
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    fn service(directory: InMemoryDirectory) -> (PrintService, CancellationToken) {
        let token = CancellationToken::new();
        let svc = PrintService::new(&Config::default(), Arc::new(directory), token.clone());
        (svc, token)
    }

    /// Accept one connection and return everything it received
    async fn capture() -> (u16, tokio::task::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            buf
        });
        (port, handle)
    }

    fn content() -> ReceiptContent {
        ReceiptContent {
            header: Default::default(),
            lines: vec![
                ReceiptLine::priced("Koffie", 2, 250),
                ReceiptLine::priced("Appeltaart", 1, 350),
            ],
            totals: ReceiptTotals {
                subtotal_cents: 850,
                vat_breakdown: vec![],
                total_cents: 850,
            },
            footer: Default::default(),
            cut: true,
            open_drawer: false,
        }
    }

    #[tokio::test]
    async fn test_receipt_reaches_printer() {
        let (port, received) = capture().await;
        let (svc, _) = service(InMemoryDirectory::new());
        let printer = PrinterConfig::new("p1", Vendor::Star, "127.0.0.1", port);

        let report = svc.print_receipt(&content().into_job(printer)).await.unwrap();
        let bytes = received.await.unwrap();

        assert_eq!(report.printer_id, "p1");
        assert_eq!(report.bytes_sent, bytes.len());
        assert!(bytes.starts_with(&[0x1B, 0x40]));
        assert!(bytes.ends_with(&[0x1B, 0x69]));
        // € is 0x80 in WPC1252
        assert!(bytes.windows(6).any(|w| w == b"\x80 8,50"));
    }

    #[tokio::test]
    async fn test_invalid_printer_fails_before_connect() {
        let (svc, _) = service(InMemoryDirectory::new());
        let printer = PrinterConfig::new("p1", Vendor::Epson, "", 9100);

        let err = svc.print_receipt(&content().into_job(printer)).await.unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::MissingPrinterFields);
    }

    #[tokio::test]
    async fn test_overflowing_line_total_fails_before_connect() {
        let (svc, _) = service(InMemoryDirectory::new());
        // Nothing listens here; validation must fail first
        let printer = PrinterConfig::new("p1", Vendor::Epson, "127.0.0.1", 9);
        let mut content = content();
        content
            .lines
            .push(ReceiptLine::priced("Koffie", 10_000_000_000, 10_000_000_000));

        let err = svc.print_receipt(&content.into_job(printer)).await.unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::InvalidPayload);
    }

    #[tokio::test]
    async fn test_oversized_qr_fails_before_connect() {
        let (svc, _) = service(InMemoryDirectory::new());
        let printer = PrinterConfig::new("p1", Vendor::Epson, "127.0.0.1", 9);

        let data = "x".repeat(bon_printer::QR_MAX_BYTES + 1);
        let err = svc.print_qr(&printer, &data, None).await.unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::InvalidPayload);
    }

    #[tokio::test]
    async fn test_print_kind_uses_default_route() {
        let (port, received) = capture().await;
        let dir = InMemoryDirectory::new();
        dir.upsert_printer(
            "t1",
            PrinterConfig::new("p1", Vendor::Epson, "127.0.0.1", port),
        );
        dir.add_route("t1", PrintRoute::new(PrintKind::Receipt, "p1", true));
        let (svc, _) = service(dir);

        let report = svc
            .print_kind("t1", PrintKind::Kitchen, content())
            .await
            .unwrap();
        assert_eq!(report.printer_id, "p1");

        // Epson full cut
        let bytes = received.await.unwrap();
        assert!(bytes.ends_with(&[0x1D, 0x56, 0x42, 0x00]));
    }

    #[tokio::test]
    async fn test_print_kind_without_routes() {
        let (svc, _) = service(InMemoryDirectory::new());
        let err = svc
            .print_kind("t1", PrintKind::Bar, content())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::NoPrinterConfigured);
    }

    #[tokio::test]
    async fn test_drawer_kick_bytes() {
        let (port, received) = capture().await;
        let (svc, _) = service(InMemoryDirectory::new());
        let mut printer = PrinterConfig::new("p1", Vendor::Epson, "127.0.0.1", port);
        printer.drawer_pin = shared::models::DrawerPin::Pin5;

        svc.open_drawer(&printer).await.unwrap();
        assert_eq!(
            received.await.unwrap(),
            vec![0x1B, 0x40, 0x1B, 0x70, 0x01, 0x40, 0x40]
        );
    }

    #[tokio::test]
    async fn test_shutdown_cancels_jobs() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (svc, token) = service(InMemoryDirectory::new());
        token.cancel();

        let printer = PrinterConfig::new("p1", Vendor::Star, "127.0.0.1", port);
        let err = svc.test_print(&printer).await.unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::PrintCancelled);
    }

    #[tokio::test]
    async fn test_refused_port() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let (svc, _) = service(InMemoryDirectory::new());
        let printer = PrinterConfig::new("p1", Vendor::GenericEscpos, "127.0.0.1", port);

        let err = svc.test_print(&printer).await.unwrap_err();
        assert_eq!(err.kind(), PrintErrorKind::ConnectRefused);
        assert!(!svc.printer_online(&printer).await);
    }
}
