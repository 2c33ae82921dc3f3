mod common;

use bon_server::printing::InMemoryDirectory;
use bon_server::{Config, ServerState, build_app};
use common::{app, busy_printer, contains, fake_printer, get, post, test_config};
use http::StatusCode;
use serde_json::{Value, json};
use shared::models::{PrintKind, PrintRoute, PrinterConfig, Vendor};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

fn koffie_receipt() -> Value {
    json!({
        "header": {"businessName": "Café de Hoek", "jobLabel": "Tafel 4"},
        "lines": [
            {"title": "Koffie", "qty": 2, "unitPriceCents": 250},
            {"title": "Appeltaart", "qty": 1, "unitPriceCents": 350}
        ],
        "totals": {
            "subtotalCents": 780,
            "vatBreakdown": [{"ratePercent": 9, "amountCents": 70}],
            "totalCents": 850
        },
        "footer": {"paidWith": "PIN"}
    })
}

fn cafe(port: u16) -> InMemoryDirectory {
    let dir = InMemoryDirectory::new();
    dir.upsert_printer(
        "cafe",
        PrinterConfig::new("star-1", Vendor::Star, "127.0.0.1", port),
    );
    dir.add_route("cafe", PrintRoute::new(PrintKind::Receipt, "star-1", true));
    dir
}

#[tokio::test]
async fn test_routed_receipt_reaches_star_printer() {
    let (port, received) = fake_printer(1).await;
    let (app, _) = app(cafe(port));

    let (status, body) = post(
        &app,
        "/print/receipt",
        &koffie_receipt().to_string(),
        Some("cafe"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["printerId"], "star-1");

    let job = &received.await.unwrap()[0];
    // ESC @ then code page WPC1252
    assert!(job.starts_with(&[0x1B, 0x40, 0x1B, 0x74, 0x10]));
    assert!(contains(job, b"2x Koffie"));
    assert!(contains(job, b"\x80 8,50"));
    assert!(job.ends_with(&[0x1B, 0x69]));
}

#[tokio::test]
async fn test_explicit_printer_overrides_routing() {
    let (port, received) = fake_printer(1).await;
    let (app, _) = app(InMemoryDirectory::new());

    let mut request = koffie_receipt();
    request["printer"] = json!({
        "vendor": "EPSON",
        "host": "127.0.0.1",
        "port": port,
        "cutMode": "partial",
        "asciiSafeMode": true
    });
    let (status, _) = post(&app, "/print/receipt", &request.to_string(), None).await;
    assert_eq!(status, StatusCode::OK);

    let job = &received.await.unwrap()[0];
    assert!(contains(job, b"EUR 8,50"));
    assert!(contains(job, b"Cafe de Hoek"));
    assert!(job.ends_with(&[0x1D, 0x56, 0x41, 0x00]), "Epson partial cut last");
}

#[tokio::test]
async fn test_kind_falls_back_to_default_route() {
    let (port, received) = fake_printer(1).await;
    let (app, _) = app(cafe(port));

    let (status, body) = post(
        &app,
        "/print/test-kind",
        &json!({"kind": "KITCHEN"}).to_string(),
        Some("cafe"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["printerId"], "star-1");

    let job = &received.await.unwrap()[0];
    assert!(contains(job, b"KITCHEN"));
}

#[tokio::test]
async fn test_unknown_tenant_has_no_printer() {
    let (app, _) = app(cafe(9100));
    let (status, body) = post(
        &app,
        "/print/test-kind",
        &json!({"kind": "BAR"}).to_string(),
        Some("elsewhere"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NO_PRINTER_CONFIGURED");
}

#[tokio::test]
async fn test_inactive_printer_is_conflict() {
    let dir = InMemoryDirectory::new();
    let mut printer = PrinterConfig::new("bar-1", Vendor::Epson, "127.0.0.1", 9100);
    printer.is_active = false;
    dir.upsert_printer("cafe", printer);
    dir.add_route("cafe", PrintRoute::new(PrintKind::Bar, "bar-1", false));
    let (app, _) = app(dir);

    let (status, body) = post(
        &app,
        "/print/test-kind",
        &json!({"kind": "BAR"}).to_string(),
        Some("cafe"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "PRINTER_INACTIVE");
}

#[tokio::test]
async fn test_same_printer_jobs_never_overlap() {
    let (port, received) = busy_printer(3, Duration::from_millis(30), &[0x1B, 0x69]).await;
    // Long grace so each client waits for the printer to close
    let mut config = test_config();
    config.post_write_grace_ms = 500;
    let app = build_app(ServerState::with_directory(config, Arc::new(cafe(port))));

    let requests = (0..3).map(|_| {
        let app = app.clone();
        async move {
            post(
                &app,
                "/print/receipt",
                &koffie_receipt().to_string(),
                Some("cafe"),
            )
            .await
        }
    });
    for (status, body) in futures::future::join_all(requests).await {
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["data"]["peerClosed"], true);
    }

    let (jobs, peak) = received.await.unwrap();
    assert_eq!(peak, 1, "one connection per printer at a time");
    assert_eq!(jobs.len(), 3);
    for job in jobs {
        // One whole job per connection
        assert!(job.starts_with(&[0x1B, 0x40]));
        assert!(job.ends_with(&[0x1B, 0x69]));
    }
}

#[tokio::test]
async fn test_drawer_endpoint() {
    let (port, received) = fake_printer(1).await;
    let (app, _) = app(cafe(port));

    let (status, _) = post(&app, "/print/drawer", "{}", Some("cafe")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        received.await.unwrap()[0],
        vec![0x1B, 0x40, 0x1B, 0x70, 0x00, 0x40, 0x40]
    );
}

#[tokio::test]
async fn test_status_without_default_tenant_route() {
    let (app, _) = app(cafe(9100));

    let (status, body) = get(&app, "/print/status").await;
    // No tenant header: the default tenant has no routes here
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NO_PRINTER_CONFIGURED");
}

#[tokio::test]
async fn test_env_star_printer_and_routes_file() {
    let (port, received) = fake_printer(1).await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"tenants": {{"default": {{
            "printers": [{{"id": "kitchen-1", "vendor": "EPSON", "host": "127.0.0.1", "port": {port}}}],
            "routes": [{{"kind": "KITCHEN", "printerId": "kitchen-1"}}]
        }}}}}}"#
    )
    .unwrap();

    let path = file.path().to_string_lossy().to_string();
    let config = Config::from_lookup(|key| match key {
        "STAR_PRINTER_IP" => Some("127.0.0.1".to_string()),
        "STAR_PRINTER_PORT" => Some(closed_port_sync().to_string()),
        "PRINT_ROUTES_FILE" => Some(path.clone()),
        "PRINT_POST_WRITE_GRACE_MS" => Some("20".to_string()),
        _ => None,
    });
    let state = ServerState::new(config).unwrap();
    let app = build_app(state);

    // KITCHEN goes to the routes file printer
    let (status, body) = post(
        &app,
        "/print/test-kind",
        &json!({"kind": "KITCHEN"}).to_string(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["printerId"], "kitchen-1");
    assert!(received.await.unwrap()[0].ends_with(&[0x1D, 0x56, 0x42, 0x00]));

    // RECEIPT falls back to the env Star printer, which is offline
    let (status, body) = post(
        &app,
        "/print/test-kind",
        &json!({"kind": "RECEIPT"}).to_string(),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "CONNECT_REFUSED");
}

fn closed_port_sync() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
