#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use bon_server::printing::InMemoryDirectory;
use bon_server::{Config, ServerState, build_app};
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.post_write_grace_ms = 20;
    config.write_timeout_ms = 1000;
    config
}

pub fn app(directory: InMemoryDirectory) -> (Router, ServerState) {
    let state = ServerState::with_directory(test_config(), Arc::new(directory));
    (build_app(state.clone()), state)
}

/// POST a JSON body, optionally as a tenant
pub async fn post(app: &Router, uri: &str, body: &str, tenant: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(tenant) = tenant {
        builder = builder.header("x-tenant-id", tenant);
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Fake printer accepting `jobs` connections; yields the bytes of each
pub async fn fake_printer(jobs: usize) -> (u16, tokio::task::JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let mut received = Vec::with_capacity(jobs);
        for _ in 0..jobs {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            socket.read_to_end(&mut buf).await.unwrap();
            received.push(buf);
        }
        received
    });
    (port, handle)
}

/// Fake printer serving connections concurrently
///
/// Each connection is held for `hold`, read until the job ends with `end`
/// and then closed from the printer side. Yields the jobs and the most
/// connections that were open at the same time.
pub async fn busy_printer(
    jobs: usize,
    hold: Duration,
    end: &'static [u8],
) -> (u16, tokio::task::JoinHandle<(Vec<Vec<u8>>, usize)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let open = Arc::new(AtomicUsize::new(0));
        let mut peak = 0;
        let mut connections = Vec::with_capacity(jobs);

        for _ in 0..jobs {
            let (mut socket, _) = listener.accept().await.unwrap();
            peak = peak.max(open.fetch_add(1, Ordering::SeqCst) + 1);

            let open = Arc::clone(&open);
            connections.push(tokio::spawn(async move {
                tokio::time::sleep(hold).await;
                let mut job = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    job.extend_from_slice(&chunk[..n]);
                    if job.ends_with(end) {
                        break;
                    }
                }
                // Counted closed before the client can see the close
                open.fetch_sub(1, Ordering::SeqCst);
                drop(socket);
                job
            }));
        }

        let mut received = Vec::with_capacity(jobs);
        for connection in connections {
            received.push(connection.await.unwrap());
        }
        (received, peak)
    });
    (port, handle)
}

/// A port nothing listens on
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
