//! bon-server entry point

use bon_server::{Config, ServerState, build_app, init_logger_with_file};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref());

    tracing::info!(
        star_printer = %config.star_printer.address(),
        routes_file = ?config.routes_file,
        "Starting bon-server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let http_port = config.http_port;
    let state = ServerState::new(config)?;
    let shutdown = state.shutdown.clone();
    let app = build_app(state);

    let http_addr = format!("0.0.0.0:{}", http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!("bon-server HTTP listening on {http_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    tracing::info!("bon-server stopped");
    Ok(())
}

/// Wait for Ctrl+C, then cancel in-flight print jobs
async fn shutdown_signal(token: tokio_util::sync::CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
    token.cancel();
}
