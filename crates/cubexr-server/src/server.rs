//! Web server setup and routing

use anyhow::{Context, Result};
use axum::Router;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::{Config, StaticConfig, TlsConfig};
use crate::tls::TlsMaterial;

/// Grace period for in-flight requests on shutdown
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Static files with the entry document as fallback for client-side routes
pub fn router(config: &StaticConfig) -> Router {
    let entry = ServeFile::new(config.index_path());
    let files = ServeDir::new(&config.dir)
        .append_index_html_on_directories(true)
        .fallback(entry);

    Router::new()
        .fallback_service(files)
        .layer(TraceLayer::new_for_http())
}

/// Run the web server (HTTP or HTTPS depending on config)
pub async fn run(config: &Config) -> Result<()> {
    let index = config.static_files.index_path();
    if !index.is_file() {
        warn!(path = %index.display(), "Entry document not found; unmatched routes will 404");
    }

    let app = router(&config.static_files);
    let bind = config.bind_address();

    // Start server with or without TLS
    if let Some(tls_config) = &config.tls {
        run_https(app, &bind, tls_config).await
    } else {
        run_http(app, &bind).await
    }
}

/// Run plain HTTP server
async fn run_http(app: Router, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Run HTTPS server with TLS
async fn run_https(app: Router, bind: &str, tls: &TlsConfig) -> Result<()> {
    // Fails before binding when the key pair is missing or unusable
    let material = TlsMaterial::load(tls)?;
    let rustls_config = material
        .into_rustls_config()
        .await
        .context("Failed to build TLS configuration")?;

    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address {bind}"))?;
    info!(
        address = %bind,
        protocol = "HTTPS",
        cert = %tls.cert.display(),
        "Starting web server with TLS"
    );

    let handle = axum_server::Handle::new();
    let shutdown = handle.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.graceful_shutdown(Some(SHUTDOWN_GRACE));
    });

    axum_server::bind_rustls(addr, rustls_config)
        .handle(handle)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
