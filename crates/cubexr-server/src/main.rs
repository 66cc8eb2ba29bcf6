//! cubexr server - static host for the cube scene
//!
//! Serves the built single-page app over HTTP, or HTTPS with a local key pair.

mod config;
mod server;
mod tls;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, TlsConfig};

#[derive(Parser, Debug)]
#[command(name = "cubexr-server")]
#[command(about = "Static file server for the cubexr scene")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "cubexr.toml")]
    config: PathBuf,

    /// Listening host
    #[arg(long)]
    host: Option<String>,

    /// Listening port (takes precedence over PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory holding the built app
    #[arg(short, long)]
    static_dir: Option<PathBuf>,

    /// Serve HTTPS using server.key / server.crt unless overridden
    #[arg(long)]
    tls: bool,

    /// TLS certificate (PEM); implies --tls
    #[arg(long)]
    cert: Option<PathBuf>,

    /// TLS private key (PEM); implies --tls
    #[arg(long)]
    key: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Apply command line overrides on top of file and environment settings
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = &self.static_dir {
            config.static_files.dir = dir.clone();
        }

        if self.tls || self.cert.is_some() || self.key.is_some() {
            let tls = config.tls.get_or_insert_with(TlsConfig::default);
            if let Some(cert) = &self.cert {
                tls.cert = cert.clone();
            }
            if let Some(key) = &self.key {
                tls.key = key.clone();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("cubexr-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration: file, then PORT, then command line
    let mut config = config::load_config(&args.config)?;
    config.apply_port_env(std::env::var("PORT").ok().as_deref())?;
    args.apply(&mut config);

    info!(
        bind = %config.bind_address(),
        static_dir = %config.static_files.dir.display(),
        tls = config.tls.is_some(),
        "Configuration loaded"
    );

    server::run(&config).await
}
