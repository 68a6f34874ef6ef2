//! Telly Server Binary
//!
//! Starts the TCP receiver and shows each message on a log-backed display.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use telly::config::ConfigBuilder;
use telly::ui::{status_line, DisplaySink, LogSurface, UiSurface};
use telly::{Config, DispatchMode, MessageSink, Server};
use tracing_subscriber::{fmt, EnvFilter};

/// Telly Server
#[derive(Parser, Debug)]
#[command(name = "telly-server")]
#[command(about = "Receive telemetry text over TCP and display it")]
#[command(version)]
struct Args {
    /// TOML config file (flags below override it)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// TCP port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Local address to bind
    #[arg(short, long)]
    bind: Option<Ipv4Addr>,

    /// Static IP reported by the link layer
    #[arg(long)]
    ip: Option<Ipv4Addr>,

    /// Call the display on the network thread instead of queueing
    #[arg(long)]
    inline: bool,

    /// Dispatch queue capacity
    #[arg(short, long)]
    queue_capacity: Option<usize>,

    /// Receive buffer size in bytes
    #[arg(short, long)]
    rx_buffer: Option<usize>,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,telly=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Telly Server v{}", telly::VERSION);

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let surface = Arc::new(LogSurface::new());
    let sink: Arc<dyn MessageSink> = Arc::new(DisplaySink::new(Arc::clone(&surface)));

    let server = match Server::new(config, sink) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to create server: {}", e);
            std::process::exit(1);
        }
    };

    let handle = match server.start() {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    surface.set_status(&status_line(&handle.address(), handle.local_addr().port()));
    tracing::info!("System ready - waiting for TCP connections");

    if let Err(e) = handle.wait() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Config file first, then command-line overrides
fn build_config(args: &Args) -> telly::Result<Config> {
    let base = match &args.config {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            Config::load(path)?
        }
        None => Config::default(),
    };

    let mut builder = ConfigBuilder::from_config(base.clone());
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if let Some(bind) = args.bind {
        builder = builder.bind_ip(bind);
    }
    if let Some(ip) = args.ip {
        builder = builder.link(telly::LinkConfig { ip, ..base.link });
    }
    if args.inline {
        builder = builder.dispatch(DispatchMode::Inline);
    }
    if let Some(capacity) = args.queue_capacity {
        builder = builder.queue_capacity(capacity);
    }
    if let Some(size) = args.rx_buffer {
        builder = builder.rx_buffer_size(size);
    }

    let config = builder.build();
    config.validate()?;
    Ok(config)
}
