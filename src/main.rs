//! Host router demo server.
//!
//! Serves a greeting site per configured host:
//!
//! ```toml
//! [routing]
//! generic_hosts = ["g1.example", "g2.example"]
//!
//! [[hosts]]
//! host = "a.example"
//! prefix = "1"
//! site = "a"
//! ```
//!
//! `a.example/` answers "Hello from a", `g1.example/1/hi` answers "Hi from a".

use std::path::PathBuf;
use std::sync::Arc;

use axum::{routing::get, Router};
use clap::Parser;
use tokio::net::TcpListener;

use host_router::config::{load_config, HostRouterConfig};
use host_router::lifecycle::{build_host_router, signals::shutdown_signal, Shutdown};
use host_router::observability::{logging, metrics};
use host_router::routing::RouteBuilder;
use host_router::HttpServer;

#[derive(Parser)]
#[command(name = "host-router")]
#[command(about = "Serve several sites from one listener, dispatched by Host", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

/// Greeting routes for a site.
fn greeting_site(site: &str) -> Option<Arc<dyn RouteBuilder>> {
    let name: Arc<str> = Arc::from(site);
    Some(Arc::new(move |router: Router| {
        let hello = format!("Hello from {name}");
        let hi = format!("Hi from {name}");
        router
            .route("/", get(move || async move { hello }))
            .route("/hi", get(move || async move { hi }))
    }))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HostRouterConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level)?;
    tracing::info!("host-router v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        hosts = config.hosts.len(),
        generic_hosts = config.routing.generic_hosts.len(),
        secure = config.routing.secure,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let host_router = build_host_router(Router::new(), &config, greeting_site)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(shutdown_signal());

    HttpServer::new(host_router, config.listener.clone())
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
