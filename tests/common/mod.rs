//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use host_router::config::ListenerConfig;
use host_router::lifecycle::Shutdown;
use host_router::routing::{not_found, HostRouteSpec, HostRoutingBuilder, RouteBuilder};
use host_router::HttpServer;
use tokio::net::TcpListener;

pub const NO_ROUTE: &str = "No known route";

/// `/` and `/hi` greeting routes for a site.
pub fn greeting_routes(name: &'static str) -> impl RouteBuilder {
    move |router: Router| {
        router
            .route("/", get(move || async move { format!("Hello from {name}") }))
            .route("/hi", get(move || async move { format!("Hi from {name}") }))
    }
}

/// Two prefixed hosts (`a.example` → `1`, `b.example` → `2`) and two generic hosts.
pub fn scenario_builder(secure: bool) -> HostRoutingBuilder {
    HostRoutingBuilder::new(Router::new())
        .host(HostRouteSpec::new("a.example", greeting_routes("a")).with_prefix("1"))
        .host(HostRouteSpec::new("b.example", greeting_routes("b")).with_prefix("2"))
        .generic_hosts(["g1.example", "g2.example"])
        .secure(secure)
        .extension(not_found(NO_ROUTE))
}

/// Serve `router` on an ephemeral port until the returned `Shutdown` fires.
pub async fn start_server(router: Router) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(router, ListenerConfig::default());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// Non-pooled client so every request opens its own connection.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Send `GET path` to `addr` with an explicit Host header.
pub async fn get_with_host(
    client: &reqwest::Client,
    addr: SocketAddr,
    host: &str,
    path: &str,
) -> reqwest::Response {
    client
        .get(format!("http://{addr}{path}"))
        .header(reqwest::header::HOST, host)
        .send()
        .await
        .expect("server unreachable")
}
