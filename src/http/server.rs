//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the host-dispatching router with server-wide middleware
//!   (request ID, tracing, timeout)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::http::request::MakeRequestUuid;

/// HTTP server for host-routed applications.
pub struct HttpServer {
    router: Router,
    config: ListenerConfig,
}

impl HttpServer {
    /// Create a server around an already configured host router.
    pub fn new(router: impl Into<Router>, config: ListenerConfig) -> Self {
        let router = Self::build_router(router.into(), &config);
        Self { router, config }
    }

    /// Add the server-wide middleware layers.
    #[allow(deprecated)]
    fn build_router(router: Router, config: &ListenerConfig) -> Router {
        router
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr: SocketAddr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.request_timeout_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
