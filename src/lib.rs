//! Host-based request dispatch for axum.
//!
//! Serves several logically distinct applications from one listener,
//! choosing between them by the request's Host:
//!
//! ```text
//!                 ┌──────────────── dispatch ────────────────┐
//! Host: a.example │  registry hit   → a.example engine       │
//! Host: g.example │  generic host   → shared router          │──▶ /1/... (a's routes)
//! Host: other     │  secure mode    → 404 "Unknown host"     │    /2/... (b's routes)
//!                 └──────────────────────────────────────────┘
//! ```
//!
//! Build it with [`routing::HostRoutingBuilder`] and serve the resulting
//! router, directly or through [`http::HttpServer`].

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::HostRouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{HostRouteSpec, HostRouter, HostRoutingBuilder, SetupError};
