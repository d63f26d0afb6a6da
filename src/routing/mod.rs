//! Host routing subsystem.
//!
//! # Data Flow
//! ```text
//! Setup (once, before serving):
//!     HostRouteSpec[] + generic hosts + policy + extensions
//!     → setup.rs (build engines, run extensions, mount prefixes)
//!     → registry.rs (freeze hostname → engine map)
//!     → dispatch.rs (wrap shared router)
//!
//! Incoming Request (host, path)
//!     → matcher.rs (extract + normalize host)
//!     → dispatch.rs (dedicated engine | shared router | 404)
//! ```
//!
//! # Design Decisions
//! - Registry compiled at setup, immutable at runtime
//! - Exact hostname keys, no wildcards
//! - Dedicated engines win over generic hosts
//! - Unknown hosts rejected unless insecure mode is chosen

pub mod dispatch;
pub mod error;
pub mod extensions;
pub mod matcher;
pub mod registry;
pub mod setup;

pub use dispatch::{Dispatch, HostDispatcher, UnknownHostPolicy, UNKNOWN_HOST_BODY};
pub use error::SetupError;
pub use extensions::{not_found, recover_panics};
pub use matcher::HostMatching;
pub use registry::{GenericHostSet, HostRegistry};
pub use setup::{
    setup_host_routes, HostExtension, HostRouteSpec, HostRouter, HostRoutingBuilder, RouteBuilder,
};
