//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve each configured host's site to a route builder
//! - Translate routing config into setup extensions
//! - Run host routing setup
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener is bound only after this succeeds

use std::sync::Arc;

use axum::Router;
use thiserror::Error;

use crate::config::HostRouterConfig;
use crate::routing::{
    not_found, recover_panics, HostRouteSpec, HostRouter, HostRoutingBuilder, RouteBuilder,
    SetupError,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("host {host:?} refers to unknown site {site:?}")]
    UnknownSite { host: String, site: String },

    #[error(transparent)]
    Setup(#[from] SetupError),
}

/// Build host routing for `config` on top of `shared`.
///
/// `site_routes` maps a configured site name to its route builder. Every
/// engine, and the shared router once per generic host, gets the configured
/// not-found body and, if enabled, panic recovery.
pub fn build_host_router<F>(
    shared: Router,
    config: &HostRouterConfig,
    site_routes: F,
) -> Result<HostRouter, StartupError>
where
    F: Fn(&str) -> Option<Arc<dyn RouteBuilder>>,
{
    let mut specs = Vec::with_capacity(config.hosts.len());
    for entry in &config.hosts {
        let routes = site_routes(&entry.site).ok_or_else(|| StartupError::UnknownSite {
            host: entry.host.clone(),
            site: entry.site.clone(),
        })?;
        specs.push(HostRouteSpec {
            host: entry.host.clone(),
            prefix: entry.prefix.clone(),
            routes,
        });
    }

    let routing = &config.routing;
    let mut builder = HostRoutingBuilder::new(shared)
        .hosts(specs)
        .generic_hosts(routing.generic_hosts.iter().cloned())
        .unknown_host_policy(routing.unknown_host_policy())
        .host_matching(routing.host_matching)
        .extension(not_found(routing.not_found_body.clone()));
    if routing.recover_panics {
        builder = builder.extension(recover_panics());
    }

    Ok(builder.build()?)
}
