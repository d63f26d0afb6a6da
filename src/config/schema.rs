//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::{HostMatching, UnknownHostPolicy};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostRouterConfig {
    /// Listener configuration (bind address, timeouts).
    pub listener: ListenerConfig,

    /// Dispatch behavior shared by all hosts.
    pub routing: RoutingConfig,

    /// Hosts served by a dedicated engine.
    pub hosts: Vec<HostConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Host dispatch configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Reject hosts that are neither registered nor generic.
    pub secure: bool,

    /// How request hosts are compared with configured names.
    pub host_matching: HostMatching,

    /// Hosts that fall through to the shared router.
    pub generic_hosts: Vec<String>,

    /// Body of the 404 sent when no route matches.
    pub not_found_body: String,

    /// Turn handler panics into 500 responses.
    pub recover_panics: bool,
}

impl RoutingConfig {
    pub fn unknown_host_policy(&self) -> UnknownHostPolicy {
        UnknownHostPolicy::from_secure(self.secure)
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            secure: true,
            host_matching: HostMatching::default(),
            generic_hosts: Vec::new(),
            not_found_body: "No known route".to_string(),
            recover_panics: true,
        }
    }
}

/// A host with its own engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HostConfig {
    /// Host header to match.
    pub host: String,

    /// Path segment mounting this host's routes on the shared router.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Name of the site whose routes this host serves.
    pub site: String,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
