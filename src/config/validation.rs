//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and value ranges
//! - Detect duplicate hosts and prefixes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostRouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;
use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::HostRouterConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid {field} {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("invalid observability.log_level {0:?}")]
    InvalidLogLevel(String),

    #[error("hosts[{index}] has an empty host")]
    EmptyHost { index: usize },

    #[error("hosts[{index}] ({host}) has an empty site")]
    EmptySite { index: usize, host: String },

    #[error("host {0:?} is configured more than once")]
    DuplicateHost(String),

    #[error("prefix {prefix:?} is used by both {first:?} and {second:?}")]
    DuplicatePrefix {
        prefix: String,
        first: String,
        second: String,
    },

    #[error("routing.generic_hosts contains an empty host")]
    EmptyGenericHost,
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &HostRouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: observability.metrics_address.clone(),
        });
    }
    if EnvFilter::try_new(&observability.log_level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(observability.log_level.clone()));
    }

    let matching = config.routing.host_matching;
    let mut hosts: HashMap<String, usize> = HashMap::new();
    let mut prefixes: HashMap<&str, &str> = HashMap::new();

    for (index, entry) in config.hosts.iter().enumerate() {
        let key = matching.key(&entry.host);
        if key.is_empty() {
            errors.push(ValidationError::EmptyHost { index });
            continue;
        }
        if entry.site.trim().is_empty() {
            errors.push(ValidationError::EmptySite {
                index,
                host: entry.host.clone(),
            });
        }
        if hosts.insert(key.into_owned(), index).is_some() {
            errors.push(ValidationError::DuplicateHost(entry.host.clone()));
        }

        let prefix = entry.prefix.as_deref().unwrap_or("").trim_matches('/');
        if prefix.is_empty() {
            continue;
        }
        if let Some(first) = prefixes.insert(prefix, &entry.host) {
            errors.push(ValidationError::DuplicatePrefix {
                prefix: prefix.to_string(),
                first: first.to_string(),
                second: entry.host.clone(),
            });
        }
    }

    if config.routing.generic_hosts.iter().any(|h| h.trim().is_empty()) {
        errors.push(ValidationError::EmptyGenericHost);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
