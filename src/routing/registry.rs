//! Host registry: hostname to isolated engine lookup.
//!
//! # Responsibilities
//! - Store one isolated `Router` per configured host
//! - Store the set of generic hosts
//! - Answer lookups by normalized hostname
//!
//! # Design Decisions
//! - Built through a mutable builder, then frozen (thread-safe without locks)
//! - O(1) host lookup via HashMap
//! - Engines are never shared between hosts

use std::collections::{HashMap, HashSet};

use axum::Router;

use crate::routing::matcher::HostMatching;

/// Immutable mapping from hostname to its dedicated engine.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    engines: HashMap<String, Router>,
}

impl HostRegistry {
    /// Look up the engine registered for an already-normalized host key.
    pub fn get(&self, host: &str) -> Option<&Router> {
        self.engines.get(host)
    }

    pub fn contains(&self, host: &str) -> bool {
        self.engines.contains_key(host)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Registered hostnames, in no particular order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

/// Mutable staging area for a [`HostRegistry`] during setup.
#[derive(Debug, Default)]
pub struct HostRegistryBuilder {
    engines: HashMap<String, Router>,
}

impl HostRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, host: &str) -> bool {
        self.engines.contains_key(host)
    }

    /// Record `engine` under `host`, returning the engine it replaced.
    pub fn insert(&mut self, host: String, engine: Router) -> Option<Router> {
        self.engines.insert(host, engine)
    }

    /// Stop accepting entries.
    pub fn freeze(self) -> HostRegistry {
        HostRegistry {
            engines: self.engines,
        }
    }
}

/// Hostnames served by the shared router rather than a dedicated engine.
#[derive(Debug, Clone, Default)]
pub struct GenericHostSet {
    hosts: HashSet<String>,
}

impl GenericHostSet {
    /// Build the set, normalizing every name with `matching`.
    pub fn new<I, H>(hosts: I, matching: HostMatching) -> Self
    where
        I: IntoIterator<Item = H>,
        H: AsRef<str>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| matching.key(h.as_ref()).into_owned())
                .collect(),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.hosts.contains(host)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
