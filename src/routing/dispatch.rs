//! Per-request dispatch by Host.
//!
//! Runs in front of the shared router, before any of its own route
//! matching:
//!
//! ```text
//! host in registry      → dedicated engine serves the request
//! host in generic set   → shared router
//! secure mode           → 404 "Unknown host"
//! otherwise             → shared router
//! ```
//!
//! Requests continuing into the shared router for `/<prefix>/` of a mounted
//! route set are rewritten to `/<prefix>`, so they reach the mount's root
//! route or the shared fallback like `/<prefix>` does.

use std::collections::HashSet;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{uri::PathAndQuery, Request, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

use crate::observability::metrics;
use crate::routing::matcher::{request_host, HostMatching};
use crate::routing::registry::{GenericHostSet, HostRegistry};

/// Body sent to clients whose host is rejected in secure mode.
pub const UNKNOWN_HOST_BODY: &str = "Unknown host";

/// What happens to requests for hosts that are neither registered nor generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownHostPolicy {
    /// Answer 404 without touching the shared router.
    #[default]
    Reject,
    /// Treat the host as generic.
    Passthrough,
}

impl UnknownHostPolicy {
    pub fn from_secure(secure: bool) -> Self {
        if secure {
            UnknownHostPolicy::Reject
        } else {
            UnknownHostPolicy::Passthrough
        }
    }

    pub fn is_secure(self) -> bool {
        self == UnknownHostPolicy::Reject
    }
}

/// Outcome of the dispatch decision for one request.
#[derive(Debug)]
pub enum Dispatch<'a> {
    /// Hand the request to this host's engine.
    Dedicated(&'a Router),
    /// Generic host: continue into the shared router.
    Generic,
    /// Unknown host in secure mode.
    Reject,
    /// Unknown host in insecure mode: continue into the shared router.
    Passthrough,
}

impl Dispatch<'_> {
    /// Label used in logs and metrics.
    pub fn outcome(&self) -> &'static str {
        match self {
            Dispatch::Dedicated(_) => "dedicated",
            Dispatch::Generic => "generic",
            Dispatch::Reject => "rejected",
            Dispatch::Passthrough => "passthrough",
        }
    }
}

/// The frozen routing state consulted on every request.
#[derive(Debug, Clone)]
pub struct HostDispatcher {
    registry: HostRegistry,
    generic_hosts: GenericHostSet,
    policy: UnknownHostPolicy,
    matching: HostMatching,
    mounts: HashSet<String>,
}

impl HostDispatcher {
    pub fn new(
        registry: HostRegistry,
        generic_hosts: GenericHostSet,
        policy: UnknownHostPolicy,
        matching: HostMatching,
    ) -> Self {
        Self {
            registry,
            generic_hosts,
            policy,
            matching,
            mounts: HashSet::new(),
        }
    }

    /// Record the prefix segments mounted on the shared router.
    pub fn with_mounts(mut self, mounts: impl IntoIterator<Item = String>) -> Self {
        self.mounts.extend(mounts);
        self
    }

    /// Decide where a request addressed to `host` goes.
    ///
    /// Pure function of the frozen state and `host`: dedicated engines win
    /// over generic membership, which wins over the unknown-host policy.
    pub fn decide(&self, host: &str) -> Dispatch<'_> {
        let key = self.matching.key(host);

        if let Some(engine) = self.registry.get(&key) {
            return Dispatch::Dedicated(engine);
        }
        if self.generic_hosts.contains(&key) {
            return Dispatch::Generic;
        }
        match self.policy {
            UnknownHostPolicy::Reject => Dispatch::Reject,
            UnknownHostPolicy::Passthrough => Dispatch::Passthrough,
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn generic_hosts(&self) -> &GenericHostSet {
        &self.generic_hosts
    }

    pub fn policy(&self) -> UnknownHostPolicy {
        self.policy
    }

    /// `/<prefix>` when `path` is `/<prefix>/` of a mounted prefix.
    pub fn mount_root<'p>(&self, path: &'p str) -> Option<&'p str> {
        let trimmed = path.strip_suffix('/')?;
        let segment = trimmed.strip_prefix('/')?;
        self.mounts.contains(segment).then_some(trimmed)
    }
}

fn rewrite_path(mut req: Request<Body>, path: &str) -> Request<Body> {
    let path_and_query = match req.uri().query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    };

    let mut parts = req.uri().clone().into_parts();
    if let Ok(pq) = PathAndQuery::try_from(path_and_query) {
        parts.path_and_query = Some(pq);
    }
    if let Ok(uri) = Uri::from_parts(parts) {
        *req.uri_mut() = uri;
    }
    req
}

/// Middleware placed in front of the shared router.
pub async fn dispatch_by_host(
    State(dispatcher): State<Arc<HostDispatcher>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let host = request_host(&req);
    let decision = dispatcher.decide(host);
    let outcome = decision.outcome();

    tracing::debug!(
        host = %host,
        path = %req.uri().path(),
        outcome,
        "Dispatching request"
    );
    metrics::record_dispatch(outcome);

    match decision {
        Dispatch::Dedicated(engine) => {
            let engine = engine.clone();
            match engine.oneshot(req).await {
                Ok(response) => response,
                Err(never) => match never {},
            }
        }
        Dispatch::Generic | Dispatch::Passthrough => {
            let req = match dispatcher.mount_root(req.uri().path()) {
                Some(root) => {
                    let root = root.to_string();
                    rewrite_path(req, &root)
                }
                None => req,
            };
            next.run(req).await
        }
        Dispatch::Reject => (StatusCode::NOT_FOUND, UNKNOWN_HOST_BODY).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::registry::HostRegistryBuilder;

    fn dispatcher(policy: UnknownHostPolicy) -> HostDispatcher {
        let mut registry = HostRegistryBuilder::new();
        registry.insert("a.example".into(), Router::new());
        registry.insert("both.example".into(), Router::new());
        let generic = GenericHostSet::new(["g1.example", "both.example"], HostMatching::Normalized);
        HostDispatcher::new(registry.freeze(), generic, policy, HostMatching::Normalized)
    }

    #[test]
    fn test_decision_order() {
        let d = dispatcher(UnknownHostPolicy::Reject);
        assert!(matches!(d.decide("a.example"), Dispatch::Dedicated(_)));
        assert!(matches!(d.decide("g1.example"), Dispatch::Generic));
        assert!(matches!(d.decide("unknown.example"), Dispatch::Reject));
        // Registered and generic: the dedicated engine wins.
        assert!(matches!(d.decide("both.example"), Dispatch::Dedicated(_)));
    }

    #[test]
    fn test_passthrough_policy() {
        let d = dispatcher(UnknownHostPolicy::Passthrough);
        assert!(matches!(d.decide("unknown.example"), Dispatch::Passthrough));
        assert!(matches!(d.decide(""), Dispatch::Passthrough));
        assert!(matches!(d.decide("a.example"), Dispatch::Dedicated(_)));
    }

    #[test]
    fn test_decision_is_stable() {
        let d = dispatcher(UnknownHostPolicy::Reject);
        for host in ["a.example", "g1.example", "unknown.example"] {
            assert_eq!(d.decide(host).outcome(), d.decide(host).outcome());
        }
    }

    #[test]
    fn test_decision_uses_normalized_host() {
        let d = dispatcher(UnknownHostPolicy::Reject);
        assert!(matches!(d.decide("A.Example:8080"), Dispatch::Dedicated(_)));
        assert!(matches!(d.decide("g1.example."), Dispatch::Generic));
    }

    #[test]
    fn test_mount_root() {
        let d = dispatcher(UnknownHostPolicy::Reject).with_mounts(["1".to_string()]);
        assert_eq!(d.mount_root("/1/"), Some("/1"));
        assert_eq!(d.mount_root("/1"), None);
        assert_eq!(d.mount_root("/1/hi"), None);
        assert_eq!(d.mount_root("/2/"), None);
        assert_eq!(d.mount_root("/"), None);
    }

    #[test]
    fn test_rewrite_path_keeps_query() {
        let req = Request::builder()
            .uri("http://g.example/1/?x=1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(rewrite_path(req, "/1").uri().to_string(), "http://g.example/1?x=1");
    }

    #[test]
    fn test_policy_from_secure_flag() {
        assert_eq!(UnknownHostPolicy::from_secure(true), UnknownHostPolicy::Reject);
        assert_eq!(UnknownHostPolicy::from_secure(false), UnknownHostPolicy::Passthrough);
        assert!(UnknownHostPolicy::default().is_secure());
    }
}
