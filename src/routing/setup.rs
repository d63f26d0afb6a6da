//! Host routing setup.
//!
//! # Responsibilities
//! - Build one isolated engine per host entry
//! - Run setup extensions over every engine (and the shared router for generic hosts)
//! - Mount prefixed copies of host route sets on the shared router
//! - Freeze the registry and put the dispatch middleware in front of the shared router
//!
//! # Design Decisions
//! - Fail fast: the first error aborts setup, nothing is partially activated
//! - Route builders run before extensions so extension layers wrap the routes
//! - The returned router dispatches before the shared router matches any route
//!
//! Route builders run once per engine and once more per prefix mount, each
//! time against a fresh `Router`. Any state they capture is shared by all
//! of those invocations.
//!
//! A prefix mount owns `/<prefix>`, `/<prefix>/` and everything below it on
//! the shared router. Shared routes that collide with the mounted copy fail
//! setup with [`SetupError::PrefixConflict`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use axum::{middleware, Router};
use tower::{BoxError, Layer};

use crate::routing::dispatch::{dispatch_by_host, HostDispatcher, UnknownHostPolicy};
use crate::routing::error::SetupError;
use crate::routing::matcher::HostMatching;
use crate::routing::registry::{GenericHostSet, HostRegistryBuilder};

/// Registers a host's routes onto a router.
pub trait RouteBuilder: Send + Sync {
    fn build(&self, router: Router) -> Router;
}

impl<F> RouteBuilder for F
where
    F: Fn(Router) -> Router + Send + Sync,
{
    fn build(&self, router: Router) -> Router {
        self(router)
    }
}

/// Cross-cutting configuration applied to every engine, e.g. a fallback
/// or panic recovery.
///
/// For generic hosts the shared router itself is passed in.
pub trait HostExtension: Send + Sync {
    fn extend(&self, host: &str, router: Router) -> Result<Router, BoxError>;
}

impl<F> HostExtension for F
where
    F: Fn(&str, Router) -> Result<Router, BoxError> + Send + Sync,
{
    fn extend(&self, host: &str, router: Router) -> Result<Router, BoxError> {
        self(host, router)
    }
}

/// One dedicated host and its route set.
#[derive(Clone)]
pub struct HostRouteSpec {
    /// Hostname matched against the request's Host.
    pub host: String,
    /// Path segment under which the route set is also mounted on the shared router.
    pub prefix: Option<String>,
    /// Registers the host's routes.
    pub routes: Arc<dyn RouteBuilder>,
}

impl HostRouteSpec {
    pub fn new(host: impl Into<String>, routes: impl RouteBuilder + 'static) -> Self {
        Self {
            host: host.into(),
            prefix: None,
            routes: Arc::new(routes),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

impl fmt::Debug for HostRouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostRouteSpec")
            .field("host", &self.host)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// The configured shared router together with its dispatch state.
#[derive(Debug, Clone)]
pub struct HostRouter {
    router: Router,
    dispatcher: Arc<HostDispatcher>,
}

impl HostRouter {
    /// Frozen registry, generic hosts and policy.
    pub fn dispatcher(&self) -> &HostDispatcher {
        &self.dispatcher
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// The router to serve. Routes must not be added to it afterward.
    pub fn into_router(self) -> Router {
        self.router
    }
}

impl From<HostRouter> for Router {
    fn from(host_router: HostRouter) -> Self {
        host_router.into_router()
    }
}

/// Fluent front-end for [`setup_host_routes`].
pub struct HostRoutingBuilder {
    shared: Router,
    hosts: Vec<HostRouteSpec>,
    generic_hosts: Vec<String>,
    policy: UnknownHostPolicy,
    matching: HostMatching,
    extensions: Vec<Arc<dyn HostExtension>>,
}

impl HostRoutingBuilder {
    /// Start from the shared router generic hosts fall through to.
    pub fn new(shared: Router) -> Self {
        Self {
            shared,
            hosts: Vec::new(),
            generic_hosts: Vec::new(),
            policy: UnknownHostPolicy::default(),
            matching: HostMatching::default(),
            extensions: Vec::new(),
        }
    }

    pub fn host(mut self, spec: HostRouteSpec) -> Self {
        self.hosts.push(spec);
        self
    }

    pub fn hosts(mut self, specs: impl IntoIterator<Item = HostRouteSpec>) -> Self {
        self.hosts.extend(specs);
        self
    }

    pub fn generic_host(mut self, host: impl Into<String>) -> Self {
        self.generic_hosts.push(host.into());
        self
    }

    pub fn generic_hosts<I, H>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = H>,
        H: Into<String>,
    {
        self.generic_hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Reject unknown hosts (`true`, the default) or treat them as generic.
    pub fn secure(mut self, secure: bool) -> Self {
        self.policy = UnknownHostPolicy::from_secure(secure);
        self
    }

    pub fn unknown_host_policy(mut self, policy: UnknownHostPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn host_matching(mut self, matching: HostMatching) -> Self {
        self.matching = matching;
        self
    }

    /// Append an extension; extensions run in the order they were added.
    pub fn extension(mut self, extension: impl HostExtension + 'static) -> Self {
        self.extensions.push(Arc::new(extension));
        self
    }

    pub fn build(self) -> Result<HostRouter, SetupError> {
        setup(
            self.shared,
            self.hosts,
            &self.generic_hosts,
            self.policy,
            self.matching,
            &self.extensions,
        )
    }
}

/// Wire host-based routing onto `shared`.
///
/// Uses normalized host matching; see [`HostRoutingBuilder::host_matching`]
/// for exact matching.
pub fn setup_host_routes(
    shared: Router,
    hosts: Vec<HostRouteSpec>,
    generic_hosts: &[String],
    secure: bool,
    extensions: &[Arc<dyn HostExtension>],
) -> Result<HostRouter, SetupError> {
    setup(
        shared,
        hosts,
        generic_hosts,
        UnknownHostPolicy::from_secure(secure),
        HostMatching::default(),
        extensions,
    )
}

fn setup(
    mut shared: Router,
    hosts: Vec<HostRouteSpec>,
    generic_hosts: &[String],
    policy: UnknownHostPolicy,
    matching: HostMatching,
    extensions: &[Arc<dyn HostExtension>],
) -> Result<HostRouter, SetupError> {
    let mut registry = HostRegistryBuilder::new();
    let mut mounts: HashMap<String, String> = HashMap::new();

    for (index, spec) in hosts.into_iter().enumerate() {
        let host = matching.key(&spec.host).into_owned();
        if host.is_empty() {
            return Err(SetupError::EmptyHost { index });
        }
        if registry.contains(&host) {
            return Err(SetupError::DuplicateHost(host));
        }

        let prefix = match spec.prefix.as_deref() {
            Some(prefix) => mount_segment(&host, prefix)?,
            None => None,
        };
        if let Some(prefix) = &prefix {
            if let Some(existing) = mounts.get(prefix) {
                return Err(SetupError::DuplicatePrefix {
                    host,
                    prefix: prefix.clone(),
                    existing: existing.clone(),
                });
            }
        }

        let engine = extend(spec.routes.build(Router::new()), &spec.host, extensions)?;

        if let Some(prefix) = prefix {
            shared = mount(shared, &host, &prefix, spec.routes.as_ref())?;
            tracing::debug!(host = %host, prefix = %prefix, "Mounted host routes on shared router");
            mounts.insert(prefix, host.clone());
        }

        tracing::debug!(host = %host, "Registered host engine");
        registry.insert(host, engine);
    }

    for host in generic_hosts {
        if registry.contains(&matching.key(host)) {
            tracing::warn!(host = %host, "Generic host also has a dedicated engine; the engine wins");
        }
        shared = extend(shared, host, extensions)?;
    }

    let dispatcher = Arc::new(
        HostDispatcher::new(
            registry.freeze(),
            GenericHostSet::new(generic_hosts, matching),
            policy,
            matching,
        )
        .with_mounts(mounts.into_keys()),
    );

    tracing::info!(
        hosts = dispatcher.registry().len(),
        generic_hosts = dispatcher.generic_hosts().len(),
        secure = policy.is_secure(),
        "Host routing configured"
    );

    let dispatching = middleware::from_fn_with_state(dispatcher.clone(), dispatch_by_host).layer(shared);
    Ok(HostRouter {
        router: Router::new().fallback_service(dispatching),
        dispatcher,
    })
}

fn extend(
    mut router: Router,
    host: &str,
    extensions: &[Arc<dyn HostExtension>],
) -> Result<Router, SetupError> {
    for extension in extensions {
        router = extension.extend(host, router).map_err(|source| {
            tracing::error!(host = %host, error = %source, "Setup extension failed");
            SetupError::Extension {
                host: host.to_string(),
                source,
            }
        })?;
    }
    Ok(router)
}

/// Validate a configured prefix, returning the bare segment to mount, if any.
fn mount_segment(host: &str, prefix: &str) -> Result<Option<String>, SetupError> {
    let segment = prefix.trim_matches('/');
    if segment.is_empty() {
        return Ok(None);
    }

    let invalid = |reason| SetupError::InvalidPrefix {
        host: host.to_string(),
        prefix: prefix.to_string(),
        reason,
    };
    if segment.contains('/') {
        return Err(invalid("must be a single path segment"));
    }
    if !segment
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~'))
    {
        return Err(invalid("only ASCII letters, digits, '-', '.', '_' and '~' are allowed"));
    }
    Ok(Some(segment.to_string()))
}

/// Mount a fresh copy of a route set under `/<segment>`.
///
/// `/<segment>/` is folded into `/<segment>` by the dispatch middleware.
fn mount(
    shared: Router,
    host: &str,
    segment: &str,
    routes: &dyn RouteBuilder,
) -> Result<Router, SetupError> {
    let path = format!("/{segment}");
    let mounted = routes.build(Router::new());

    // axum panics on overlapping routes.
    panic::catch_unwind(AssertUnwindSafe(|| shared.nest(&path, mounted))).map_err(|payload| {
        let reason = panic_message(payload.as_ref());
        tracing::error!(host = %host, prefix = %segment, reason = %reason, "Prefix mount conflicts with shared routes");
        SetupError::PrefixConflict {
            host: host.to_string(),
            prefix: segment.to_string(),
            reason,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "overlapping routes".to_string()
    }
}
