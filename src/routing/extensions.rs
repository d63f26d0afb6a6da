//! Ready-made setup extensions.
//!
//! Both are applied to whatever router they are handed, so the same
//! instance configures dedicated engines and, through generic hosts, the
//! shared router.

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Router,
};
use tower::BoxError;
use tower_http::catch_panic::CatchPanicLayer;

use crate::routing::setup::HostExtension;

/// Installs a fallback answering `404` with a fixed body.
#[derive(Debug, Clone)]
pub struct NotFound {
    body: String,
}

pub fn not_found(body: impl Into<String>) -> NotFound {
    NotFound { body: body.into() }
}

impl HostExtension for NotFound {
    fn extend(&self, _host: &str, router: Router) -> Result<Router, BoxError> {
        let body = self.body.clone();
        Ok(router.fallback(move || {
            let body = body.clone();
            async move { (StatusCode::NOT_FOUND, body) }
        }))
    }
}

/// Turns handler panics into `500` responses.
///
/// Only wraps routes and fallbacks present when the extension runs, so it
/// goes after [`not_found`] in the extension list.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecoverPanics;

pub fn recover_panics() -> RecoverPanics {
    RecoverPanics
}

impl HostExtension for RecoverPanics {
    fn extend(&self, host: &str, router: Router) -> Result<Router, BoxError> {
        tracing::debug!(host = %host, "Installing panic recovery");
        Ok(router.layer(CatchPanicLayer::custom(panic_response)))
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic");
    tracing::error!(panic = %message, "Route handler panicked");

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
