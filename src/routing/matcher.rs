//! Host matching logic.
//!
//! # Responsibilities
//! - Extract the host a request was addressed to
//! - Normalize hostnames into registry lookup keys
//!
//! # Design Decisions
//! - `Host` header first, URI authority second (HTTP/2 `:authority`)
//! - Normalized matching lowercases and strips `:port` and a trailing dot
//! - Configured names and request hosts go through the same rule
//! - No wildcards: keys are compared as whole strings

use std::borrow::Cow;

use axum::body::Body;
use axum::http::{header, Request};
use serde::{Deserialize, Serialize};

/// How request hosts are compared against configured hostnames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostMatching {
    /// Byte-for-byte comparison of the raw host value.
    Exact,
    /// Case-insensitive comparison ignoring any port and a trailing dot.
    #[default]
    Normalized,
}

impl HostMatching {
    /// Turn a host value into the key used for registry lookups.
    pub fn key<'a>(self, host: &'a str) -> Cow<'a, str> {
        match self {
            HostMatching::Exact => Cow::Borrowed(host),
            HostMatching::Normalized => normalize_host(host),
        }
    }
}

/// Lowercase `host`, dropping a `:port` suffix and a trailing dot.
///
/// Bracketed IPv6 literals keep their brackets: `[::1]:8080` becomes `[::1]`.
pub fn normalize_host(host: &str) -> Cow<'_, str> {
    let host = host.trim();
    let without_port = strip_port(host);
    let trimmed = without_port.strip_suffix('.').unwrap_or(without_port);

    if trimmed.bytes().any(|b| b.is_ascii_uppercase()) {
        Cow::Owned(trimmed.to_ascii_lowercase())
    } else {
        Cow::Borrowed(trimmed)
    }
}

fn strip_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }

    match host.rsplit_once(':') {
        // A second colon means an unbracketed IPv6 literal, not a port.
        Some((name, port))
            if !name.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}

/// The host a request was addressed to, or `""` when it carries none.
pub fn request_host(req: &Request<Body>) -> &str {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
        .unwrap_or("")
}
