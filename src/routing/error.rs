//! Setup error definitions.

use thiserror::Error;
use tower::BoxError;

/// Errors that abort host routing setup.
///
/// Any of these leaves the shared router unfit for serving traffic; the
/// caller must treat them as fatal.
#[derive(Debug, Error)]
pub enum SetupError {
    /// A host entry with an empty hostname.
    #[error("host entry #{index} has an empty hostname")]
    EmptyHost { index: usize },

    /// The same hostname was configured for two entries.
    #[error("host {0:?} is configured more than once")]
    DuplicateHost(String),

    /// A prefix that cannot be mounted as a single path segment.
    #[error("host {host:?} has an invalid prefix {prefix:?}: {reason}")]
    InvalidPrefix {
        host: String,
        prefix: String,
        reason: &'static str,
    },

    /// Two entries asked for the same mount point on the shared router.
    #[error("prefix {prefix:?} of host {host:?} is already mounted by {existing:?}")]
    DuplicatePrefix {
        host: String,
        prefix: String,
        existing: String,
    },

    /// The mounted copy of a route set overlaps routes already on the shared router.
    #[error("prefix {prefix:?} of host {host:?} conflicts with shared routes: {reason}")]
    PrefixConflict {
        host: String,
        prefix: String,
        reason: String,
    },

    /// A setup extension refused to configure an engine.
    #[error("setup extension failed for host {host:?}: {source}")]
    Extension {
        host: String,
        #[source]
        source: BoxError,
    },
}
