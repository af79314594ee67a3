//! Lifecycle and navigation error definitions.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned by route extension points and route callbacks.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application error shared between hooks, events and callers.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Asynchronous extension point of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Fetch,
    Render,
    Destroy,
}

impl Phase {
    pub const fn as_str(self) -> &'static str {
        match self {
            Phase::Fetch => "fetch",
            Phase::Render => "render",
            Phase::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while entering, exiting or sequencing routes.
#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// Internal signal: the route was cancelled at a checkpoint.
    /// Converted into the `cancel` event, never reported as a failure.
    #[error("route entry cancelled")]
    Cancelled,

    /// A route extension point failed.
    #[error("{phase} failed: {source}")]
    Phase {
        phase: Phase,
        #[source]
        source: SharedError,
    },

    /// A route extension point exceeded the configured phase timeout.
    #[error("{phase} timed out after {}ms", .after.as_millis())]
    Timeout { phase: Phase, after: Duration },

    /// The route callback failed before producing a target.
    #[error("route callback failed: {0}")]
    Callback(#[source] SharedError),
}

impl RoutingError {
    pub fn phase(phase: Phase, source: HandlerError) -> Self {
        RoutingError::Phase {
            phase,
            source: Arc::from(source),
        }
    }

    pub fn callback(source: HandlerError) -> Self {
        RoutingError::Callback(Arc::from(source))
    }

    pub fn is_cancellation(&self) -> bool {
        matches!(self, RoutingError::Cancelled)
    }

    /// Phase the error originated in, if any.
    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            RoutingError::Phase { phase, .. } | RoutingError::Timeout { phase, .. } => Some(*phase),
            _ => None,
        }
    }

    /// The application error carried by this failure, if any.
    pub fn app_error(&self) -> Option<&SharedError> {
        match self {
            RoutingError::Phase { source, .. } | RoutingError::Callback(source) => Some(source),
            _ => None,
        }
    }
}
