//! Per-route lifecycle policy.

use std::time::Duration;

use crate::config::LifecycleConfig;

/// Limits applied to a route's asynchronous phases.
///
/// The default policy imposes no timeout and never interrupts in-flight
/// work: cancellation is only observed at the fetch and render checkpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifecyclePolicy {
    /// Upper bound for each `fetch`, `render` and `destroy` call.
    pub phase_timeout: Option<Duration>,
    /// Drop an in-flight `fetch`/`render` as soon as the route is cancelled.
    pub abort_on_cancel: bool,
}

impl LifecyclePolicy {
    pub fn with_phase_timeout(mut self, timeout: Duration) -> Self {
        self.phase_timeout = Some(timeout);
        self
    }

    pub fn with_abort_on_cancel(mut self, abort: bool) -> Self {
        self.abort_on_cancel = abort;
        self
    }
}

impl From<&LifecycleConfig> for LifecyclePolicy {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            phase_timeout: config.phase_timeout_ms.map(Duration::from_millis),
            abort_on_cancel: config.abort_on_cancel,
        }
    }
}
