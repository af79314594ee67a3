//! Route handler driven by configuration.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::lifecycle::{Args, HandlerError, Phase, RouteHandler};

/// Failure injected by a scripted route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("scripted {0} failure")]
pub struct ScriptedFailure(pub Phase);

/// Sleeps for the configured latency in each phase and optionally fails one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoute {
    fetch: Duration,
    render: Duration,
    destroy: Duration,
    fail: Option<Phase>,
}

impl ScriptedRoute {
    async fn run(&self, phase: Phase, latency: Duration) -> Result<(), HandlerError> {
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.fail == Some(phase) {
            return Err(Box::new(ScriptedFailure(phase)));
        }
        Ok(())
    }
}

impl From<&RouteConfig> for ScriptedRoute {
    fn from(config: &RouteConfig) -> Self {
        Self {
            fetch: Duration::from_millis(config.fetch_ms),
            render: Duration::from_millis(config.render_ms),
            destroy: Duration::from_millis(config.destroy_ms),
            fail: config.fail,
        }
    }
}

#[async_trait]
impl RouteHandler for ScriptedRoute {
    async fn fetch(&self, _args: &Args) -> Result<(), HandlerError> {
        self.run(Phase::Fetch, self.fetch).await
    }

    async fn render(&self, _args: &Args) -> Result<(), HandlerError> {
        self.run(Phase::Render, self.render).await
    }

    async fn destroy(&self) -> Result<(), HandlerError> {
        self.run(Phase::Destroy, self.destroy).await
    }
}
