//! Route extension points.
//!
//! A concrete route type implements [`RouteHandler`] and overrides only the
//! hooks it cares about; everything defaults to a no-op.

use async_trait::async_trait;

use crate::lifecycle::args::Args;
use crate::lifecycle::error::{HandlerError, RoutingError};

/// Capabilities of a route: three asynchronous phases plus synchronous hooks.
///
/// Hooks run before the matching event is emitted. They must not block.
#[async_trait]
pub trait RouteHandler: Send + Sync {
    fn on_before_enter(&self, _args: &Args) {}

    fn on_before_fetch(&self, _args: &Args) {}

    /// Load whatever the route needs. Receives exactly the navigation args.
    async fn fetch(&self, _args: &Args) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_fetch(&self, _args: &Args) {}

    fn on_before_render(&self, _args: &Args) {}

    /// Present the route. Receives exactly the navigation args.
    async fn render(&self, _args: &Args) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_render(&self, _args: &Args) {}

    fn on_enter(&self, _args: &Args) {}

    fn on_before_exit(&self) {}

    fn on_before_destroy(&self) {}

    /// Tear the route down.
    async fn destroy(&self) -> Result<(), HandlerError> {
        Ok(())
    }

    fn on_destroy(&self) {}

    fn on_exit(&self) {}

    fn on_before_cancel(&self) {}

    fn on_cancel(&self) {}

    fn on_error(&self, _err: &RoutingError) {}

    fn on_error_enter(&self, _err: &RoutingError) {}

    fn on_error_exit(&self, _err: &RoutingError) {}
}

/// Route with no behavior of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl RouteHandler for NoopHandler {}
