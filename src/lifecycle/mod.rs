//! Route lifecycle subsystem.
//!
//! # Data Flow
//! ```text
//! enter(args):
//!     before:enter → before:fetch → [yield, checkpoint] → fetch(args)
//!     → fetch → before:render → [checkpoint] → render(args)
//!     → render → enter
//!
//! exit():
//!     [cancel + await, if entering] → before:exit → before:destroy
//!     → [yield] → destroy() → destroy → exit → release listeners
//!
//! cancel():
//!     before:cancel → token set → enter resolves via `cancel`
//! ```
//!
//! # Design Decisions
//! - Every phase goes through one dispatcher: hook, event, router
//!   notification, relayed `<phase>:route` event
//! - Cancellation is cooperative; only the two checkpoints observe it
//!   unless the policy opts into aborting in-flight work
//! - Cancellation is never reported as an error

pub mod args;
pub mod cancel;
pub mod error;
pub mod handler;
pub mod policy;
pub mod route;

pub use args::Args;
pub use cancel::{CancelError, CancellationToken, PendingCancel};
pub use error::{HandlerError, Phase, RoutingError, SharedError};
pub use handler::{NoopHandler, RouteHandler};
pub use policy::LifecyclePolicy;
pub use route::{Payload, Route, RouteEmission, RouteEvent, RouteId, RouteTopic};
