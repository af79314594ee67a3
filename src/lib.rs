//! Route lifecycle and single-active-route sequencing.
//!
//! A [`Route`] is brought up with `enter` (fetch, then render) and torn
//! down with `exit` (destroy), with a hook and an event at every phase.
//! A [`Router`] sequences navigations so that the previous route has fully
//! exited before the next one is produced and entered.

pub mod config;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod scenario;

pub use config::AppConfig;
pub use lifecycle::{Args, LifecyclePolicy, Route, RouteHandler, RoutingError};
pub use routing::{History, Navigator, Router, RouterHandler, Target};
