//! Event publication subsystem.
//!
//! # Data Flow
//! ```text
//! Route / Router / History state change
//!     → typed emission (RouteEmission, RouterEmission, HistoryEmission)
//!     → emitter.rs (match topic, drop once-listeners)
//!     → listeners invoked synchronously, in subscription order
//! ```
//!
//! # Design Decisions
//! - Topics are enums, never strings
//! - Listeners run outside the registry lock so they may subscribe,
//!   unsubscribe or emit again
//! - Emission is synchronous: an event is fully delivered before the
//!   emitting lifecycle step continues

pub mod emitter;

pub use emitter::{Event, EventEmitter, SubscriptionId};
