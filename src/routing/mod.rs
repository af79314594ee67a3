//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! URL match (external)
//!     → router.rs Router::execute(callback, args)
//!         → navigator.rs (lock the current-route slot)
//!         → previous Route exit()          (fully awaited)
//!         → callback(args) → Target        (stored unconditionally)
//!         → slot released
//!         → Target::Route: attach router, enter(args)
//!     → on failure: router error hooks → history.rs error channel
//!
//! history.rs announces the active router
//!     → every Router updates its active flag
//! ```
//!
//! # Design Decisions
//! - One Navigator per navigation area replaces a process-wide slot
//! - The slot is held from "read previous" to "store next"; no two
//!   navigations can interleave there
//! - Entering happens outside the slot lock, so a later navigation can
//!   exit (and cancel) a route that is still entering
//! - Failures are forwarded to the history service, then returned

pub mod history;
pub mod navigator;
pub mod router;

pub use history::{History, HistoryEmission, HistoryTopic};
pub use navigator::Navigator;
pub use router::{NoopRouterHandler, Router, RouterEmission, RouterEvent, RouterHandler, RouterId, Target};
