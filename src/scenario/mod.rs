//! Scenario replay subsystem.
//!
//! # Data Flow
//! ```text
//! ScenarioConfig
//!     → runner.rs (History + Navigator + one Router per name)
//!     → each navigation: Router::execute(callback → scripted.rs route)
//!     → every route/router/history emission recorded
//!     → Trace (text or JSON)
//! ```
//!
//! # Design Decisions
//! - Navigations run in order; `concurrent = true` starts one without
//!   waiting for the earlier ones, which exercises exit-while-entering
//! - The router is announced on the history after its navigation settles

pub mod runner;
pub mod scripted;

pub use runner::{ScenarioRunner, Trace, TraceEntry};
pub use scripted::{ScriptedFailure, ScriptedRoute};
