//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Route / Router transitions produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (transition counters, enter latency)
//! ```
//!
//! # Design Decisions
//! - Structured fields (route, router, phase, error) on every log line
//! - Metrics go through the `metrics` facade; without an installed
//!   recorder they cost next to nothing
//! - The library never installs a subscriber or recorder itself

pub mod logging;
pub mod metrics;
