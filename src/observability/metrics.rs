//! Lifecycle metrics.
//!
//! # Metrics
//! - `route_transitions_total` (counter): enter/exit outcomes by
//!   `transition` and `outcome`
//! - `route_enter_duration_seconds` (histogram): time from `enter` start
//!   to the `enter` event
//! - `router_navigations_total` (counter): `execute` outcomes

use std::time::Duration;

pub fn record_transition(transition: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "route_transitions_total",
        "transition" => transition,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_enter_duration(elapsed: Duration) {
    ::metrics::histogram!("route_enter_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_navigation(outcome: &'static str) {
    ::metrics::counter!("router_navigations_total", "outcome" => outcome).increment(1);
}
