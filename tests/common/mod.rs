//! Shared helpers for lifecycle and sequencing tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use route_lifecycle::lifecycle::{Args, HandlerError, Route, RouteEvent, RouteHandler, RoutingError};
use route_lifecycle::routing::RouterHandler;

/// Ordered log shared by handlers and listeners.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.lock().unwrap().iter().any(|e| e == entry)
    }

    /// Index of `entry`; panics if it was never recorded.
    pub fn index_of(&self, entry: &str) -> usize {
        self.0
            .lock()
            .unwrap()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("`{}` not recorded", entry))
    }
}

/// Lets a test hold an async phase open until it decides to release it.
#[derive(Clone, Default)]
pub struct Gate {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    async fn pass(&self) {
        self.started.notify_one();
        self.release.notified().await;
    }
}

#[derive(Debug)]
pub struct TestError(pub &'static str);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for TestError {}

/// Route handler that records every hook and extension-point call.
#[derive(Clone, Default)]
pub struct Recording {
    journal: Journal,
    prefix: String,
    fetch_error: Option<&'static str>,
    render_error: Option<&'static str>,
    destroy_error: Option<&'static str>,
    fetch_gate: Option<Gate>,
    render_gate: Option<Gate>,
    fetch_delay: Option<Duration>,
}

impl Recording {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            ..Self::default()
        }
    }

    /// Prefix every entry with `<prefix>.`.
    pub fn prefixed(journal: &Journal, prefix: &str) -> Self {
        Self {
            journal: journal.clone(),
            prefix: format!("{}.", prefix),
            ..Self::default()
        }
    }

    pub fn failing_fetch(mut self, message: &'static str) -> Self {
        self.fetch_error = Some(message);
        self
    }

    pub fn failing_render(mut self, message: &'static str) -> Self {
        self.render_error = Some(message);
        self
    }

    pub fn failing_destroy(mut self, message: &'static str) -> Self {
        self.destroy_error = Some(message);
        self
    }

    pub fn fetch_gate(mut self, gate: &Gate) -> Self {
        self.fetch_gate = Some(gate.clone());
        self
    }

    pub fn render_gate(mut self, gate: &Gate) -> Self {
        self.render_gate = Some(gate.clone());
        self
    }

    pub fn fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = Some(delay);
        self
    }

    fn log(&self, entry: impl std::fmt::Display) {
        self.journal.push(format!("{}{}", self.prefix, entry));
    }
}

fn outcome(error: Option<&'static str>) -> Result<(), HandlerError> {
    match error {
        Some(message) => Err(Box::new(TestError(message))),
        None => Ok(()),
    }
}

#[async_trait]
impl RouteHandler for Recording {
    fn on_before_enter(&self, args: &Args) {
        self.log(format_args!("on_before_enter {}", args));
    }

    fn on_before_fetch(&self, args: &Args) {
        self.log(format_args!("on_before_fetch {}", args));
    }

    async fn fetch(&self, args: &Args) -> Result<(), HandlerError> {
        self.log(format_args!("fetch() {}", args));
        if let Some(gate) = &self.fetch_gate {
            gate.pass().await;
        }
        if let Some(delay) = self.fetch_delay {
            tokio::time::sleep(delay).await;
        }
        outcome(self.fetch_error)
    }

    fn on_fetch(&self, args: &Args) {
        self.log(format_args!("on_fetch {}", args));
    }

    fn on_before_render(&self, args: &Args) {
        self.log(format_args!("on_before_render {}", args));
    }

    async fn render(&self, args: &Args) -> Result<(), HandlerError> {
        self.log(format_args!("render() {}", args));
        if let Some(gate) = &self.render_gate {
            gate.pass().await;
        }
        outcome(self.render_error)
    }

    fn on_render(&self, args: &Args) {
        self.log(format_args!("on_render {}", args));
    }

    fn on_enter(&self, args: &Args) {
        self.log(format_args!("on_enter {}", args));
    }

    fn on_before_exit(&self) {
        self.log("on_before_exit");
    }

    fn on_before_destroy(&self) {
        self.log("on_before_destroy");
    }

    async fn destroy(&self) -> Result<(), HandlerError> {
        self.log("destroy()");
        outcome(self.destroy_error)
    }

    fn on_destroy(&self) {
        self.log("on_destroy");
    }

    fn on_exit(&self) {
        self.log("on_exit");
    }

    fn on_before_cancel(&self) {
        self.log("on_before_cancel");
    }

    fn on_cancel(&self) {
        self.log("on_cancel");
    }

    fn on_error(&self, err: &RoutingError) {
        self.log(format_args!("on_error {}", err));
    }

    fn on_error_enter(&self, err: &RoutingError) {
        self.log(format_args!("on_error_enter {}", err));
    }

    fn on_error_exit(&self, err: &RoutingError) {
        self.log(format_args!("on_error_exit {}", err));
    }
}

/// Router handler that records its hooks and managed-route notifications.
pub struct RecordingRouter {
    journal: Journal,
}

impl RecordingRouter {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl RouterHandler for RecordingRouter {
    fn on_before_enter(&self) {
        self.journal.push("router.on_before_enter");
    }

    fn on_before_route(&self) {
        self.journal.push("router.on_before_route");
    }

    fn on_route(&self) {
        self.journal.push("router.on_route");
    }

    fn on_enter(&self) {
        self.journal.push("router.on_enter");
    }

    fn on_error(&self, err: &RoutingError) {
        self.journal.push(format!("router.on_error {}", err));
    }

    fn on_managed_route(&self, event: RouteEvent, route: &Route) {
        self.journal
            .push(format!("router.managed {} {}", route.name(), event));
    }
}

/// Record every emission of `route` as `<prefix><topic>`.
pub fn watch(route: &Route, journal: &Journal, prefix: &str) {
    let journal = journal.clone();
    let prefix = prefix.to_string();
    route.events().on_any(move |emission| {
        journal.push(format!("{}{}", prefix, emission.topic));
    });
}
