//! Scenario replay.
//!
//! # Responsibilities
//! - Build the history service, navigator and routers for a scenario
//! - Drive every configured navigation through `Router::execute`
//! - Record every emission into a time-stamped trace

use std::collections::HashMap;
use std::fmt::Write as _;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::{AppConfig, RouteConfig, ScenarioConfig};
use crate::lifecycle::{Args, LifecyclePolicy, Route, RouteTopic, RoutingError};
use crate::routing::{
    History, HistoryEmission, Navigator, NoopRouterHandler, Router, RouterId, Target,
};
use crate::scenario::scripted::ScriptedRoute;

/// One recorded emission.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    /// Milliseconds since the replay started.
    pub at_ms: u64,
    /// `route:<name>`, `router:<name>` or `history`.
    pub source: String,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Everything observed during a replay.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub entries: Vec<TraceEntry>,
    /// Navigations whose `execute` returned an error.
    pub failures: usize,
}

impl Trace {
    /// One line per entry.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = write!(out, "{:>6}ms  {:<20} {}", entry.at_ms, entry.source, entry.event);
            if let Some(detail) = &entry.detail {
                let _ = write!(out, "  ({})", detail);
            }
            out.push('\n');
        }
        let _ = writeln!(out, "failures: {}", self.failures);
        out
    }

    /// Position of the first entry matching `source` and `event`.
    pub fn position(&self, source: &str, event: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.source == source && e.event == event)
    }
}

#[derive(Clone)]
struct Recorder {
    started: Instant,
    entries: Arc<Mutex<Vec<TraceEntry>>>,
}

impl Recorder {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, source: String, event: String, detail: Option<String>) {
        let at_ms = self.started.elapsed().as_millis() as u64;
        self.entries
            .lock()
            .expect("trace mutex poisoned")
            .push(TraceEntry {
                at_ms,
                source,
                event,
                detail,
            });
    }

    fn watch_route(&self, route: &Route) {
        let recorder = self.clone();
        route.events().on_any(move |emission| {
            if let RouteTopic::Phase(event) = emission.topic {
                recorder.record(
                    format!("route:{}", emission.route.name()),
                    event.to_string(),
                    emission.payload.error().map(ToString::to_string),
                );
            }
        });
    }

    fn watch_router(&self, router: &Router) {
        let recorder = self.clone();
        router.events().on_any(move |emission| {
            recorder.record(
                format!("router:{}", emission.router.name()),
                emission.event.to_string(),
                emission.error.as_ref().map(ToString::to_string),
            );
        });
    }

    fn watch_history(&self, history: &History, names: HashMap<RouterId, String>) {
        let recorder = self.clone();
        history.events().on_any(move |emission| {
            let (event, router, detail) = match emission {
                HistoryEmission::Route { router } => ("route", router, None),
                HistoryEmission::Error { router, error } => ("error", router, Some(error.to_string())),
            };
            let name = names.get(router).cloned().unwrap_or_else(|| router.to_string());
            let detail = match detail {
                Some(error) => format!("{}: {}", name, error),
                None => name,
            };
            recorder.record("history".to_string(), event.to_string(), Some(detail));
        });
    }

    fn take(&self) -> Vec<TraceEntry> {
        std::mem::take(&mut *self.entries.lock().expect("trace mutex poisoned"))
    }
}

/// Replays a scenario against real routers and scripted routes.
pub struct ScenarioRunner {
    scenario: ScenarioConfig,
    policy: LifecyclePolicy,
}

impl ScenarioRunner {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            scenario: config.scenario.clone(),
            policy: LifecyclePolicy::from(&config.lifecycle),
        }
    }

    /// Run every navigation and return the recorded trace.
    pub async fn run(&self) -> Trace {
        let recorder = Recorder::new();
        let history = Arc::new(History::new());
        let navigator = Arc::new(Navigator::new(history.clone()));

        let routers: HashMap<String, Router> = self
            .scenario
            .routers
            .iter()
            .map(|name| {
                let router = Router::new(name.clone(), navigator.clone(), NoopRouterHandler);
                recorder.watch_router(&router);
                (name.clone(), router)
            })
            .collect();
        recorder.watch_history(
            &history,
            routers.values().map(|r| (r.id(), r.name().to_string())).collect(),
        );

        let routes: HashMap<&str, &RouteConfig> = self
            .scenario
            .routes
            .iter()
            .map(|route| (route.name.as_str(), route))
            .collect();

        let mut failures = 0;
        let mut tasks = JoinSet::new();
        for (index, navigation) in self.scenario.navigations.iter().enumerate() {
            if !navigation.concurrent {
                failures += drain(&mut tasks).await;
            }

            let Some(router) = routers.get(&navigation.router).cloned() else {
                tracing::warn!(index, router = %navigation.router, "Skipping navigation for unknown router");
                continue;
            };
            let spec = navigation
                .route
                .as_deref()
                .and_then(|name| routes.get(name))
                .map(|config| (*config).clone());
            let policy = self.policy;
            let recorder = recorder.clone();
            let history = history.clone();
            let args = Args::from(navigation.args.clone());

            tasks.spawn(async move {
                let resolve = move |_: &Args| {
                    Ok(match spec {
                        Some(config) => {
                            let route = Route::with_policy(
                                config.name.clone(),
                                ScriptedRoute::from(&config),
                                policy,
                            );
                            recorder.watch_route(&route);
                            Target::Route(route)
                        }
                        None => Target::Action,
                    })
                };
                let result = router.execute(resolve, args).await;
                history.announce(&router);
                result
            });
        }
        failures += drain(&mut tasks).await;

        Trace {
            entries: recorder.take(),
            failures,
        }
    }
}

/// Wait for every spawned navigation, returning how many failed.
async fn drain(tasks: &mut JoinSet<Result<(), RoutingError>>) -> usize {
    let mut failures = 0;
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "Navigation returned an error");
                failures += 1;
            }
            Err(err) => {
                tracing::error!(error = %err, "Navigation task aborted");
                failures += 1;
            }
        }
    }
    failures
}
