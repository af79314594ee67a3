//! Single-active-route sequencer.
//!
//! # Responsibilities
//! - Exit the previous route before resolving and entering the next one
//! - Track whether this router handled the latest navigation
//! - Report navigation failures to hooks, listeners and the history service
//!
//! # Design Decisions
//! - `execute` returns the failure after forwarding it to the history
//!   service, so callers can await a navigation and see its outcome
//! - A callback may return a plain action; it still replaces the previous
//!   route but nothing is entered

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use uuid::Uuid;

use crate::events::{Event, EventEmitter, SubscriptionId};
use crate::lifecycle::{Args, HandlerError, Route, RouteEvent, RoutingError};
use crate::observability::metrics;
use crate::routing::history::{HistoryEmission, HistoryTopic};
use crate::routing::navigator::Navigator;

/// Unique identity of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouterId(Uuid);

impl RouterId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RouterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What a route callback resolved a navigation to.
#[derive(Debug, Clone)]
pub enum Target {
    /// Lifecycle-managed route; entered after the previous one exits.
    Route(Route),
    /// Plain controller action; nothing to enter.
    Action,
}

impl From<Route> for Target {
    fn from(route: Route) -> Self {
        Target::Route(route)
    }
}

/// Named step of a router navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouterEvent {
    BeforeEnter,
    BeforeRoute,
    Route,
    Enter,
    Error,
}

impl RouterEvent {
    pub const fn name(self) -> &'static str {
        match self {
            RouterEvent::BeforeEnter => "before:enter",
            RouterEvent::BeforeRoute => "before:route",
            RouterEvent::Route => "route",
            RouterEvent::Enter => "enter",
            RouterEvent::Error => "error",
        }
    }
}

impl fmt::Display for RouterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What router listeners receive.
#[derive(Debug, Clone)]
pub struct RouterEmission {
    pub router: Router,
    pub event: RouterEvent,
    pub error: Option<RoutingError>,
}

impl Event for RouterEmission {
    type Topic = RouterEvent;

    fn topic(&self) -> RouterEvent {
        self.event
    }
}

/// Router hooks. All default to no-ops.
pub trait RouterHandler: Send + Sync {
    /// Navigation starts while another router is active.
    fn on_before_enter(&self) {}

    fn on_before_route(&self) {}

    fn on_route(&self) {}

    /// Navigation finished after another router was active.
    fn on_enter(&self) {}

    fn on_error(&self, _err: &RoutingError) {}

    /// A route produced by this router reached `event`.
    fn on_managed_route(&self, _event: RouteEvent, _route: &Route) {}
}

/// Router with no hooks of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRouterHandler;

impl RouterHandler for NoopRouterHandler {}

struct RouterInner {
    id: RouterId,
    name: String,
    handler: Box<dyn RouterHandler>,
    navigator: Arc<Navigator>,
    active: AtomicBool,
    events: EventEmitter<RouterEmission>,
    history_subscription: SubscriptionId,
}

impl Drop for RouterInner {
    fn drop(&mut self) {
        self.navigator
            .history()
            .events()
            .off(self.history_subscription);
    }
}

/// Sequences navigations of one navigation area.
///
/// Cloning is cheap; clones share the same router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

/// Non-owning router handle held by routes.
#[derive(Clone)]
pub(crate) struct WeakRouter(Weak<RouterInner>);

impl WeakRouter {
    pub(crate) fn upgrade(&self) -> Option<Router> {
        self.0.upgrade().map(|inner| Router { inner })
    }
}

impl Router {
    /// Create a router and subscribe it to the navigator's history service.
    pub fn new(
        name: impl Into<String>,
        navigator: Arc<Navigator>,
        handler: impl RouterHandler + 'static,
    ) -> Self {
        let id = RouterId::generate();
        let history = navigator.history().clone();

        let inner = Arc::new_cyclic(|weak: &Weak<RouterInner>| {
            let weak = weak.clone();
            let history_subscription = history.events().on(HistoryTopic::Route, move |emission| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if let HistoryEmission::Route { router } = emission {
                    inner.active.store(*router == inner.id, Ordering::SeqCst);
                }
            });

            RouterInner {
                id,
                name: name.into(),
                handler: Box::new(handler),
                navigator,
                active: AtomicBool::new(false),
                events: EventEmitter::new(),
                history_subscription,
            }
        });

        Self { inner }
    }

    pub fn id(&self) -> RouterId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.inner.navigator
    }

    /// True iff the latest history announcement named this router.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> &EventEmitter<RouterEmission> {
        &self.inner.events
    }

    /// Run one navigation: exit the previous route, resolve the next target
    /// with `callback(args)` and enter it.
    ///
    /// Failures are reported through `on_error`, the `error` event and the
    /// history service's error channel, then returned.
    pub async fn execute<F>(&self, callback: F, args: Args) -> Result<(), RoutingError>
    where
        F: FnOnce(&Args) -> Result<Target, HandlerError>,
    {
        let was_inactive = !self.is_active();
        tracing::debug!(router = %self.inner.name, args = %args, was_inactive, "Executing navigation");

        if was_inactive {
            self.inner.handler.on_before_enter();
            self.emit(RouterEvent::BeforeEnter, None);
        }
        self.inner.handler.on_before_route();
        self.emit(RouterEvent::BeforeRoute, None);

        match self.sequence(callback, &args).await {
            Ok(()) => {
                self.inner.handler.on_route();
                self.emit(RouterEvent::Route, None);
                if was_inactive {
                    self.inner.handler.on_enter();
                    self.emit(RouterEvent::Enter, None);
                }
                metrics::record_navigation("success");
                tracing::info!(router = %self.inner.name, args = %args, "Navigation complete");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(router = %self.inner.name, error = %err, "Navigation failed");
                self.inner.handler.on_error(&err);
                self.emit(RouterEvent::Error, Some(err.clone()));
                self.inner.navigator.history().report_error(self, err.clone());
                metrics::record_navigation("error");
                Err(err)
            }
        }
    }

    /// Exit the previous target, store the next one, then enter it.
    async fn sequence<F>(&self, callback: F, args: &Args) -> Result<(), RoutingError>
    where
        F: FnOnce(&Args) -> Result<Target, HandlerError>,
    {
        let target = {
            let mut current = self.inner.navigator.lock_current().await;
            // Taken before exiting: a route exits at most once, even if destroy fails.
            if let Some(Target::Route(previous)) = current.take() {
                tracing::debug!(router = %self.inner.name, route = %previous.name(), "Exiting previous route");
                previous.exit().await?;
            }

            let target = callback(args).map_err(RoutingError::callback)?;
            *current = Some(target.clone());
            target
        };

        if let Target::Route(route) = target {
            route.attach_router(self);
            route.enter(args.clone()).await?;
        }
        Ok(())
    }

    pub(crate) fn downgrade(&self) -> WeakRouter {
        WeakRouter(Arc::downgrade(&self.inner))
    }

    /// Forward a managed route's phase to the router hook.
    pub(crate) fn notify_route(&self, event: RouteEvent, route: &Route) {
        self.inner.handler.on_managed_route(event, route);
    }

    fn emit(&self, event: RouterEvent, error: Option<RoutingError>) {
        self.inner.events.emit(&RouterEmission {
            router: self.clone(),
            event,
            error,
        });
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("active", &self.is_active())
            .finish()
    }
}
