//! Route lifecycle state machine.
//!
//! # States
//! ```text
//! idle → entering → entered → exiting → exited
//!            └────→ cancelled
//! ```
//!
//! # Responsibilities
//! - Run the enter, exit and cancel sequences in their fixed order
//! - Dispatch every phase to the handler hook, the route's listeners and,
//!   when attached, the owning router
//! - Track the entering / exiting / cancelled flags

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::oneshot;
use uuid::Uuid;

use crate::events::{Event, EventEmitter, SubscriptionId};
use crate::lifecycle::args::{Args, NO_ARGS};
use crate::lifecycle::cancel::{CancelError, CancellationToken, PendingCancel};
use crate::lifecycle::error::{HandlerError, Phase, RoutingError};
use crate::lifecycle::handler::RouteHandler;
use crate::lifecycle::policy::LifecyclePolicy;
use crate::observability::metrics;
use crate::routing::router::{Router, WeakRouter};

/// Unique identity of a route instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(Uuid);

impl RouteId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Named step of the route lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteEvent {
    BeforeEnter,
    BeforeFetch,
    Fetch,
    BeforeRender,
    Render,
    Enter,
    BeforeExit,
    BeforeDestroy,
    Destroy,
    Exit,
    BeforeCancel,
    Cancel,
    Error,
    ErrorEnter,
    ErrorExit,
}

impl RouteEvent {
    pub const fn name(self) -> &'static str {
        match self {
            RouteEvent::BeforeEnter => "before:enter",
            RouteEvent::BeforeFetch => "before:fetch",
            RouteEvent::Fetch => "fetch",
            RouteEvent::BeforeRender => "before:render",
            RouteEvent::Render => "render",
            RouteEvent::Enter => "enter",
            RouteEvent::BeforeExit => "before:exit",
            RouteEvent::BeforeDestroy => "before:destroy",
            RouteEvent::Destroy => "destroy",
            RouteEvent::Exit => "exit",
            RouteEvent::BeforeCancel => "before:cancel",
            RouteEvent::Cancel => "cancel",
            RouteEvent::Error => "error",
            RouteEvent::ErrorEnter => "error:enter",
            RouteEvent::ErrorExit => "error:exit",
        }
    }
}

impl fmt::Display for RouteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Topic of a route emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteTopic {
    /// Emitted for the route's own observers.
    Phase(RouteEvent),
    /// `<phase>:route`, emitted after the owning router was notified.
    Relayed(RouteEvent),
}

impl RouteTopic {
    pub fn event(self) -> RouteEvent {
        match self {
            RouteTopic::Phase(event) | RouteTopic::Relayed(event) => event,
        }
    }
}

impl fmt::Display for RouteTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteTopic::Phase(event) => write!(f, "{}", event),
            RouteTopic::Relayed(event) => write!(f, "{}:route", event),
        }
    }
}

/// Data following the route in an emission.
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    Args(Args),
    Error(RoutingError),
}

impl Payload {
    /// Navigation arguments, empty for phases that carry none.
    pub fn args(&self) -> &Args {
        match self {
            Payload::Args(args) => args,
            _ => &NO_ARGS,
        }
    }

    pub fn error(&self) -> Option<&RoutingError> {
        match self {
            Payload::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// What route listeners receive: the emitting route first, payload after.
#[derive(Debug, Clone)]
pub struct RouteEmission {
    pub route: Route,
    pub topic: RouteTopic,
    pub payload: Payload,
}

impl Event for RouteEmission {
    type Topic = RouteTopic;

    fn topic(&self) -> RouteTopic {
        self.topic
    }
}

struct RouteInner {
    id: RouteId,
    name: String,
    handler: Box<dyn RouteHandler>,
    policy: LifecyclePolicy,
    entering: AtomicBool,
    exiting: AtomicBool,
    cancellation: CancellationToken,
    /// Back-reference set by the router that produced this route.
    router: Mutex<Option<WeakRouter>>,
    events: EventEmitter<RouteEmission>,
}

/// A navigation target with an enter / exit / cancel lifecycle.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct Route {
    inner: Arc<RouteInner>,
}

impl Route {
    pub fn new(name: impl Into<String>, handler: impl RouteHandler + 'static) -> Self {
        Self::with_policy(name, handler, LifecyclePolicy::default())
    }

    pub fn with_policy(
        name: impl Into<String>,
        handler: impl RouteHandler + 'static,
        policy: LifecyclePolicy,
    ) -> Self {
        Self {
            inner: Arc::new(RouteInner {
                id: RouteId::generate(),
                name: name.into(),
                handler: Box::new(handler),
                policy,
                entering: AtomicBool::new(false),
                exiting: AtomicBool::new(false),
                cancellation: CancellationToken::new(),
                router: Mutex::new(None),
                events: EventEmitter::new(),
            }),
        }
    }

    pub fn id(&self) -> RouteId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn policy(&self) -> LifecyclePolicy {
        self.inner.policy
    }

    pub fn is_entering(&self) -> bool {
        self.inner.entering.load(Ordering::SeqCst)
    }

    pub fn is_exiting(&self) -> bool {
        self.inner.exiting.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancellation.is_cancelled()
    }

    /// Listeners for this route's emissions.
    pub fn events(&self) -> &EventEmitter<RouteEmission> {
        &self.inner.events
    }

    /// The router that produced this route, while it is still alive.
    pub fn router(&self) -> Option<Router> {
        self.inner
            .router
            .lock()
            .expect("route router mutex poisoned")
            .as_ref()
            .and_then(WeakRouter::upgrade)
    }

    /// True if both handles refer to the same route instance.
    pub fn ptr_eq(a: &Route, b: &Route) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub(crate) fn attach_router(&self, router: &Router) {
        *self.inner.router.lock().expect("route router mutex poisoned") = Some(router.downgrade());
    }

    /// Bring the route up: fetch, then render.
    ///
    /// Resolves `Ok(())` on success and when cancelled; fetch and render
    /// failures are reported through the error hooks and returned.
    ///
    /// Dropping the future before it settles counts as a cancellation:
    /// `on_cancel` and the `cancel` listeners run synchronously inside the
    /// drop. They must not panic, or a drop during unwinding aborts.
    pub async fn enter(&self, args: Args) -> Result<(), RoutingError> {
        let started = Instant::now();
        self.inner.entering.store(true, Ordering::SeqCst);
        let mut guard = EnterGuard { route: self, armed: true };

        tracing::debug!(
            route = %self.inner.name,
            route_id = %self.inner.id,
            args = %args,
            "Entering route"
        );

        self.trigger(RouteEvent::BeforeEnter, Payload::Args(args.clone()));
        self.trigger(RouteEvent::BeforeFetch, Payload::Args(args.clone()));

        let outcome = self.run_enter_phases(&args).await;
        guard.armed = false;
        self.inner.entering.store(false, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                self.trigger(RouteEvent::Render, Payload::Args(args.clone()));
                self.trigger(RouteEvent::Enter, Payload::Args(args));
                metrics::record_transition("enter", "success");
                metrics::record_enter_duration(started.elapsed());
                tracing::debug!(route = %self.inner.name, "Route entered");
                Ok(())
            }
            Err(RoutingError::Cancelled) => {
                self.trigger(RouteEvent::Cancel, Payload::None);
                metrics::record_transition("enter", "cancelled");
                tracing::debug!(route = %self.inner.name, "Route entry cancelled");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(route = %self.inner.name, error = %err, "Route failed to enter");
                self.trigger(RouteEvent::Error, Payload::Error(err.clone()));
                self.trigger(RouteEvent::ErrorEnter, Payload::Error(err.clone()));
                metrics::record_transition("enter", "error");
                Err(err)
            }
        }
    }

    /// Tear the route down, cancelling an in-flight entry first.
    ///
    /// Listeners on this route are released whether or not destroy succeeds.
    pub async fn exit(&self) -> Result<(), RoutingError> {
        if let Some(pending) = self.cancel() {
            if let Err(reason) = pending.await {
                tracing::debug!(route = %self.inner.name, reason = %reason, "Exiting without cancellation");
            }
        }

        self.inner.exiting.store(true, Ordering::SeqCst);
        tracing::debug!(route = %self.inner.name, route_id = %self.inner.id, "Exiting route");

        self.trigger(RouteEvent::BeforeExit, Payload::None);
        self.trigger(RouteEvent::BeforeDestroy, Payload::None);

        tokio::task::yield_now().await;
        let outcome = self
            .run_phase(Phase::Destroy, self.inner.handler.destroy())
            .await;
        self.inner.exiting.store(false, Ordering::SeqCst);

        match outcome {
            Ok(()) => {
                self.trigger(RouteEvent::Destroy, Payload::None);
                self.trigger(RouteEvent::Exit, Payload::None);
                self.inner.events.clear();
                metrics::record_transition("exit", "success");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(route = %self.inner.name, error = %err, "Route failed to exit");
                self.trigger(RouteEvent::Error, Payload::Error(err.clone()));
                self.trigger(RouteEvent::ErrorExit, Payload::Error(err.clone()));
                self.inner.events.clear();
                metrics::record_transition("exit", "error");
                Err(err)
            }
        }
    }

    /// Request cancellation of an in-flight [`enter`](Self::enter).
    ///
    /// Returns `None` when the route is not entering. Otherwise the
    /// returned future resolves `Ok(())` once the route emits `cancel`, or
    /// an error if it emits `enter` or `error` first.
    pub fn cancel(&self) -> Option<PendingCancel> {
        if !self.is_entering() {
            return None;
        }

        self.trigger(RouteEvent::BeforeCancel, Payload::None);
        self.inner.cancellation.cancel();
        tracing::debug!(route = %self.inner.name, "Cancellation requested");

        let (tx, rx) = oneshot::channel();
        let waiter = Arc::new(CancelWaiter {
            tx: Mutex::new(Some(tx)),
            subscriptions: Mutex::new(Vec::new()),
        });

        let ids = [
            self.settle_on(RouteEvent::Cancel, &waiter, |_| Ok(())),
            self.settle_on(RouteEvent::Enter, &waiter, |_| Err(CancelError::Entered)),
            self.settle_on(RouteEvent::Error, &waiter, |emission| {
                Err(CancelError::Failed(
                    emission.payload.error().cloned().unwrap_or(RoutingError::Cancelled),
                ))
            }),
        ];
        waiter
            .subscriptions
            .lock()
            .expect("cancel waiter mutex poisoned")
            .extend(ids);

        Some(PendingCancel::new(rx))
    }

    async fn run_enter_phases(&self, args: &Args) -> Result<(), RoutingError> {
        tokio::task::yield_now().await;
        self.checkpoint()?;
        self.run_phase(Phase::Fetch, self.inner.handler.fetch(args))
            .await?;

        self.trigger(RouteEvent::Fetch, Payload::Args(args.clone()));
        self.trigger(RouteEvent::BeforeRender, Payload::Args(args.clone()));

        self.checkpoint()?;
        self.run_phase(Phase::Render, self.inner.handler.render(args))
            .await
    }

    fn checkpoint(&self) -> Result<(), RoutingError> {
        if self.is_cancelled() {
            Err(RoutingError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Await one extension point under the route's policy.
    async fn run_phase<F>(&self, phase: Phase, work: F) -> Result<(), RoutingError>
    where
        F: Future<Output = Result<(), HandlerError>>,
    {
        let policy = self.inner.policy;
        let bounded = async move {
            match policy.phase_timeout {
                Some(after) => match tokio::time::timeout(after, work).await {
                    Ok(result) => result.map_err(|e| RoutingError::phase(phase, e)),
                    Err(_) => Err(RoutingError::Timeout { phase, after }),
                },
                None => work.await.map_err(|e| RoutingError::phase(phase, e)),
            }
        };

        if policy.abort_on_cancel && phase != Phase::Destroy {
            tokio::select! {
                biased;
                _ = self.inner.cancellation.cancelled() => Err(RoutingError::Cancelled),
                result = bounded => result,
            }
        } else {
            bounded.await
        }
    }

    /// Single dispatch point: hook, event, router notification, relayed event.
    fn trigger(&self, event: RouteEvent, payload: Payload) {
        self.call_hook(event, &payload);
        self.inner.events.emit(&RouteEmission {
            route: self.clone(),
            topic: RouteTopic::Phase(event),
            payload,
        });

        if let Some(router) = self.router() {
            router.notify_route(event, self);
            self.inner.events.emit(&RouteEmission {
                route: self.clone(),
                topic: RouteTopic::Relayed(event),
                payload: Payload::None,
            });
        }
    }

    fn call_hook(&self, event: RouteEvent, payload: &Payload) {
        let handler = &*self.inner.handler;
        let args = payload.args();
        match event {
            RouteEvent::BeforeEnter => handler.on_before_enter(args),
            RouteEvent::BeforeFetch => handler.on_before_fetch(args),
            RouteEvent::Fetch => handler.on_fetch(args),
            RouteEvent::BeforeRender => handler.on_before_render(args),
            RouteEvent::Render => handler.on_render(args),
            RouteEvent::Enter => handler.on_enter(args),
            RouteEvent::BeforeExit => handler.on_before_exit(),
            RouteEvent::BeforeDestroy => handler.on_before_destroy(),
            RouteEvent::Destroy => handler.on_destroy(),
            RouteEvent::Exit => handler.on_exit(),
            RouteEvent::BeforeCancel => handler.on_before_cancel(),
            RouteEvent::Cancel => handler.on_cancel(),
            RouteEvent::Error => {
                if let Some(err) = payload.error() {
                    handler.on_error(err);
                }
            }
            RouteEvent::ErrorEnter => {
                if let Some(err) = payload.error() {
                    handler.on_error_enter(err);
                }
            }
            RouteEvent::ErrorExit => {
                if let Some(err) = payload.error() {
                    handler.on_error_exit(err);
                }
            }
        }
    }

    fn settle_on(
        &self,
        event: RouteEvent,
        waiter: &Arc<CancelWaiter>,
        outcome: fn(&RouteEmission) -> Result<(), CancelError>,
    ) -> SubscriptionId {
        let waiter = waiter.clone();
        self.inner
            .events
            .once(RouteTopic::Phase(event), move |emission| {
                waiter.settle(emission, outcome(emission));
            })
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("entering", &self.is_entering())
            .field("exiting", &self.is_exiting())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Shared by the three once-listeners of a single cancellation request.
struct CancelWaiter {
    tx: Mutex<Option<oneshot::Sender<Result<(), CancelError>>>>,
    subscriptions: Mutex<Vec<SubscriptionId>>,
}

impl CancelWaiter {
    fn settle(&self, emission: &RouteEmission, outcome: Result<(), CancelError>) {
        let tx = self.tx.lock().expect("cancel waiter mutex poisoned").take();
        if let Some(tx) = tx {
            let _ = tx.send(outcome);
            let ids: Vec<_> = self
                .subscriptions
                .lock()
                .expect("cancel waiter mutex poisoned")
                .drain(..)
                .collect();
            for id in ids {
                emission.route.events().off(id);
            }
        }
    }
}

/// An `enter` future dropped before it settles counts as cancelled.
struct EnterGuard<'a> {
    route: &'a Route,
    armed: bool,
}

impl Drop for EnterGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.route.inner.entering.store(false, Ordering::SeqCst);
            tracing::debug!(route = %self.route.inner.name, "Route entry abandoned");
            self.route.trigger(RouteEvent::Cancel, Payload::None);
            metrics::record_transition("enter", "abandoned");
        }
    }
}
