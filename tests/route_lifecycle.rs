//! Route enter / exit / cancel sequencing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use route_lifecycle::lifecycle::{
    Args, CancelError, LifecyclePolicy, Phase, Route, RouteEvent, RouteTopic, RoutingError,
};

mod common;
use common::{watch, Gate, Journal, Recording};

fn strings(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

#[tokio::test]
async fn test_enter_runs_phases_in_order() {
    let journal = Journal::new();
    let route = Route::new("inbox", Recording::new(&journal));
    watch(&route, &journal, "");

    route.enter(Args::from(["1", "2", "3"])).await.unwrap();

    assert_eq!(
        journal.entries(),
        strings(&[
            "on_before_enter [1, 2, 3]",
            "before:enter",
            "on_before_fetch [1, 2, 3]",
            "before:fetch",
            "fetch() [1, 2, 3]",
            "on_fetch [1, 2, 3]",
            "fetch",
            "on_before_render [1, 2, 3]",
            "before:render",
            "render() [1, 2, 3]",
            "on_render [1, 2, 3]",
            "render",
            "on_enter [1, 2, 3]",
            "enter",
        ])
    );
    assert!(!route.is_entering());
    assert!(!route.is_cancelled());
}

#[tokio::test]
async fn test_events_carry_route_and_args() {
    let route = Route::new("inbox", Recording::default());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let id = route.id();
    route
        .events()
        .on(RouteTopic::Phase(RouteEvent::Fetch), move |emission| {
            assert_eq!(emission.route.id(), id);
            sink.lock().unwrap().push(emission.payload.args().clone());
        });

    route.enter(Args::from(["inbox", "7"])).await.unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![Args::from(["inbox", "7"])]);
}

#[tokio::test]
async fn test_fetch_failure_skips_render() {
    let journal = Journal::new();
    let route = Route::new("inbox", Recording::new(&journal).failing_fetch("FooError"));
    watch(&route, &journal, "");

    let err = route.enter(Args::default()).await.unwrap_err();
    assert_eq!(err.failed_phase(), Some(Phase::Fetch));
    assert_eq!(err.app_error().unwrap().to_string(), "FooError");

    assert_eq!(
        journal.entries(),
        strings(&[
            "on_before_enter []",
            "before:enter",
            "on_before_fetch []",
            "before:fetch",
            "fetch() []",
            "on_error fetch failed: FooError",
            "error",
            "on_error_enter fetch failed: FooError",
            "error:enter",
        ])
    );
    assert!(!route.is_entering());
}

#[tokio::test]
async fn test_render_failure_never_enters() {
    let journal = Journal::new();
    let route = Route::new("inbox", Recording::new(&journal).failing_render("FooError"));
    watch(&route, &journal, "");

    let err = route.enter(Args::default()).await.unwrap_err();
    assert_eq!(err.failed_phase(), Some(Phase::Render));

    assert_eq!(
        journal.entries(),
        strings(&[
            "on_before_enter []",
            "before:enter",
            "on_before_fetch []",
            "before:fetch",
            "fetch() []",
            "on_fetch []",
            "fetch",
            "on_before_render []",
            "before:render",
            "render() []",
            "on_error render failed: FooError",
            "error",
            "on_error_enter render failed: FooError",
            "error:enter",
        ])
    );
    assert!(!journal.contains("enter"));
}

#[tokio::test]
async fn test_exit_without_enter_releases_listeners() {
    let journal = Journal::new();
    let route = Route::new("inbox", Recording::new(&journal));
    watch(&route, &journal, "");

    route.exit().await.unwrap();

    assert_eq!(
        journal.entries(),
        strings(&[
            "on_before_exit",
            "before:exit",
            "on_before_destroy",
            "before:destroy",
            "destroy()",
            "on_destroy",
            "destroy",
            "on_exit",
            "exit",
        ])
    );
    assert_eq!(route.events().listener_count(), 0);
    assert!(!route.is_exiting());
}

#[tokio::test]
async fn test_destroy_failure_still_releases_listeners() {
    let journal = Journal::new();
    let route = Route::new("inbox", Recording::new(&journal).failing_destroy("FooError"));
    watch(&route, &journal, "");

    let err = route.exit().await.unwrap_err();
    assert_eq!(err.failed_phase(), Some(Phase::Destroy));

    assert_eq!(
        journal.entries(),
        strings(&[
            "on_before_exit",
            "before:exit",
            "on_before_destroy",
            "before:destroy",
            "destroy()",
            "on_error destroy failed: FooError",
            "error",
            "on_error_exit destroy failed: FooError",
            "error:exit",
        ])
    );
    assert_eq!(route.events().listener_count(), 0);
    assert!(!route.is_exiting());
}

#[tokio::test]
async fn test_entering_flag_window() {
    let route = Route::new("inbox", Recording::default());
    let observed = Arc::new(Mutex::new(Vec::new()));

    for event in [
        RouteEvent::BeforeEnter,
        RouteEvent::BeforeFetch,
        RouteEvent::BeforeRender,
        RouteEvent::Render,
        RouteEvent::Enter,
    ] {
        let observed = observed.clone();
        route.events().on(RouteTopic::Phase(event), move |emission| {
            observed
                .lock()
                .unwrap()
                .push((emission.topic.event(), emission.route.is_entering()));
        });
    }

    assert!(!route.is_entering());
    route.enter(Args::default()).await.unwrap();
    assert!(!route.is_entering());

    assert_eq!(
        *observed.lock().unwrap(),
        vec![
            (RouteEvent::BeforeEnter, true),
            (RouteEvent::BeforeFetch, true),
            (RouteEvent::BeforeRender, true),
            (RouteEvent::Render, false),
            (RouteEvent::Enter, false),
        ]
    );
}

#[tokio::test]
async fn test_exiting_flag_window() {
    let route = Route::new("inbox", Recording::default());
    let during = Arc::new(AtomicBool::new(false));
    let after = Arc::new(AtomicBool::new(true));

    let flag = during.clone();
    route
        .events()
        .on(RouteTopic::Phase(RouteEvent::BeforeDestroy), move |emission| {
            flag.store(emission.route.is_exiting(), Ordering::SeqCst);
        });
    let flag = after.clone();
    route
        .events()
        .on(RouteTopic::Phase(RouteEvent::Exit), move |emission| {
            flag.store(emission.route.is_exiting(), Ordering::SeqCst);
        });

    route.exit().await.unwrap();
    assert!(during.load(Ordering::SeqCst));
    assert!(!after.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_cancel_before_fetch_checkpoint() {
    let journal = Journal::new();
    let route = Route::new("thread", Recording::new(&journal));
    watch(&route, &journal, "");

    let (entered, cancelled) = futures_util::join!(route.enter(Args::default()), async {
        // enter() is parked at its scheduling yield, before the fetch checkpoint.
        let pending = route.cancel().expect("route is entering");
        pending.await
    });

    assert!(entered.is_ok());
    assert!(cancelled.is_ok());
    assert!(route.is_cancelled());
    assert!(!route.is_entering());

    assert!(journal.contains("on_before_cancel"));
    assert!(journal.contains("on_cancel"));
    assert!(journal.contains("cancel"));
    assert!(!journal.contains("fetch() []"));
    assert!(!journal.contains("render() []"));
    assert!(!journal.contains("enter"));
    assert!(journal.index_of("before:cancel") < journal.index_of("cancel"));
}

#[tokio::test]
async fn test_cancel_during_fetch_skips_render() {
    let journal = Journal::new();
    let gate = Gate::new();
    let route = Route::new("thread", Recording::new(&journal).fetch_gate(&gate));
    watch(&route, &journal, "");

    let (entered, cancelled) = futures_util::join!(route.enter(Args::default()), async {
        gate.wait_started().await;
        let pending = route.cancel().expect("route is entering");
        gate.release();
        pending.await
    });

    assert!(entered.is_ok());
    assert!(cancelled.is_ok());
    // Cooperative: fetch completes, the render checkpoint takes the cancel branch.
    assert!(journal.contains("on_fetch []"));
    assert!(!journal.contains("render() []"));
    assert!(journal.contains("cancel"));
}

#[tokio::test]
async fn test_cancel_after_render_checkpoint_is_rejected() {
    let journal = Journal::new();
    let gate = Gate::new();
    let route = Route::new("thread", Recording::new(&journal).render_gate(&gate));
    watch(&route, &journal, "");

    let (entered, cancelled) = futures_util::join!(route.enter(Args::default()), async {
        gate.wait_started().await;
        let pending = route.cancel().expect("route is entering");
        gate.release();
        pending.await
    });

    assert!(entered.is_ok());
    assert!(matches!(cancelled, Err(CancelError::Entered)));
    assert!(journal.contains("render() []"));
    assert!(journal.contains("enter"));
    assert!(!journal.contains("cancel"));
    assert!(route.is_cancelled());
}

#[tokio::test]
async fn test_cancel_rejected_when_render_fails() {
    let gate = Gate::new();
    let route = Route::new(
        "thread",
        Recording::default().render_gate(&gate).failing_render("FooError"),
    );

    let (entered, cancelled) = futures_util::join!(route.enter(Args::default()), async {
        gate.wait_started().await;
        let pending = route.cancel().expect("route is entering");
        gate.release();
        pending.await
    });

    assert!(entered.is_err());
    match cancelled {
        Err(CancelError::Failed(err)) => assert_eq!(err.failed_phase(), Some(Phase::Render)),
        other => panic!("unexpected cancellation outcome: {:?}", other),
    }
}

#[tokio::test]
async fn test_cancel_when_idle_is_a_noop() {
    let journal = Journal::new();
    let route = Route::new("thread", Recording::new(&journal));
    watch(&route, &journal, "");

    assert!(route.cancel().is_none());
    route.enter(Args::default()).await.unwrap();
    assert!(route.cancel().is_none());

    assert!(!route.is_cancelled());
    assert!(!journal.contains("before:cancel"));
}

#[tokio::test]
async fn test_exit_while_entering_cancels_first() {
    let journal = Journal::new();
    let gate = Gate::new();
    let route = Route::new("thread", Recording::new(&journal).fetch_gate(&gate));
    watch(&route, &journal, "");

    let (entered, exited) = futures_util::join!(route.enter(Args::default()), async {
        gate.wait_started().await;
        let exiting = route.exit();
        gate.release();
        exiting.await
    });

    assert!(entered.is_ok());
    assert!(exited.is_ok());
    assert!(!journal.contains("render() []"));

    let cancel = journal.index_of("cancel");
    assert!(journal.index_of("before:cancel") < cancel);
    assert!(cancel < journal.index_of("before:exit"));
    assert!(journal.index_of("before:exit") < journal.index_of("exit"));
}

#[tokio::test]
async fn test_abort_policy_drops_in_flight_fetch() {
    let journal = Journal::new();
    let gate = Gate::new();
    let route = Route::with_policy(
        "thread",
        Recording::new(&journal).fetch_gate(&gate),
        LifecyclePolicy::default().with_abort_on_cancel(true),
    );
    watch(&route, &journal, "");

    // The gate is never released: only the abort policy can settle enter().
    let (entered, exited) = futures_util::join!(route.enter(Args::default()), async {
        gate.wait_started().await;
        route.exit().await
    });

    assert!(entered.is_ok());
    assert!(exited.is_ok());
    assert!(journal.contains("fetch() []"));
    assert!(!journal.contains("on_fetch []"));
    assert!(journal.index_of("cancel") < journal.index_of("exit"));
}

#[tokio::test]
async fn test_phase_timeout_fails_through_error_path() {
    let journal = Journal::new();
    let route = Route::with_policy(
        "slow",
        Recording::new(&journal).fetch_delay(Duration::from_millis(500)),
        LifecyclePolicy::default().with_phase_timeout(Duration::from_millis(20)),
    );
    watch(&route, &journal, "");

    let err = route.enter(Args::default()).await.unwrap_err();
    assert!(matches!(
        err,
        RoutingError::Timeout {
            phase: Phase::Fetch,
            ..
        }
    ));
    assert!(journal.contains("error:enter"));
    assert!(!journal.contains("render() []"));
}
