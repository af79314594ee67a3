//! Cooperative cancellation of an in-flight route entry.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use thiserror::Error;
use tokio::sync::{oneshot, watch};

use crate::lifecycle::error::RoutingError;

/// One-way cancellation flag shared by a route and whoever cancels it.
///
/// Once cancelled it stays cancelled.
#[derive(Debug)]
pub struct CancellationToken {
    tx: watch::Sender<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Set the flag and wake every task waiting in [`cancelled`](Self::cancelled).
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a cancellation request did not take effect.
#[derive(Debug, Clone, Error)]
pub enum CancelError {
    /// Render had already started; the route finished entering.
    #[error("route entered before the cancellation took effect")]
    Entered,

    /// The route failed before the cancellation took effect.
    #[error("route failed before the cancellation took effect: {0}")]
    Failed(RoutingError),

    /// The route released its listeners without settling the request.
    #[error("route released the cancellation request")]
    Released,
}

/// Settles when the route either emits `cancel` or wins the race by
/// emitting `enter` / `error` first.
#[derive(Debug)]
pub struct PendingCancel {
    rx: oneshot::Receiver<Result<(), CancelError>>,
}

impl PendingCancel {
    pub(crate) fn new(rx: oneshot::Receiver<Result<(), CancelError>>) -> Self {
        Self { rx }
    }
}

impl Future for PendingCancel {
    type Output = Result<(), CancelError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|settled| settled.unwrap_or(Err(CancelError::Released)))
    }
}
