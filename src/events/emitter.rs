//! Typed publish/subscribe channel.
//!
//! # Responsibilities
//! - Register listeners for one topic, every topic, or a single delivery
//! - Deliver emissions synchronously in subscription order
//! - Release subscriptions individually or all at once

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A value that can be published on an [`EventEmitter`].
pub trait Event: Send + Sync + 'static {
    /// Discriminant listeners filter on.
    type Topic: Copy + Eq + fmt::Debug + Send + Sync + 'static;

    /// Topic of this emission.
    fn topic(&self) -> Self::Topic;
}

/// Handle returned by every subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Entry<E: Event> {
    id: SubscriptionId,
    /// `None` listens to every topic.
    topic: Option<E::Topic>,
    once: bool,
    listener: Listener<E>,
}

/// Synchronous, topic-filtered event emitter.
pub struct EventEmitter<E: Event> {
    next_id: AtomicU64,
    entries: Mutex<Vec<Entry<E>>>,
}

impl<E: Event> EventEmitter<E> {
    /// Create an emitter with no listeners.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Listen to every emission of `topic`.
    pub fn on<F>(&self, topic: E::Topic, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Some(topic), false, Arc::new(listener))
    }

    /// Listen to the next emission of `topic` only.
    pub fn once<F>(&self, topic: E::Topic, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(Some(topic), true, Arc::new(listener))
    }

    /// Listen to every emission regardless of topic.
    pub fn on_any<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.register(None, false, Arc::new(listener))
    }

    /// Remove one subscription. Returns false if it was already gone.
    pub fn off(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock().expect("event emitter mutex poisoned");
        let before = entries.len();
        entries.retain(|entry| entry.id != id);
        entries.len() != before
    }

    /// Remove every subscription.
    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("event emitter mutex poisoned")
            .clear();
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.entries.lock().expect("event emitter mutex poisoned").len()
    }

    /// Deliver `event` to every matching listener.
    ///
    /// Returns the number of listeners invoked.
    pub fn emit(&self, event: &E) -> usize {
        let topic = event.topic();
        let targets: Vec<Listener<E>> = {
            let mut entries = self.entries.lock().expect("event emitter mutex poisoned");
            let targets = entries
                .iter()
                .filter(|entry| entry.topic.map_or(true, |t| t == topic))
                .map(|entry| entry.listener.clone())
                .collect();
            entries.retain(|entry| !(entry.once && entry.topic == Some(topic)));
            targets
        };

        for listener in &targets {
            listener(event);
        }
        targets.len()
    }

    fn register(&self, topic: Option<E::Topic>, once: bool, listener: Listener<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .expect("event emitter mutex poisoned")
            .push(Entry {
                id,
                topic,
                once,
                listener,
            });
        id
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
