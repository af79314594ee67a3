//! Navigation history service.
//!
//! # Responsibilities
//! - Announce which router handled the latest navigation
//! - Collect navigation errors forwarded by routers
//!
//! # Design Decisions
//! - Routers subscribe once, when constructed, and unsubscribe on drop
//! - Announcements are synchronous: after `announce` returns every live
//!   router has updated its active flag

use std::sync::Mutex;

use crate::events::{Event, EventEmitter};
use crate::lifecycle::RoutingError;
use crate::routing::router::{Router, RouterId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryTopic {
    Route,
    Error,
}

/// Notification published by the history service.
#[derive(Debug, Clone)]
pub enum HistoryEmission {
    /// `router` handled the latest navigation.
    Route { router: RouterId },
    /// `router` failed to execute a navigation.
    Error { router: RouterId, error: RoutingError },
}

impl Event for HistoryEmission {
    type Topic = HistoryTopic;

    fn topic(&self) -> HistoryTopic {
        match self {
            HistoryEmission::Route { .. } => HistoryTopic::Route,
            HistoryEmission::Error { .. } => HistoryTopic::Error,
        }
    }
}

/// Broadcasts route changes and receives navigation errors.
#[derive(Debug, Default)]
pub struct History {
    events: EventEmitter<HistoryEmission>,
    active: Mutex<Option<RouterId>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &EventEmitter<HistoryEmission> {
        &self.events
    }

    /// Announce `router` as the one that handled the latest navigation.
    pub fn announce(&self, router: &Router) {
        self.announce_id(router.id());
    }

    pub fn announce_id(&self, router: RouterId) {
        *self.active.lock().expect("history mutex poisoned") = Some(router);
        tracing::debug!(router = %router, "Active router changed");
        self.events.emit(&HistoryEmission::Route { router });
    }

    /// Last router announced, if any.
    pub fn active_router(&self) -> Option<RouterId> {
        *self.active.lock().expect("history mutex poisoned")
    }

    /// Error channel used by routers for failures they could not handle.
    pub fn report_error(&self, router: &Router, error: RoutingError) {
        self.events.emit(&HistoryEmission::Error {
            router: router.id(),
            error,
        });
    }
}
