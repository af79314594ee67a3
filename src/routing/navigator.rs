//! Navigation coordinator holding the current route.
//!
//! # Responsibilities
//! - Own the single "current target" slot of a navigation area
//! - Give the sequencing step exclusive access to that slot
//! - Share the history service with every router of the area

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::lifecycle::Route;
use crate::routing::history::History;
use crate::routing::router::Target;

/// Shared context for all routers of one navigation area.
#[derive(Debug)]
pub struct Navigator {
    history: Arc<History>,
    current: Mutex<Option<Target>>,
}

impl Navigator {
    pub fn new(history: Arc<History>) -> Self {
        Self {
            history,
            current: Mutex::new(None),
        }
    }

    pub fn history(&self) -> &Arc<History> {
        &self.history
    }

    /// Route stored by the latest completed sequencing step, if it was a route.
    ///
    /// Waits while a navigation is exiting the previous route.
    pub async fn current_route(&self) -> Option<Route> {
        match self.current.lock().await.as_ref() {
            Some(Target::Route(route)) => Some(route.clone()),
            _ => None,
        }
    }

    pub(crate) async fn lock_current(&self) -> MutexGuard<'_, Option<Target>> {
        self.current.lock().await
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(Arc::new(History::new()))
    }
}
