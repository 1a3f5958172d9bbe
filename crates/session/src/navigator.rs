use std::sync::Mutex;

use crate::route::Route;

/// Navigation port used for hard redirects (logout → `/login`).
///
/// A hard redirect discards in-flight view state; implementations reload
/// the target view rather than transitioning softly.
pub trait Navigator: Send + Sync {
    fn hard_redirect(&self, route: Route);
}

/// Navigator that records every redirect. Backs headless portal runs and tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for HistoryNavigator {
    fn hard_redirect(&self, route: Route) {
        tracing::debug!(path = %route, "hard redirect");
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(route);
    }
}
