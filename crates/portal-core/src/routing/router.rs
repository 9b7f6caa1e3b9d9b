use tracing::{debug, info};

use super::{Access, Route, RouteGuard};

/// Result of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The requested route is now current
    Rendered(Route),
    /// The guard denied `from`; the entry route replaced it in history
    Redirected { from: Route, to: Route },
}

impl Navigation {
    /// Route now on top of history
    pub fn current(&self) -> Route {
        match self {
            Navigation::Rendered(route) => *route,
            Navigation::Redirected { to, .. } => *to,
        }
    }
}

/// History-keeping navigator with the guard on every transition.
pub struct Router {
    guard: RouteGuard,
    history: Vec<Route>,
}

impl Router {
    /// Start on the entry route
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            guard,
            history: vec![Route::ENTRY],
        }
    }

    pub fn current(&self) -> Route {
        // History always holds at least the entry route
        self.history.last().copied().unwrap_or(Route::ENTRY)
    }

    pub fn history(&self) -> &[Route] {
        &self.history
    }

    /// Push `route` onto history, subject to the guard.
    ///
    /// Returning to the entry route unwinds history to its earliest entry.
    pub fn navigate(&mut self, route: Route) -> Navigation {
        debug!(path = route.path(), "Navigating");
        match self.history.iter().position(|r| *r == Route::ENTRY) {
            Some(pos) if route == Route::ENTRY => self.history.truncate(pos + 1),
            _ => self.history.push(route),
        }
        self.settle()
    }

    /// Replace the current entry with `route`, subject to the guard
    pub fn replace(&mut self, route: Route) -> Navigation {
        debug!(path = route.path(), "Replacing current route");
        self.history.pop();
        self.history.push(route);
        self.settle()
    }

    /// Go back one entry. Returns `None` when already at the oldest entry.
    pub fn back(&mut self) -> Option<Navigation> {
        if self.history.len() <= 1 {
            return None;
        }
        self.history.pop();
        Some(self.settle())
    }

    /// Re-check the current entry, e.g. after the session changed underneath
    pub fn revalidate(&mut self) -> Navigation {
        self.settle()
    }

    /// Evaluate the top of history, swapping a denied entry for the entry route
    fn settle(&mut self) -> Navigation {
        let route = self.current();
        match self.guard.evaluate(route) {
            Access::Granted => Navigation::Rendered(route),
            Access::Denied => {
                info!(path = route.path(), "Access denied, redirecting to login");
                self.history.pop();
                if self.history.last() != Some(&Route::ENTRY) {
                    self.history.push(Route::ENTRY);
                }
                Navigation::Redirected {
                    from: route,
                    to: Route::ENTRY,
                }
            }
        }
    }
}
