use crate::auth::AuthGate;

/// Views reachable in the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    /// Where unauthenticated navigation ends up
    pub const ENTRY: Route = Route::Login;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Dashboard => "/dashboard",
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

/// Guard verdict for a navigation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
}

/// Enforcement point for protected routes.
///
/// Holds no state of its own: every evaluation asks the gate again.
#[derive(Clone)]
pub struct RouteGuard {
    gate: AuthGate,
}

impl RouteGuard {
    pub fn new(gate: AuthGate) -> Self {
        Self { gate }
    }

    pub fn evaluate(&self, route: Route) -> Access {
        if !route.is_protected() || self.gate.is_authenticated() {
            Access::Granted
        } else {
            Access::Denied
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::{Session, SessionStore, StorageSessionStore};

    fn guard() -> (Arc<StorageSessionStore>, RouteGuard) {
        let store = Arc::new(StorageSessionStore::in_memory());
        let guard = RouteGuard::new(AuthGate::new(store.clone()));
        (store, guard)
    }

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Dashboard.path(), "/dashboard");
        assert_eq!(Route::ENTRY, Route::Login);
    }

    #[test]
    fn test_public_route_always_granted() {
        let (store, guard) = guard();
        assert_eq!(guard.evaluate(Route::Login), Access::Granted);
        store.put(&Session::new("tok1", "A B", "a@b.com")).unwrap();
        assert_eq!(guard.evaluate(Route::Login), Access::Granted);
    }

    #[test]
    fn test_protected_route_follows_gate() {
        let (store, guard) = guard();
        assert_eq!(guard.evaluate(Route::Dashboard), Access::Denied);

        store.put(&Session::new("tok1", "A B", "a@b.com")).unwrap();
        assert_eq!(guard.evaluate(Route::Dashboard), Access::Granted);

        store.clear();
        assert_eq!(guard.evaluate(Route::Dashboard), Access::Denied);
    }

    #[test]
    fn test_denied_for_every_unauthenticated_history() {
        // Whatever happened before, no session means no dashboard
        let histories: [&[Option<&str>]; 4] = [
            &[],
            &[Some("tok1"), None],
            &[Some("a"), Some("b"), None],
            &[Some("")],
        ];
        for history in histories {
            let (store, guard) = guard();
            for step in history {
                match step {
                    Some(token) => store.put(&Session::new(*token, "A B", "a@b.com")).unwrap(),
                    None => store.clear(),
                }
            }
            assert_eq!(guard.evaluate(Route::Dashboard), Access::Denied);
        }
    }
}
