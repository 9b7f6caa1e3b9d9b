use std::sync::Arc;

use super::{Session, SessionStore};

/// The single answer to "is someone logged in?".
///
/// Every view and the route guard ask this type instead of inspecting the
/// store themselves. Clone is cheap.
#[derive(Clone)]
pub struct AuthGate {
    store: Arc<dyn SessionStore>,
}

impl AuthGate {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The current session, if it carries a token
    pub fn current_session(&self) -> Option<Session> {
        self.store.get().filter(Session::has_token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }
}
