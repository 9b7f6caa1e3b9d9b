use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::Session;
use crate::storage::{
    MemoryStorage, Storage, StorageError, EMAIL_KEY, FULL_NAME_KEY, TOKEN_KEY,
};

/// Owner of the persisted session.
///
/// `get` never fails: an unreadable medium means "no session".
pub trait SessionStore: Send + Sync {
    /// Persist `session`, replacing any previous one
    fn put(&self, session: &Session) -> Result<(), StorageError>;

    /// The current session, if one is fully present
    fn get(&self) -> Option<Session>;

    /// Remove the session. Best-effort; failures are logged.
    fn clear(&self);
}

/// `SessionStore` over a key-value `Storage`.
///
/// Fields live under `token`, `fullName` and `emailAddress`. Writes put the
/// token last and clears remove it first, and all three operations hold a
/// store-wide lock, so no reader ever observes half a session.
pub struct StorageSessionStore {
    storage: Arc<dyn Storage>,
    lock: Mutex<()>,
}

impl StorageSessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            lock: Mutex::new(()),
        }
    }

    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    fn read(&self) -> Result<Option<Session>, StorageError> {
        let token = match self.storage.get_item(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };
        let display_name = self.storage.get_item(FULL_NAME_KEY)?;
        let email = self.storage.get_item(EMAIL_KEY)?;

        match (display_name, email) {
            (Some(display_name), Some(email)) => Ok(Some(Session {
                token,
                display_name,
                email,
            })),
            _ => {
                warn!("Stored session is incomplete, treating as logged out");
                Ok(None)
            }
        }
    }

    /// Token out first, token in last
    fn write(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.remove_item(TOKEN_KEY)?;
        self.storage.set_item(FULL_NAME_KEY, &session.display_name)?;
        self.storage.set_item(EMAIL_KEY, &session.email)?;
        self.storage.set_item(TOKEN_KEY, &session.token)
    }

    fn remove_all(&self) {
        for key in [TOKEN_KEY, FULL_NAME_KEY, EMAIL_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(error = %e, key, "Failed to remove session field");
            }
        }
    }
}

impl SessionStore for StorageSessionStore {
    fn put(&self, session: &Session) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = self.write(session) {
            // A failed write must not leave the previous token beside the new identity
            self.remove_all();
            return Err(e);
        }
        debug!(email = %session.email, "Session stored");
        Ok(())
    }

    fn get(&self) -> Option<Session> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        match self.read() {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "Session storage unreadable, treating as logged out");
                None
            }
        }
    }

    fn clear(&self) {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.remove_all();
        debug!("Session cleared");
    }
}
