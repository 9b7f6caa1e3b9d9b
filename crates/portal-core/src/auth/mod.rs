//! Authentication module for managing the employee session.
//!
//! This module provides:
//! - `Session` / `Credentials`: the session record and login form input
//! - `SessionStore`: the injectable owner of the persisted session
//! - `AuthGate`: the predicate every protected decision goes through
//!
//! Sessions are persisted through `crate::storage` and last until logout,
//! inactivity timeout, or an authorization failure.

pub mod gate;
pub mod session;
pub mod store;

pub use gate::AuthGate;
pub use session::{Credentials, Session};
pub use store::{SessionStore, StorageSessionStore};
