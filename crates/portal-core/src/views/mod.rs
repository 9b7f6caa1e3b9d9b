//! UI-independent view models.
//!
//! - `LoginForm`: credential entry, single-attempt submission, messages
//! - `Dashboard`: payment list, selection, confirm-then-process flow
//!
//! Both consult the `AuthGate` rather than reading the session store.

pub mod dashboard;
pub mod login;

pub use dashboard::{Dashboard, DashboardEvent};
pub use login::{LoginForm, LoginOutcome};
