//! View routing with authentication enforcement.
//!
//! `RouteGuard` is a two-state machine (granted / denied) evaluated against
//! the `AuthGate` on every navigation. `Router` keeps the view history and
//! runs the guard on push, replace, back, and revalidation.

pub mod guard;
pub mod router;

pub use guard::{Access, Route, RouteGuard};
pub use router::{Navigation, Router};
