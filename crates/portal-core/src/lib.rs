//! Core library for the employee payment portal.
//!
//! Everything here is independent of how the portal is drawn:
//! session storage and the auth gate, route protection, idle logout, the
//! backend API client, and the login/dashboard view models.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod inactivity;
pub mod models;
pub mod routing;
pub mod storage;
pub mod utils;
pub mod views;
