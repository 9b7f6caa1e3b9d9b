//! REST API client module for the payment backend.
//!
//! This module provides the `PortalClient` for the Authentication Service
//! and the Payment Service, plus the `Authenticator` and `PaymentService`
//! traits the views depend on so tests can substitute fakes.
//!
//! The backend issues a bearer token at login; payment calls carry it in
//! the `Authorization` header.

pub mod client;
pub mod error;

pub use client::PortalClient;
pub use error::ApiError;

use futures::future::BoxFuture;

use crate::auth::{Credentials, Session};
use crate::models::{PaymentId, PaymentRecord};

/// Exchanges credentials for a session
pub trait Authenticator: Send + Sync {
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<Session, ApiError>>;
}

/// Lists and submits payments on behalf of an authenticated employee
pub trait PaymentService: Send + Sync {
    fn list_payments<'a>(&'a self, token: &'a str)
        -> BoxFuture<'a, Result<Vec<PaymentRecord>, ApiError>>;

    fn process_payment<'a>(
        &'a self,
        id: &'a PaymentId,
        token: &'a str,
    ) -> BoxFuture<'a, Result<(), ApiError>>;
}
