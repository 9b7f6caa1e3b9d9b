//! Data models for portal entities.
//!
//! - `PaymentRecord`, `PaymentId`: rows of the payment dashboard

pub mod payment;

pub use payment::{PaymentId, PaymentRecord};
