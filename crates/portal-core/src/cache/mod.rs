//! Local caching of fetched payment data.
//!
//! The last payment list is kept in storage under the `payments` key as a
//! JSON array.

pub mod manager;

pub use manager::PaymentCache;
