use std::sync::Arc;

use tracing::debug;

use crate::models::PaymentRecord;
use crate::storage::{Storage, StorageError, PAYMENTS_KEY};

/// Keeps a copy of the last payment list in storage.
///
/// The copy is written after every successful fetch and never read back
/// by the portal itself.
pub struct PaymentCache {
    storage: Arc<dyn Storage>,
}

impl PaymentCache {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Replace the cached list with `payments`
    pub fn save_payments(&mut self, payments: &[PaymentRecord]) -> Result<(), StorageError> {
        let contents = serde_json::to_string(payments)?;
        self.storage.set_item(PAYMENTS_KEY, &contents)?;
        debug!(count = payments.len(), "Cached payment list");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
