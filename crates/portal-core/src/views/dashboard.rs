use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::api::ApiError;
#[cfg(test)]
use crate::api::PaymentService;
use crate::auth::{AuthGate, Session};
use crate::cache::PaymentCache;
use crate::models::{PaymentId, PaymentRecord};

pub const PROCESS_SUCCESS_MESSAGE: &str = "Payment submitted to SWIFT successfully.";

pub const PROCESS_FAILURE_MESSAGE: &str = "Failed to process payment.";

/// Pause after a successful submission before the list is reloaded
pub const REFRESH_AFTER_PROCESS_DELAY: Duration = Duration::from_millis(1500);

/// What the owner of the dashboard should do after applying a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardEvent {
    Updated,
    /// Reload the list after `REFRESH_AFTER_PROCESS_DELAY`
    RefreshDue,
    /// The backend no longer accepts the session
    SessionRejected,
}

/// State of the payment dashboard for one mounted session
#[derive(Debug)]
pub struct Dashboard {
    session: Session,
    payments: Vec<PaymentRecord>,
    selection: usize,
    pending_confirmation: Option<PaymentId>,
    processing: Option<PaymentId>,
    loading: bool,
    success_message: Option<String>,
    error_message: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Dashboard {
    /// Mount for the current session, or `None` when nobody is logged in
    pub fn mount(gate: &AuthGate) -> Option<Self> {
        let Some(session) = gate.current_session() else {
            warn!("Dashboard mount refused: not authenticated");
            return None;
        };
        debug!(email = %session.email, "Dashboard mounted");
        Some(Self {
            session,
            payments: Vec::new(),
            selection: 0,
            pending_confirmation: None,
            processing: None,
            loading: false,
            success_message: None,
            error_message: None,
            fetched_at: None,
        })
    }

    pub fn display_name(&self) -> &str {
        &self.session.display_name
    }

    pub fn email(&self) -> &str {
        &self.session.email
    }

    pub fn welcome(&self) -> String {
        format!("Welcome Employee: {}", self.session.display_name)
    }

    pub fn payments(&self) -> &[PaymentRecord] {
        &self.payments
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn selected(&self) -> Option<&PaymentRecord> {
        self.payments.get(self.selection)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn processing(&self) -> Option<&PaymentId> {
        self.processing.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<&PaymentId> {
        self.pending_confirmation.as_ref()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success_message.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    // ===== Selection =====

    pub fn select_next(&mut self) {
        if self.selection + 1 < self.payments.len() {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.payments.len().saturating_sub(1);
    }

    pub fn page_down(&mut self, size: usize) {
        self.selection = (self.selection + size).min(self.payments.len().saturating_sub(1));
    }

    pub fn page_up(&mut self, size: usize) {
        self.selection = self.selection.saturating_sub(size);
    }

    // ===== Loading =====

    /// Mark a fetch as started. Returns the token to use, asking the gate
    /// again so a session cleared since mount is never reused.
    pub fn begin_load(&mut self, gate: &AuthGate) -> Option<String> {
        let session = gate.current_session()?;
        self.loading = true;
        Some(session.token)
    }

    pub fn apply_payments(
        &mut self,
        result: Result<Vec<PaymentRecord>, ApiError>,
        cache: &mut PaymentCache,
    ) -> DashboardEvent {
        self.loading = false;
        match result {
            Ok(payments) => {
                if let Err(e) = cache.save_payments(&payments) {
                    warn!(error = %e, "Failed to cache payments");
                }
                self.payments = payments;
                if self.selection >= self.payments.len() {
                    self.selection = self.payments.len().saturating_sub(1);
                }
                self.fetched_at = Some(Utc::now());
                self.error_message = None;
                DashboardEvent::Updated
            }
            Err(e) if e.is_unauthorized() => DashboardEvent::SessionRejected,
            Err(e) => {
                warn!(error = %e, "Error fetching payments");
                self.error_message = Some(format!("Failed to fetch payments: {}", e));
                DashboardEvent::Updated
            }
        }
    }

    /// Fetch and apply in one step
    #[cfg(test)]
    pub(crate) async fn load(
        &mut self,
        gate: &AuthGate,
        service: &dyn PaymentService,
        cache: &mut PaymentCache,
    ) -> DashboardEvent {
        let Some(token) = self.begin_load(gate) else {
            return DashboardEvent::SessionRejected;
        };
        let result = service.list_payments(&token).await;
        self.apply_payments(result, cache)
    }

    // ===== Processing =====

    /// Ask for confirmation to process the selected payment
    pub fn request_process(&mut self) -> bool {
        if self.processing.is_some() {
            return false;
        }
        match self.selected() {
            Some(payment) => {
                self.pending_confirmation = Some(payment.id.clone());
                true
            }
            None => false,
        }
    }

    pub fn cancel_process(&mut self) {
        self.pending_confirmation = None;
    }

    /// Confirm the pending submission. Returns the id and token to submit.
    pub fn confirm_process(&mut self, gate: &AuthGate) -> Option<(PaymentId, String)> {
        let id = self.pending_confirmation.take()?;
        let session = gate.current_session()?;
        self.success_message = None;
        self.error_message = None;
        self.processing = Some(id.clone());
        Some((id, session.token))
    }

    pub fn apply_process_result(
        &mut self,
        id: &PaymentId,
        result: Result<(), ApiError>,
    ) -> DashboardEvent {
        if self.processing.as_ref() == Some(id) {
            self.processing = None;
        }
        match result {
            Ok(()) => {
                info!(payment_id = %id, "Payment submitted");
                self.success_message = Some(PROCESS_SUCCESS_MESSAGE.to_string());
                DashboardEvent::RefreshDue
            }
            Err(e) if e.is_unauthorized() => DashboardEvent::SessionRejected,
            Err(e) => {
                warn!(payment_id = %id, error = %e, "Error processing payment");
                self.error_message = Some(PROCESS_FAILURE_MESSAGE.to_string());
                DashboardEvent::Updated
            }
        }
    }

    /// Confirm and submit in one step
    #[cfg(test)]
    pub(crate) async fn process(
        &mut self,
        gate: &AuthGate,
        service: &dyn PaymentService,
    ) -> DashboardEvent {
        let Some((id, token)) = self.confirm_process(gate) else {
            return DashboardEvent::Updated;
        };
        let result = service.process_payment(&id, &token).await;
        self.apply_process_result(&id, result)
    }
}
