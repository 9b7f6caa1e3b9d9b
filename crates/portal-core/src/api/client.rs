//! API client for the payment backend REST API.
//!
//! This module provides the `PortalClient` struct for logging in and for
//! making authenticated payment requests.

use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use reqwest::{header, Client};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use super::{ApiError, Authenticator, PaymentService};
use crate::auth::{Credentials, Session};
use crate::models::{PaymentId, PaymentRecord};

// ============================================================================
// Constants
// ============================================================================

/// Default base URL of the backend
pub const DEFAULT_BASE_URL: &str = "https://backend-payment-system-hjco.onrender.com";

/// Default HTTP request timeout in seconds.
/// The backend sleeps when idle, so the first call can be slow.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/auth/employee/login";
const LIST_PAYMENTS_PATH: &str = "/api/payments/getAll";
const PROCESS_PAYMENT_PATH: &str = "/api/payments/processPayment";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    full_name: String,
    email: String,
}

/// API client for the payment backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
}

impl PortalClient {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, token: &str) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(url, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    /// Log in and return the new session
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        let url = self.url(LOGIN_PATH);
        debug!(email = %credentials.email, "Sending login request");

        let response = self
            .client
            .post(&url)
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(ApiError::from_login_status(status, &body));
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed login response: {}", e)))?;

        if login.token.is_empty() {
            return Err(ApiError::InvalidResponse(
                "Login response carried no token".to_string(),
            ));
        }

        Ok(Session {
            token: login.token,
            display_name: login.full_name,
            email: login.email,
        })
    }

    /// Fetch every payment visible to the employee
    pub async fn fetch_payments(&self, token: &str) -> Result<Vec<PaymentRecord>, ApiError> {
        let payments: Vec<PaymentRecord> = self.get(&self.url(LIST_PAYMENTS_PATH), token).await?;
        debug!(count = payments.len(), "Fetched payments");
        Ok(payments)
    }

    /// Submit a single payment for processing
    pub async fn submit_payment(&self, id: &PaymentId, token: &str) -> Result<(), ApiError> {
        let url = format!("{}/{}", self.url(PROCESS_PAYMENT_PATH), id);
        debug!(payment_id = %id, "Submitting payment");

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .send()
            .await?;

        Self::check_response(response).await?;
        Ok(())
    }
}

impl Authenticator for PortalClient {
    fn authenticate<'a>(
        &'a self,
        credentials: &'a Credentials,
    ) -> BoxFuture<'a, Result<Session, ApiError>> {
        self.login(credentials).boxed()
    }
}

impl PaymentService for PortalClient {
    fn list_payments<'a>(
        &'a self,
        token: &'a str,
    ) -> BoxFuture<'a, Result<Vec<PaymentRecord>, ApiError>> {
        self.fetch_payments(token).boxed()
    }

    fn process_payment<'a>(
        &'a self,
        id: &'a PaymentId,
        token: &'a str,
    ) -> BoxFuture<'a, Result<(), ApiError>> {
        self.submit_payment(id, token).boxed()
    }
}
