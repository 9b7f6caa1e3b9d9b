use std::time::Duration;

use tracing::{error, info, warn};

use crate::api::ApiError;
#[cfg(test)]
use crate::api::Authenticator;
use crate::auth::{Credentials, Session, SessionStore};

/// Shown once the session has been stored
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful!";

/// Pause between the success message and the dashboard
pub const LOGIN_REDIRECT_DELAY: Duration = Duration::from_secs(2);

/// Maximum length for email input
const MAX_EMAIL_LENGTH: usize = 100;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Result of handing a login attempt to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Session stored; navigate to the dashboard
    Authenticated(Session),
    /// Service or storage failure; message is on the form
    Failed,
    /// Input rejected before contacting the service
    Invalid,
    /// A request is already in flight
    InProgress,
}

/// State of the login form.
///
/// Not `Debug`: it holds the password in clear.
#[derive(Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    error: Option<String>,
    success: Option<String>,
    submitting: bool,
}

impl LoginForm {
    pub fn new(email: String, password: String) -> Self {
        Self {
            email,
            password,
            ..Self::default()
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success(&self) -> Option<&str> {
        self.success.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Show a notice on the form, e.g. why the user was sent back here
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.success = None;
        self.error = Some(message.into());
    }

    /// Reset messages when the form is shown again
    pub fn reset_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    pub fn push_email_char(&mut self, c: char) {
        if can_add_email_char(self.email.chars().count(), c) {
            self.email.push(c);
        }
    }

    pub fn push_password_char(&mut self, c: char) {
        if can_add_password_char(self.password.chars().count(), c) {
            self.password.push(c);
        }
    }

    /// Validate the input and mark the form as submitting.
    ///
    /// Returns the credentials to send, or `Err` with the outcome to report.
    pub fn begin_submit(&mut self) -> Result<Credentials, LoginOutcome> {
        if self.submitting {
            return Err(LoginOutcome::InProgress);
        }
        let credentials = Credentials::new(self.email.trim(), self.password.clone());
        if let Err(message) = credentials.validate() {
            self.show_error(message);
            return Err(LoginOutcome::Invalid);
        }
        self.reset_messages();
        self.submitting = true;
        Ok(credentials)
    }

    /// Apply the service's answer.
    ///
    /// The session is stored before success is reported; on any failure the
    /// store is left untouched.
    pub fn complete(
        &mut self,
        result: Result<Session, ApiError>,
        store: &dyn SessionStore,
    ) -> LoginOutcome {
        self.submitting = false;
        match result {
            Ok(session) => {
                if let Err(e) = store.put(&session) {
                    error!(error = %e, "Failed to store session");
                    self.show_error("Unable to save your session. Please try again later.");
                    return LoginOutcome::Failed;
                }
                self.password.clear();
                self.error = None;
                self.success = Some(LOGIN_SUCCESS_MESSAGE.to_string());
                info!(email = %session.email, "Login successful");
                LoginOutcome::Authenticated(session)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.show_error(user_message(&e));
                LoginOutcome::Failed
            }
        }
    }

    /// Validate, call the service once, and apply the answer
    #[cfg(test)]
    pub(crate) async fn submit(
        &mut self,
        auth: &dyn Authenticator,
        store: &dyn SessionStore,
    ) -> LoginOutcome {
        match self.begin_submit() {
            Ok(credentials) => {
                let result = auth.authenticate(&credentials).await;
                self.complete(result, store)
            }
            Err(outcome) => outcome,
        }
    }
}

/// Translate an API failure into the message shown on the form
pub fn user_message(error: &ApiError) -> String {
    match error {
        ApiError::Rejected(message) => message.clone(),
        ApiError::Timeout => "Connection timed out. Please try again.".to_string(),
        ApiError::NetworkError(_) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        _ => "An error occurred. Please try again later.".to_string(),
    }
}

fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if an email character should be accepted
pub fn can_add_email_char(current_len: usize, c: char) -> bool {
    current_len < MAX_EMAIL_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}
