//! Application state management for the portal terminal client.
//!
//! This module contains the `App` struct that owns the session store, the
//! router, the view models and the inactivity monitor, and coordinates the
//! background tasks that talk to the backend.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use portal_core::api::{ApiError, Authenticator, PaymentService, PortalClient};
use portal_core::auth::{AuthGate, Session, SessionStore, StorageSessionStore};
use portal_core::cache::PaymentCache;
use portal_core::config::Config;
use portal_core::inactivity::{ActivitySignal, InactivityMonitor};
use portal_core::models::{PaymentId, PaymentRecord};
use portal_core::routing::{Navigation, Route, RouteGuard, Router};
use portal_core::storage::{FileStorage, MemoryStorage, Storage};
use portal_core::views::dashboard::REFRESH_AFTER_PROCESS_DELAY;
use portal_core::views::login::LOGIN_REDIRECT_DELAY;
use portal_core::views::{Dashboard, DashboardEvent, LoginForm, LoginOutcome};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of rows to move on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

const IDLE_LOGOUT_MESSAGE: &str = "You were logged out due to inactivity.";

const SESSION_REJECTED_MESSAGE: &str = "Your session has expired. Please log in again.";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingProcess,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Email,
    Password,
    Button,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks.
///
/// Dashboard results carry the mount generation they were started under;
/// anything from an earlier mount is discarded.
enum BackgroundResult {
    Login(Result<Session, ApiError>),
    Payments {
        generation: u64,
        result: Result<Vec<PaymentRecord>, ApiError>,
    },
    PaymentProcessed {
        generation: u64,
        id: PaymentId,
        result: Result<(), ApiError>,
    },
    IdleTimeout {
        generation: u64,
    },
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    store: Arc<dyn SessionStore>,
    gate: AuthGate,
    router: Router,
    auth: Arc<dyn Authenticator>,
    payments_api: Arc<dyn PaymentService>,
    cache: PaymentCache,
    save_config: bool,

    // UI State
    pub state: AppState,
    pub login: LoginForm,
    pub login_focus: LoginFocus,
    pub dashboard: Option<Dashboard>,
    pub status_message: Option<String>,

    monitor: Option<InactivityMonitor>,
    generation: u64,
    pending_redirect: Option<Instant>,
    pending_refresh: Option<Instant>,

    // Background task channel
    result_rx: mpsc::Receiver<BackgroundResult>,
    result_tx: mpsc::Sender<BackgroundResult>,
}

impl App {
    /// Create the application against the configured backend and storage
    pub fn new(config: Config) -> Result<Self> {
        let storage: Arc<dyn Storage> = if config.persist_session {
            let dir = config.cache_dir()?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            debug!(?dir, "Using file storage");
            Arc::new(FileStorage::new(&dir))
        } else {
            debug!("Using in-memory storage");
            Arc::new(MemoryStorage::new())
        };

        let client = Arc::new(
            PortalClient::new(&config.api_base_url, config.request_timeout())
                .context("Failed to build HTTP client")?,
        );
        info!(base_url = client.base_url(), "API client ready");

        let mut app = Self::with_services(config, storage, client.clone(), client);
        app.save_config = true;

        // Env vars take precedence over the remembered email
        if let Ok(email) = std::env::var("PORTAL_EMAIL") {
            app.login.email = email;
        }
        if let Ok(password) = std::env::var("PORTAL_PASSWORD") {
            app.login.password = password;
        }
        Ok(app)
    }

    /// Create the application with explicit storage and services
    pub fn with_services(
        config: Config,
        storage: Arc<dyn Storage>,
        auth: Arc<dyn Authenticator>,
        payments_api: Arc<dyn PaymentService>,
    ) -> Self {
        let store: Arc<dyn SessionStore> = Arc::new(StorageSessionStore::new(storage.clone()));
        let gate = AuthGate::new(store.clone());
        let router = Router::new(RouteGuard::new(gate.clone()));
        let (result_tx, result_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let email = config.last_email.clone().unwrap_or_default();

        Self {
            config,
            store,
            gate,
            router,
            auth,
            payments_api,
            cache: PaymentCache::new(storage),
            save_config: false,

            state: AppState::Normal,
            login: LoginForm::new(email, String::new()),
            login_focus: LoginFocus::Email,
            dashboard: None,
            status_message: None,

            monitor: None,
            generation: 0,
            pending_redirect: None,
            pending_refresh: None,

            result_rx,
            result_tx,
        }
    }

    /// Mount the entry view
    pub fn start(&mut self) {
        let nav = self.router.revalidate();
        self.on_navigation(nav);
    }

    pub fn current_route(&self) -> Route {
        self.router.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.gate.is_authenticated()
    }

    pub fn monitor(&self) -> Option<&InactivityMonitor> {
        self.monitor.as_ref()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn navigate(&mut self, route: Route) {
        let nav = self.router.navigate(route);
        self.on_navigation(nav);
    }

    fn on_navigation(&mut self, nav: Navigation) {
        match nav.current() {
            Route::Login => self.mount_login(),
            Route::Dashboard => self.mount_dashboard(),
        }
    }

    fn mount_login(&mut self) {
        self.unmount_dashboard();

        if self.gate.is_authenticated() {
            debug!("Already authenticated, skipping login");
            let nav = self.router.navigate(Route::Dashboard);
            if nav.current() == Route::Dashboard {
                self.mount_dashboard();
            }
            return;
        }

        self.login_focus = if self.login.email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
    }

    fn mount_dashboard(&mut self) {
        if self.dashboard.is_some() {
            return;
        }
        let Some(dashboard) = Dashboard::mount(&self.gate) else {
            self.enforce_guard();
            return;
        };

        self.generation += 1;
        self.dashboard = Some(dashboard);
        self.login.reset_messages();
        self.start_monitor();
        self.refresh_payments();
    }

    fn unmount_dashboard(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.stop();
        }
        if self.dashboard.take().is_some() {
            debug!("Dashboard unmounted");
        }
        self.generation += 1;
        self.pending_refresh = None;
        // Dashboard overlays must not follow the user to the login view
        if self.state != AppState::Quitting {
            self.state = AppState::Normal;
        }
    }

    /// Re-run the guard on the current route and follow any redirect
    fn enforce_guard(&mut self) {
        let nav = self.router.revalidate();
        if let Navigation::Redirected { from, .. } = nav {
            debug!(path = from.path(), "Guard redirected");
            self.on_navigation(nav);
        }
    }

    fn start_monitor(&mut self) {
        let tx = self.result_tx.clone();
        let generation = self.generation;
        let monitor = InactivityMonitor::start(
            self.config.inactivity(),
            self.store.clone(),
            move || {
                // The guard check on the next tick redirects even if this is lost
                if let Err(e) = tx.try_send(BackgroundResult::IdleTimeout { generation }) {
                    warn!(error = %e, "Failed to report idle timeout");
                }
            },
        );
        self.monitor = Some(monitor);
    }

    /// Report user activity to the inactivity monitor
    pub fn record_activity(&mut self, signal: ActivitySignal) {
        if let Some(ref monitor) = self.monitor {
            monitor.record(signal);
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Submit the login form in the background
    pub fn submit_login(&mut self) {
        let credentials = match self.login.begin_submit() {
            Ok(credentials) => credentials,
            Err(outcome) => {
                debug!(?outcome, "Login not submitted");
                return;
            }
        };

        let auth = self.auth.clone();
        let tx = self.result_tx.clone();
        tokio::spawn(async move {
            let result = auth.authenticate(&credentials).await;
            Self::send_result(&tx, BackgroundResult::Login(result)).await;
        });
    }

    /// End the session and return to the login view
    pub fn logout(&mut self) {
        info!("Logging out");
        self.store.clear();
        self.status_message = None;
        self.navigate(Route::Login);
    }

    // =========================================================================
    // Payments
    // =========================================================================

    /// Fetch the payment list in the background
    pub fn refresh_payments(&mut self) {
        let Some(ref mut dashboard) = self.dashboard else {
            return;
        };
        let Some(token) = dashboard.begin_load(&self.gate) else {
            self.enforce_guard();
            return;
        };

        let api = self.payments_api.clone();
        let tx = self.result_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = api.list_payments(&token).await;
            Self::send_result(&tx, BackgroundResult::Payments { generation, result }).await;
        });
    }

    /// Ask to process the selected payment
    pub fn request_process(&mut self) {
        if let Some(ref mut dashboard) = self.dashboard {
            if dashboard.request_process() {
                self.state = AppState::ConfirmingProcess;
            }
        }
    }

    pub fn cancel_process(&mut self) {
        if let Some(ref mut dashboard) = self.dashboard {
            dashboard.cancel_process();
        }
        self.state = AppState::Normal;
    }

    /// Submit the confirmed payment in the background
    pub fn confirm_process(&mut self) {
        self.state = AppState::Normal;
        let Some(ref mut dashboard) = self.dashboard else {
            return;
        };
        let Some((id, token)) = dashboard.confirm_process(&self.gate) else {
            self.enforce_guard();
            return;
        };

        let api = self.payments_api.clone();
        let tx = self.result_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = api.process_payment(&id, &token).await;
            Self::send_result(
                &tx,
                BackgroundResult::PaymentProcessed {
                    generation,
                    id,
                    result,
                },
            )
            .await;
        });
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    async fn send_result(tx: &mpsc::Sender<BackgroundResult>, result: BackgroundResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send background result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub async fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_background_result(result);
        }
    }

    fn process_background_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Login(result) => {
                if let LoginOutcome::Authenticated(session) =
                    self.login.complete(result, self.store.as_ref())
                {
                    self.remember_email(&session.email);
                    self.status_message = None;
                    self.pending_redirect = Some(Instant::now() + LOGIN_REDIRECT_DELAY);
                }
            }
            BackgroundResult::Payments { generation, result } => {
                if generation != self.generation {
                    debug!(generation, "Discarding stale payment list");
                    return;
                }
                if let Some(ref mut dashboard) = self.dashboard {
                    let event = dashboard.apply_payments(result, &mut self.cache);
                    self.handle_dashboard_event(event);
                }
            }
            BackgroundResult::PaymentProcessed {
                generation,
                id,
                result,
            } => {
                if generation != self.generation {
                    debug!(generation, payment_id = %id, "Discarding stale process result");
                    return;
                }
                if let Some(ref mut dashboard) = self.dashboard {
                    let event = dashboard.apply_process_result(&id, result);
                    self.handle_dashboard_event(event);
                }
            }
            BackgroundResult::IdleTimeout { generation } => {
                if generation != self.generation {
                    return;
                }
                self.show_idle_logout();
                self.enforce_guard();
            }
        }
    }

    fn show_idle_logout(&mut self) {
        self.status_message = Some(IDLE_LOGOUT_MESSAGE.to_string());
        self.login.show_error(IDLE_LOGOUT_MESSAGE);
    }

    /// Whether the session vanished because the idle deadline passed
    fn expired_while_idle(&self) -> bool {
        self.monitor
            .as_ref()
            .is_some_and(|m| m.has_expired() || m.remaining().is_zero())
            && !self.gate.is_authenticated()
    }

    fn handle_dashboard_event(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Updated => {}
            DashboardEvent::RefreshDue => {
                self.pending_refresh = Some(Instant::now() + REFRESH_AFTER_PROCESS_DELAY);
            }
            DashboardEvent::SessionRejected => {
                warn!("Backend rejected the session");
                self.store.clear();
                self.login.show_error(SESSION_REJECTED_MESSAGE);
                self.enforce_guard();
            }
        }
    }

    fn remember_email(&mut self, email: &str) {
        if self.config.last_email.as_deref() == Some(email) {
            return;
        }
        self.config.last_email = Some(email.to_string());
        if self.save_config {
            if let Err(e) = self.config.save() {
                warn!(error = %e, "Failed to save config");
            }
        }
    }

    // =========================================================================
    // Timers
    // =========================================================================

    /// Fire due timers and re-check the guard. Called once per loop.
    pub fn tick(&mut self) {
        let now = Instant::now();

        if self.pending_redirect.is_some_and(|at| at <= now) {
            self.pending_redirect = None;
            self.navigate(Route::Dashboard);
        }

        if self.pending_refresh.is_some_and(|at| at <= now) {
            self.pending_refresh = None;
            self.refresh_payments();
        }

        // The session can disappear underneath us, e.g. idle timeout
        if self.router.current().is_protected() {
            // The idle report may still be in flight and would arrive stale
            if self.expired_while_idle() {
                self.show_idle_logout();
            }
            self.enforce_guard();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::{BoxFuture, FutureExt};
    use portal_core::auth::Credentials;
    use portal_core::storage::{PAYMENTS_KEY, TOKEN_KEY};

    use super::*;

    pub(crate) struct FakeAuthenticator {
        response: Mutex<Option<Result<Session, ApiError>>>,
    }

    impl FakeAuthenticator {
        pub(crate) fn answering(response: Result<Session, ApiError>) -> Arc<Self> {
            Arc::new(Self {
                response: Mutex::new(Some(response)),
            })
        }
    }

    impl Authenticator for FakeAuthenticator {
        fn authenticate<'a>(
            &'a self,
            _credentials: &'a Credentials,
        ) -> BoxFuture<'a, Result<Session, ApiError>> {
            let response = self
                .response
                .lock()
                .unwrap()
                .take()
                .unwrap_or(Err(ApiError::Rejected("no more answers".to_string())));
            async move { response }.boxed()
        }
    }

    /// Answers every list call with the same payments, or 401 when `reject`
    #[derive(Default)]
    pub(crate) struct FakePayments {
        payments: Vec<PaymentRecord>,
        reject: bool,
        list_calls: AtomicUsize,
        processed: Mutex<Vec<PaymentId>>,
    }

    impl PaymentService for FakePayments {
        fn list_payments<'a>(
            &'a self,
            _token: &'a str,
        ) -> BoxFuture<'a, Result<Vec<PaymentRecord>, ApiError>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            let result = if self.reject {
                Err(ApiError::Unauthorized)
            } else {
                Ok(self.payments.clone())
            };
            async move { result }.boxed()
        }

        fn process_payment<'a>(
            &'a self,
            id: &'a PaymentId,
            _token: &'a str,
        ) -> BoxFuture<'a, Result<(), ApiError>> {
            self.processed.lock().unwrap().push(id.clone());
            async move { Ok(()) }.boxed()
        }
    }

    fn payment(id: &str) -> PaymentRecord {
        serde_json::from_value(serde_json::json!({ "id": id, "amount": 5.5 })).unwrap()
    }

    fn config() -> Config {
        Config {
            last_email: Some("a@b.com".to_string()),
            ..Config::default()
        }
    }

    fn app_with(
        storage: Arc<MemoryStorage>,
        auth: Arc<FakeAuthenticator>,
        payments: Arc<FakePayments>,
    ) -> App {
        let mut app = App::with_services(config(), storage, auth, payments);
        app.login.password = "Aa1@aaaa".to_string();
        app
    }

    fn logged_in_storage() -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        StorageSessionStore::new(storage.clone())
            .put(&Session::new("tok1", "A B", "a@b.com"))
            .unwrap();
        storage
    }

    /// Let spawned tasks run, then drain their results
    async fn pump(app: &mut App) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        app.check_background_tasks().await;
        app.tick();
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_then_redirect_to_dashboard() {
        let storage = Arc::new(MemoryStorage::new());
        let payments = Arc::new(FakePayments {
            payments: vec![payment("1")],
            ..Default::default()
        });
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Ok(Session::new("tok1", "A B", "a@b.com"))),
            payments.clone(),
        );
        app.start();
        assert_eq!(app.current_route(), Route::Login);
        assert_eq!(app.login_focus, LoginFocus::Password);

        app.submit_login();
        pump(&mut app).await;

        assert_eq!(storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some("tok1"));
        assert_eq!(app.login.success(), Some("Login successful!"));
        // Still on the login view until the redirect delay passes
        assert_eq!(app.current_route(), Route::Login);

        tokio::time::advance(LOGIN_REDIRECT_DELAY).await;
        pump(&mut app).await;
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Dashboard);
        let dashboard = app.dashboard.as_ref().unwrap();
        assert_eq!(dashboard.welcome(), "Welcome Employee: A B");
        assert_eq!(dashboard.payments().len(), 1);
        assert!(app.monitor().is_some());
        assert_eq!(payments.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_login_stays_on_login() {
        let storage = Arc::new(MemoryStorage::new());
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Err(ApiError::Rejected(
                "Invalid credentials".to_string(),
            ))),
            Arc::new(FakePayments::default()),
        );
        app.start();
        app.submit_login();
        pump(&mut app).await;

        tokio::time::advance(LOGIN_REDIRECT_DELAY).await;
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Login);
        assert_eq!(app.login.error(), Some("Invalid credentials"));
        assert!(storage.is_empty());
        assert!(app.dashboard.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_authenticated_goes_to_dashboard() {
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        assert_eq!(app.current_route(), Route::Dashboard);
        assert!(app.dashboard.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_returns_to_login() {
        let storage = logged_in_storage();
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        pump(&mut app).await;

        tokio::time::advance(Duration::from_millis(299_000)).await;
        pump(&mut app).await;
        assert_eq!(app.current_route(), Route::Dashboard);

        tokio::time::advance(Duration::from_millis(1_000)).await;
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Login);
        assert!(!app.is_authenticated());
        assert!(storage.get_item(TOKEN_KEY).unwrap().is_none());
        assert!(app.dashboard.is_none());
        assert!(app.monitor().is_none());
        assert_eq!(app.login.error(), Some(IDLE_LOGOUT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_notice_shown_when_guard_redirects_first() {
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        pump(&mut app).await;

        tokio::time::advance(Duration::from_millis(300_000)).await;
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
        // Tick before the idle report is drained
        app.tick();
        assert_eq!(app.current_route(), Route::Login);
        assert_eq!(app.login.error(), Some(IDLE_LOGOUT_MESSAGE));

        // The report now arrives stale and changes nothing
        pump(&mut app).await;
        assert_eq!(app.login.error(), Some(IDLE_LOGOUT_MESSAGE));
        assert_eq!(app.status_message.as_deref(), Some(IDLE_LOGOUT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_timeout_closes_dashboard_overlays() {
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        pump(&mut app).await;
        app.state = AppState::ShowingHelp;

        tokio::time::advance(Duration::from_millis(300_000)).await;
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Login);
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_keeps_session_alive() {
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();

        tokio::time::advance(Duration::from_secs(200)).await;
        app.record_activity(ActivitySignal::PointerMove);
        tokio::time::advance(Duration::from_secs(200)).await;
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Dashboard);
        assert!(app.is_authenticated());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_fetch_logs_out() {
        let storage = logged_in_storage();
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments {
                reject: true,
                ..Default::default()
            }),
        );
        app.start();
        pump(&mut app).await;

        assert_eq!(app.current_route(), Route::Login);
        assert!(storage.get_item(TOKEN_KEY).unwrap().is_none());
        assert_eq!(app.login.error(), Some(SESSION_REJECTED_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_process_then_refresh() {
        let payments = Arc::new(FakePayments {
            payments: vec![payment("7")],
            ..Default::default()
        });
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            payments.clone(),
        );
        app.start();
        pump(&mut app).await;

        app.request_process();
        assert_eq!(app.state, AppState::ConfirmingProcess);
        app.confirm_process();
        assert_eq!(app.state, AppState::Normal);
        pump(&mut app).await;

        assert_eq!(payments.processed.lock().unwrap().as_slice(), [PaymentId::new("7")]);
        assert_eq!(
            app.dashboard.as_ref().unwrap().success_message(),
            Some("Payment submitted to SWIFT successfully.")
        );
        assert_eq!(payments.list_calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(REFRESH_AFTER_PROCESS_DELAY).await;
        pump(&mut app).await;
        pump(&mut app).await;
        assert_eq!(payments.list_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_process_sends_nothing() {
        let payments = Arc::new(FakePayments {
            payments: vec![payment("7")],
            ..Default::default()
        });
        let mut app = app_with(
            logged_in_storage(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            payments.clone(),
        );
        app.start();
        pump(&mut app).await;

        app.request_process();
        app.cancel_process();
        pump(&mut app).await;

        assert_eq!(app.state, AppState::Normal);
        assert!(payments.processed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_clears_session_and_stops_monitor() {
        let storage = logged_in_storage();
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        pump(&mut app).await;

        app.logout();

        assert_eq!(app.current_route(), Route::Login);
        assert!(app.monitor().is_none());
        assert!(storage.get_item(TOKEN_KEY).unwrap().is_none());

        // Nothing fires after teardown
        tokio::time::advance(Duration::from_secs(600)).await;
        pump(&mut app).await;
        assert_eq!(app.login.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_payments_are_discarded() {
        let storage = logged_in_storage();
        let mut app = app_with(
            storage.clone(),
            FakeAuthenticator::answering(Err(ApiError::Unauthorized)),
            Arc::new(FakePayments::default()),
        );
        app.start();
        let old_generation = app.generation;

        app.logout();
        app.process_background_result(BackgroundResult::Payments {
            generation: old_generation,
            result: Ok(vec![payment("1")]),
        });

        assert!(app.dashboard.is_none());
        assert!(storage.get_item(PAYMENTS_KEY).unwrap().is_none());
    }
}
