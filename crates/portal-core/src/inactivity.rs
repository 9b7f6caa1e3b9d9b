//! Idle logout.
//!
//! `InactivityMonitor` owns one timer task. The deadline is computed when a
//! signal arrives and handed to the task through a `watch` channel, so the
//! task only ever holds a single pending `Sleep`. When it elapses the
//! session store is cleared and the expiry callback runs. Dropping or
//! stopping the monitor aborts the task.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::auth::SessionStore;

/// Default idle timeout: five minutes
pub const DEFAULT_IDLE_TIMEOUT_MS: u64 = 300_000;

/// User interaction that may count as activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivitySignal {
    KeyPress,
    PointerMove,
    PointerPress,
    TouchStart,
}

impl ActivitySignal {
    pub const ALL: [ActivitySignal; 4] = [
        ActivitySignal::KeyPress,
        ActivitySignal::PointerMove,
        ActivitySignal::PointerPress,
        ActivitySignal::TouchStart,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InactivityConfig {
    pub timeout: Duration,
    pub signals: Vec<ActivitySignal>,
}

impl Default for InactivityConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS),
            signals: ActivitySignal::ALL.to_vec(),
        }
    }
}

impl InactivityConfig {
    pub fn new(timeout: Duration, signals: Vec<ActivitySignal>) -> Self {
        Self { timeout, signals }
    }

    pub fn accepts(&self, signal: ActivitySignal) -> bool {
        self.signals.contains(&signal)
    }
}

pub struct InactivityMonitor {
    config: InactivityConfig,
    deadline_tx: watch::Sender<Instant>,
    task: JoinHandle<()>,
}

impl InactivityMonitor {
    /// Arm the timer for the full timeout.
    ///
    /// Must be called from within a tokio runtime. `on_expire` runs once,
    /// after the session has been cleared.
    pub fn start<F>(config: InactivityConfig, store: Arc<dyn SessionStore>, on_expire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let (deadline_tx, deadline_rx) = watch::channel(Instant::now() + config.timeout);
        let timeout = config.timeout;
        let task = tokio::spawn(Self::run(deadline_rx, store, on_expire, timeout));
        debug!(timeout_ms = timeout.as_millis() as u64, "Inactivity monitor started");

        Self {
            config,
            deadline_tx,
            task,
        }
    }

    /// Report user activity. Returns true if the timer was re-armed.
    pub fn record(&self, signal: ActivitySignal) -> bool {
        if !self.config.accepts(signal) || self.task.is_finished() {
            return false;
        }
        self.deadline_tx
            .send_replace(Instant::now() + self.config.timeout);
        true
    }

    /// When the session will be cleared if no further activity arrives
    pub fn deadline(&self) -> Instant {
        *self.deadline_tx.borrow()
    }

    /// Time left before expiry
    pub fn remaining(&self) -> Duration {
        self.deadline().saturating_duration_since(Instant::now())
    }

    pub fn has_expired(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel the timer. Nothing fires afterwards.
    pub fn stop(self) {
        // Drop aborts the task
    }

    async fn run<F>(
        mut deadline_rx: watch::Receiver<Instant>,
        store: Arc<dyn SessionStore>,
        on_expire: F,
        timeout: Duration,
    ) where
        F: FnOnce() + Send + 'static,
    {
        let sleep = tokio::time::sleep_until(*deadline_rx.borrow_and_update());
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                changed = deadline_rx.changed() => {
                    if changed.is_err() {
                        // Monitor handle gone
                        return;
                    }
                    let deadline = *deadline_rx.borrow_and_update();
                    sleep.as_mut().reset(deadline);
                }
                () = &mut sleep => {
                    // A signal may have landed after the sleep was polled
                    let deadline = *deadline_rx.borrow_and_update();
                    if deadline > Instant::now() {
                        sleep.as_mut().reset(deadline);
                        continue;
                    }
                    break;
                }
            }
        }

        info!(idle_ms = timeout.as_millis() as u64, "Idle timeout reached, ending session");
        store.clear();
        on_expire();
    }
}

impl Drop for InactivityMonitor {
    fn drop(&mut self) {
        if !self.task.is_finished() {
            debug!("Inactivity monitor stopped");
        }
        self.task.abort();
    }
}
