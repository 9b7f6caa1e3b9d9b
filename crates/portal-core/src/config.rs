//! Application configuration management.
//!
//! This module handles loading and saving the portal configuration: backend
//! URL, request timeout, idle logout settings, storage mode, and the last
//! email address used to log in.
//!
//! Configuration is stored at `~/.config/employee-portal/config.json`.
//! `PORTAL_API_URL` and `PORTAL_IDLE_TIMEOUT_MS` override the file.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::inactivity::{ActivitySignal, InactivityConfig, DEFAULT_IDLE_TIMEOUT_MS};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "employee-portal";

/// Config file name
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub idle_timeout_ms: u64,
    pub activity_signals: Vec<ActivitySignal>,
    /// Keep the session on disk across restarts
    pub persist_session: bool,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            activity_signals: ActivitySignal::ALL.to_vec(),
            persist_session: true,
            last_email: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding persisted storage and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Apply environment overrides, read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PORTAL_API_URL").filter(|u| !u.is_empty()) {
            self.api_base_url = url;
        }
        if let Some(raw) = lookup("PORTAL_IDLE_TIMEOUT_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => self.idle_timeout_ms = ms,
                _ => warn!(value = %raw, "Ignoring invalid PORTAL_IDLE_TIMEOUT_MS"),
            }
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Idle settings; a zero timeout falls back to the default
    pub fn inactivity(&self) -> InactivityConfig {
        let timeout_ms = if self.idle_timeout_ms > 0 {
            self.idle_timeout_ms
        } else {
            warn!("Ignoring idle_timeout_ms of 0, using default");
            DEFAULT_IDLE_TIMEOUT_MS
        };
        InactivityConfig::new(
            Duration::from_millis(timeout_ms),
            self.activity_signals.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.inactivity(), InactivityConfig::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.persist_session);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"idle_timeout_ms": 60000, "activity_signals": ["key_press"]}"#,
        )
        .unwrap();
        assert_eq!(config.idle_timeout_ms, 60_000);
        assert_eq!(config.activity_signals, vec![ActivitySignal::KeyPress]);
        assert_eq!(config.api_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.last_email, None);
    }

    #[test]
    fn test_zero_timeout_in_file_uses_default() {
        let config: Config = serde_json::from_str(r#"{"idle_timeout_ms": 0}"#).unwrap();
        assert_eq!(
            config.inactivity().timeout,
            Duration::from_millis(DEFAULT_IDLE_TIMEOUT_MS)
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default().with_env_overrides(|key| match key {
            "PORTAL_API_URL" => Some("http://localhost:8080".to_string()),
            "PORTAL_IDLE_TIMEOUT_MS" => Some("1000".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.inactivity().timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_env_timeout_ignored() {
        let config = Config::default().with_env_overrides(|key| match key {
            "PORTAL_IDLE_TIMEOUT_MS" => Some("soon".to_string()),
            _ => None,
        });
        assert_eq!(config.idle_timeout_ms, DEFAULT_IDLE_TIMEOUT_MS);
    }
}
