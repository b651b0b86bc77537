use std::time::Duration;

use crate::dashboard::DashboardSettings;
use crate::dashboard::page::{DEFAULT_PAGE_SIZE, DEFAULT_REFETCH_DELAY};
use crate::dashboard::toast::DEFAULT_AUTO_HIDE;

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// `None` selects the in-memory mock store.
    pub database_url: Option<String>,
    pub session_key: Option<String>,
    pub page_size: u32,
    pub refetch_delay: Duration,
    pub toast_auto_hide: Duration,
    pub max_dashboard_sessions: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: None,
            session_key: None,
            page_size: DEFAULT_PAGE_SIZE,
            refetch_delay: DEFAULT_REFETCH_DELAY,
            toast_auto_hide: DEFAULT_AUTO_HIDE,
            max_dashboard_sessions: 1000,
        }
    }
}

impl AppConfig {
    /// Load from the process environment (after `.env`, if present).
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            log::debug!("No .env file loaded: {e}");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable numbers fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = AppConfig::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let number = |key: &str| -> Option<u64> {
            let raw = non_empty(key)?;
            match raw.trim().parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    log::warn!("Ignoring invalid {key}={raw}");
                    None
                }
            }
        };

        AppConfig {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            database_url: non_empty("DATABASE_URL"),
            session_key: non_empty("SESSION_KEY"),
            page_size: number("PAGE_SIZE")
                .map(|n| n as u32)
                .filter(|n| *n > 0)
                .unwrap_or(defaults.page_size),
            refetch_delay: number("REFETCH_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.refetch_delay),
            toast_auto_hide: number("TOAST_AUTO_HIDE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.toast_auto_hide),
            max_dashboard_sessions: number("MAX_DASHBOARD_SESSIONS")
                .map(|n| n as usize)
                .unwrap_or(defaults.max_dashboard_sessions),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            page_size: self.page_size,
            refetch_delay: self.refetch_delay,
            toast_auto_hide: self.toast_auto_hide,
        }
    }
}
