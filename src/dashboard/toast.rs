use std::time::{Duration, Instant};

use serde::Serialize;

pub const DEFAULT_AUTO_HIDE: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToastState {
    Hidden,
    Visible { message: String, severity: Severity },
}

/// Why the toast asked to be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Timeout,
    Dismissed,
}

/// Single-slot, auto-dismissing notification.
///
/// Visibility is controlled by the owner: the toast only *requests* a close
/// (once per open cycle, on timeout or dismissal) and the owner calls
/// [`ToastNotification::clear`] in response.
#[derive(Debug)]
pub struct ToastNotification {
    state: ToastState,
    auto_hide: Duration,
    shown_at: Option<Instant>,
    close_requested: bool,
}

impl Default for ToastNotification {
    fn default() -> Self {
        Self::new(DEFAULT_AUTO_HIDE)
    }
}

impl ToastNotification {
    pub fn new(auto_hide: Duration) -> Self {
        Self {
            state: ToastState::Hidden,
            auto_hide,
            shown_at: None,
            close_requested: false,
        }
    }

    /// Show a message, replacing whatever was shown before.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity, now: Instant) {
        self.state = ToastState::Visible { message: message.into(), severity };
        self.shown_at = Some(now);
        self.close_requested = false;
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ToastState::Visible { .. })
    }

    pub fn state(&self) -> &ToastState {
        &self.state
    }

    pub fn auto_hide(&self) -> Duration {
        self.auto_hide
    }

    /// Time left before the auto-hide fires; `None` when hidden or already closing.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if !self.is_open() || self.close_requested {
            return None;
        }
        let shown_at = self.shown_at?;
        Some(self.auto_hide.saturating_sub(now.saturating_duration_since(shown_at)))
    }

    /// Advance the clock. Returns `Some(Timeout)` the first time the
    /// auto-hide deadline is reached in this open cycle.
    pub fn poll(&mut self, now: Instant) -> Option<CloseReason> {
        match self.remaining(now) {
            Some(left) if left.is_zero() => {
                self.close_requested = true;
                Some(CloseReason::Timeout)
            }
            _ => None,
        }
    }

    /// User dismissal. Returns `Some(Dismissed)` unless a close was already
    /// requested in this open cycle.
    pub fn dismiss(&mut self) -> Option<CloseReason> {
        if !self.is_open() || self.close_requested {
            return None;
        }
        self.close_requested = true;
        Some(CloseReason::Dismissed)
    }

    /// Owner's response to a close request.
    pub fn clear(&mut self) {
        self.state = ToastState::Hidden;
        self.shown_at = None;
        self.close_requested = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_hide_fires_once_after_timeout() {
        let t0 = Instant::now();
        let mut toast = ToastNotification::default();
        toast.show("Saved", Severity::Success, t0);

        assert_eq!(toast.poll(t0 + Duration::from_millis(3999)), None);
        assert_eq!(toast.poll(t0 + Duration::from_millis(4000)), Some(CloseReason::Timeout));
        assert_eq!(toast.poll(t0 + Duration::from_millis(9000)), None);
        assert_eq!(toast.dismiss(), None);
        // Still open until the owner clears it.
        assert!(toast.is_open());
        toast.clear();
        assert!(!toast.is_open());
    }

    #[test]
    fn dismiss_before_timeout_suppresses_auto_hide() {
        let t0 = Instant::now();
        let mut toast = ToastNotification::default();
        toast.show("Oops", Severity::Error, t0);

        assert_eq!(toast.dismiss(), Some(CloseReason::Dismissed));
        assert_eq!(toast.poll(t0 + Duration::from_secs(10)), None);
    }

    #[test]
    fn new_toast_overwrites_and_restarts_cycle() {
        let t0 = Instant::now();
        let mut toast = ToastNotification::new(Duration::from_millis(100));
        toast.show("first", Severity::Info, t0);
        assert_eq!(toast.poll(t0 + Duration::from_millis(100)), Some(CloseReason::Timeout));

        let t1 = t0 + Duration::from_millis(150);
        toast.show("second", Severity::Warning, t1);
        assert_eq!(
            toast.state(),
            &ToastState::Visible { message: "second".into(), severity: Severity::Warning }
        );
        assert_eq!(toast.remaining(t1), Some(Duration::from_millis(100)));
        assert_eq!(toast.poll(t1 + Duration::from_millis(100)), Some(CloseReason::Timeout));
    }
}
