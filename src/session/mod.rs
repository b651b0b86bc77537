pub mod csrf;

use actix_session::Session;

use crate::dashboard::{DashboardHandle, DashboardRegistry};
use crate::errors::AppError;

const DASHBOARD_KEY: &str = "dashboard_key";

/// The session's dashboard key, minted on first use.
pub fn dashboard_key(session: &Session) -> Result<String, AppError> {
    match session.get::<String>(DASHBOARD_KEY) {
        Ok(Some(key)) => Ok(key),
        Ok(None) => {
            let key = DashboardRegistry::new_key();
            session
                .insert(DASHBOARD_KEY, &key)
                .map_err(|e| AppError::Session(format!("Failed to store dashboard key: {e}")))?;
            Ok(key)
        }
        Err(e) => Err(AppError::Session(format!("Failed to read dashboard key: {e}"))),
    }
}

/// This session's dashboard page.
pub fn dashboard_for(session: &Session, registry: &DashboardRegistry) -> Result<DashboardHandle, AppError> {
    let key = dashboard_key(session)?;
    Ok(registry.get_or_create(&key))
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert("flash", message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>("flash").unwrap_or(None);
    if flash.is_some() {
        session.remove("flash");
    }
    flash
}

const SOFT_RETURN: &str = "dashboard_soft_return";

/// Mark the next dashboard GET as the redirect after one of the page's own
/// form posts. Returns the marker to put in that redirect's URL.
pub fn mark_soft_return(session: &Session) -> String {
    let marker = csrf::random_hex(8);
    let _ = session.insert(SOFT_RETURN, &marker);
    marker
}

/// Consume the stored marker. True only when `presented` matches it, so a
/// marker that was never followed cannot suppress a later arrival.
pub fn take_soft_return(session: &Session, presented: Option<&str>) -> bool {
    let stored = session.remove_as::<String>(SOFT_RETURN).and_then(Result::ok);
    matches!((stored, presented), (Some(s), Some(p)) if csrf::constant_time_eq(&s, p))
}

/// Drop any unfollowed marker.
pub fn clear_soft_return(session: &Session) {
    session.remove(SOFT_RETURN);
}
