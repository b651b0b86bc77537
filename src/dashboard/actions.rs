use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::Mutex as AsyncMutex;

use crate::api::{AgreementAction, AgreementApi, ApiError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Another approve/decline is still in flight.
    Busy,
    Api(ApiError),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionError::Busy => write!(f, "Another agreement action is still in progress"),
            ActionError::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ActionError {}

impl From<ApiError> for ActionError {
    fn from(e: ApiError) -> Self {
        ActionError::Api(e)
    }
}

/// Approve/decline mutations with shared loading and error state.
///
/// Clones share state. At most one call runs at a time; a call made while
/// another is in flight fails with [`ActionError::Busy`] without touching
/// `loading` or `error`.
#[derive(Clone)]
pub struct AgreementActions {
    api: Arc<dyn AgreementApi>,
    gate: Arc<AsyncMutex<()>>,
    loading: Arc<AtomicBool>,
    error: Arc<Mutex<Option<ApiError>>>,
}

impl AgreementActions {
    pub fn new(api: Arc<dyn AgreementApi>) -> Self {
        Self {
            api,
            gate: Arc::new(AsyncMutex::new(())),
            loading: Arc::new(AtomicBool::new(false)),
            error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Most recent failure, cleared when the next call starts.
    pub fn error(&self) -> Option<ApiError> {
        self.error.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub async fn approve_agreement(&self, agreement_id: &str) -> Result<(), ActionError> {
        self.run(AgreementAction::Approve, agreement_id).await
    }

    pub async fn decline_agreement(&self, agreement_id: &str) -> Result<(), ActionError> {
        self.run(AgreementAction::Decline, agreement_id).await
    }

    pub async fn run(&self, action: AgreementAction, agreement_id: &str) -> Result<(), ActionError> {
        let Ok(_guard) = self.gate.try_lock() else {
            log::warn!("Rejected concurrent {action} of agreement {agreement_id}");
            return Err(ActionError::Busy);
        };

        let _loading = LoadingFlag::raise(&self.loading);
        self.set_error(None);

        let result = match action {
            AgreementAction::Approve => self.api.approve_agreement(agreement_id).await,
            AgreementAction::Decline => self.api.decline_agreement(agreement_id).await,
        };

        if let Err(e) = &result {
            log::error!("Failed to {action} agreement {agreement_id}: {e}");
            self.set_error(Some(e.clone()));
        } else {
            log::info!("Agreement {agreement_id}: {action} accepted");
        }
        result.map_err(ActionError::from)
    }

    fn set_error(&self, value: Option<ApiError>) {
        *self.error.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

/// Lowers `loading` when dropped, including when the call is cancelled.
struct LoadingFlag<'a>(&'a AtomicBool);

impl<'a> LoadingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        LoadingFlag(flag)
    }
}

impl Drop for LoadingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
