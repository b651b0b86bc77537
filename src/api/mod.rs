//! Remote agreement API consumed by the dashboard.
//!
//! The dashboard only sees the [`AgreementApi`] trait. Two backends implement
//! it: [`postgres::PgAgreementApi`] for a real database and
//! [`mock_store::MockStore`] for demos and tests. The mock store also
//! implements [`SnapshotSource`], the synchronous side channel the dashboard
//! reads to patch around gaps in the primary read path.

pub mod mock_store;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::models::agreement::{
    Agreement, AgreementPage, AgreementQuery, AgreementStatus, DashboardStats, NewAgreement,
};

/// Which mutation was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgreementAction {
    Approve,
    Decline,
}

impl AgreementAction {
    pub fn verb(&self) -> &'static str {
        match self {
            AgreementAction::Approve => "approve",
            AgreementAction::Decline => "decline",
        }
    }

    /// Status an agreement lands in after the action succeeds.
    pub fn target_status(&self) -> AgreementStatus {
        match self {
            AgreementAction::Approve => AgreementStatus::Active,
            AgreementAction::Decline => AgreementStatus::Expired,
        }
    }

    /// Only agreements awaiting approval can be approved or declined.
    pub fn allowed_from(&self, status: AgreementStatus) -> bool {
        status == AgreementStatus::PendingApproval
    }
}

impl fmt::Display for AgreementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotFound(String),
    InvalidTransition {
        id: String,
        from: AgreementStatus,
        action: AgreementAction,
    },
    Validation(Vec<String>),
    Transport(String),
    Server(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(id) => write!(f, "Agreement {id} not found"),
            ApiError::InvalidTransition { id, from, action } => {
                write!(f, "Cannot {action} agreement {id} in status {from}")
            }
            ApiError::Validation(errors) => write!(f, "Invalid agreement: {}", errors.join("; ")),
            ApiError::Transport(e) => write!(f, "Transport error: {e}"),
            ApiError::Server(e) => write!(f, "Server error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ApiError::Transport(e.to_string())
            }
            other => ApiError::Server(other.to_string()),
        }
    }
}

/// Read and mutation operations of the agreement service.
#[async_trait]
pub trait AgreementApi: Send + Sync {
    async fn get_agreements(&self, query: &AgreementQuery) -> Result<AgreementPage, ApiError>;

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn get_agreement(&self, id: &str) -> Result<Option<Agreement>, ApiError>;

    async fn create_agreement(&self, new: &NewAgreement) -> Result<Agreement, ApiError>;

    async fn approve_agreement(&self, id: &str) -> Result<(), ApiError>;

    async fn decline_agreement(&self, id: &str) -> Result<(), ApiError>;
}

/// Synchronous snapshot of whatever the backing store last served.
pub trait SnapshotSource: Send + Sync {
    fn agreements_snapshot(&self) -> Option<AgreementPage>;

    fn stats_snapshot(&self) -> Option<DashboardStats>;
}
