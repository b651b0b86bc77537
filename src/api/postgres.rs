use async_trait::async_trait;
use sqlx::PgPool;

use super::{AgreementAction, AgreementApi, ApiError};
use crate::models::agreement::{
    self, Agreement, AgreementPage, AgreementQuery, DashboardStats, NewAgreement,
};

/// Agreement API backed by the `agreements` table.
#[derive(Clone)]
pub struct PgAgreementApi {
    pool: PgPool,
}

impl PgAgreementApi {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AgreementApi for PgAgreementApi {
    async fn get_agreements(&self, query: &AgreementQuery) -> Result<AgreementPage, ApiError> {
        agreement::find_page(&self.pool, query).await
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        agreement::stats(&self.pool).await
    }

    async fn get_agreement(&self, id: &str) -> Result<Option<Agreement>, ApiError> {
        agreement::find_by_id(&self.pool, id).await
    }

    async fn create_agreement(&self, new: &NewAgreement) -> Result<Agreement, ApiError> {
        agreement::create(&self.pool, new).await
    }

    async fn approve_agreement(&self, id: &str) -> Result<(), ApiError> {
        agreement::apply_action(&self.pool, id, AgreementAction::Approve).await
    }

    async fn decline_agreement(&self, id: &str) -> Result<(), ApiError> {
        agreement::apply_action(&self.pool, id, AgreementAction::Decline).await
    }
}
