use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;

use super::{AgreementAction, AgreementApi, ApiError, SnapshotSource};
use crate::models::agreement::{
    self, Agreement, AgreementPage, AgreementQuery, DashboardStats, NewAgreement, SortField, SortOrder,
};

#[derive(Default)]
struct MockState {
    agreements: Vec<Agreement>,
    last_page: Option<AgreementPage>,
    last_stats: Option<DashboardStats>,
}

/// In-memory agreement store.
///
/// Serves the same operations as the database backend and remembers the last
/// page and stats it handed out, which is what [`SnapshotSource`] exposes.
pub struct MockStore {
    state: RwLock<MockState>,
    latency: Duration,
}

impl MockStore {
    pub fn new(agreements: Vec<Agreement>) -> Self {
        Self {
            state: RwLock::new(MockState { agreements, ..MockState::default() }),
            latency: Duration::ZERO,
        }
    }

    /// Store pre-filled with the bundled demo agreements.
    pub fn seeded() -> Result<Self, serde_json::Error> {
        Ok(Self::new(agreement::seed_agreements()?))
    }

    /// Delay every call, to make in-flight states observable.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Copy of every stored agreement, unfiltered.
    pub fn all(&self) -> Vec<Agreement> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).agreements.clone()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn transition(&self, id: &str, action: AgreementAction) -> Result<(), ApiError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let record = state
            .agreements
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        if !action.allowed_from(record.status) {
            return Err(ApiError::InvalidTransition {
                id: id.to_string(),
                from: record.status,
                action,
            });
        }
        record.status = action.target_status();
        record.updated_at = agreement::now_rfc3339();
        log::info!("Mock store: agreement {} -> {}", record.agreement_number, record.status);
        Ok(())
    }
}

fn compare(a: &Agreement, b: &Agreement, field: SortField) -> std::cmp::Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::AgreementNumber => a.agreement_number.cmp(&b.agreement_number),
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::EndDate => a.end_date.cmp(&b.end_date),
    }
}

#[async_trait]
impl AgreementApi for MockStore {
    async fn get_agreements(&self, query: &AgreementQuery) -> Result<AgreementPage, ApiError> {
        self.simulate_latency().await;
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());

        let mut matching: Vec<Agreement> = state
            .agreements
            .iter()
            .filter(|a| query.filters.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let total = matching.len() as i64;
        let data = matching
            .into_iter()
            .skip(query.offset())
            .take(query.page_size as usize)
            .collect();
        let page = AgreementPage { data, total };
        state.last_page = Some(page.clone());
        Ok(page)
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.simulate_latency().await;
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let stats = DashboardStats::from_statuses(state.agreements.iter().map(|a| &a.status));
        state.last_stats = Some(stats);
        Ok(stats)
    }

    async fn get_agreement(&self, id: &str) -> Result<Option<Agreement>, ApiError> {
        self.simulate_latency().await;
        let state = self.state.read().unwrap_or_else(|e| e.into_inner());
        Ok(state.agreements.iter().find(|a| a.id == id).cloned())
    }

    async fn create_agreement(&self, new: &NewAgreement) -> Result<Agreement, ApiError> {
        let errors = new.validate();
        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        self.simulate_latency().await;
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let now = agreement::now_rfc3339();
        let created = Agreement {
            id: agreement::generate_id(),
            agreement_number: agreement::next_agreement_number(
                state.agreements.iter().map(|a| a.agreement_number.as_str()),
            ),
            title: new.title.trim().to_string(),
            counterparty: new.counterparty.trim().to_string(),
            owner: new.owner.trim().to_string(),
            status: agreement::AgreementStatus::Draft,
            value_cents: new.value_cents,
            currency: new.currency.trim().to_uppercase(),
            start_date: new.start_date.clone(),
            end_date: new.end_date.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        state.agreements.push(created.clone());
        Ok(created)
    }

    async fn approve_agreement(&self, id: &str) -> Result<(), ApiError> {
        self.simulate_latency().await;
        self.transition(id, AgreementAction::Approve)
    }

    async fn decline_agreement(&self, id: &str) -> Result<(), ApiError> {
        self.simulate_latency().await;
        self.transition(id, AgreementAction::Decline)
    }
}

impl SnapshotSource for MockStore {
    fn agreements_snapshot(&self) -> Option<AgreementPage> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).last_page.clone()
    }

    fn stats_snapshot(&self) -> Option<DashboardStats> {
        self.state.read().unwrap_or_else(|e| e.into_inner()).last_stats
    }
}
