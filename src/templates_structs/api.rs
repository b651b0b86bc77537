use serde::{Deserialize, Serialize};

/// Generic paginated response wrapper for API endpoints.
#[derive(Serialize, Debug, Clone)]
pub struct PaginatedResponse<T: Serialize> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
}

/// Query string of `GET /api/v1/agreements`.
#[derive(Deserialize, Debug, Default)]
pub struct ApiAgreementListQuery {
    /// Comma-separated statuses, e.g. `EXPIRED,TERMINATED`.
    pub status: Option<String>,
    pub search: Option<String>,
    pub counterparty: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// API error response.
#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
