use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::api::{AgreementAction, AgreementApi, ApiError};
use crate::models::agreement::{
    Agreement, AgreementFilters, AgreementQuery, AgreementStatus, SortField, SortOrder,
};
use crate::templates_structs::{ApiAgreementListQuery, ApiErrorResponse, PaginatedResponse};

const MAX_PAGE_SIZE: u32 = 100;

#[derive(Serialize)]
pub struct ApiActionResponse {
    pub id: String,
    pub action: AgreementAction,
    pub status: AgreementStatus,
}

fn error_response(e: &ApiError) -> HttpResponse {
    let body = ApiErrorResponse { error: e.to_string(), details: None };
    match e {
        ApiError::NotFound(_) => HttpResponse::NotFound().json(body),
        ApiError::InvalidTransition { .. } => HttpResponse::Conflict().json(body),
        ApiError::Validation(_) => HttpResponse::UnprocessableEntity().json(body),
        ApiError::Transport(_) => {
            log::error!("API v1: {e}");
            HttpResponse::BadGateway().json(body)
        }
        ApiError::Server(_) => {
            log::error!("API v1: {e}");
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn bad_request(error: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiErrorResponse { error, details: None })
}

/// Translate query-string parameters into an [`AgreementQuery`].
pub fn parse_list_query(params: &ApiAgreementListQuery) -> Result<AgreementQuery, String> {
    let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(csv) => Some(
            csv.split(',')
                .map(|s| s.parse::<AgreementStatus>())
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    let sort_by = match params.sort_by.as_deref() {
        None => SortField::default(),
        Some(s) => SortField::from_param(s).ok_or_else(|| format!("Unknown sort field: {s}"))?,
    };
    let sort_order = match params.sort_order.as_deref() {
        None | Some("desc") => SortOrder::Desc,
        Some("asc") => SortOrder::Asc,
        Some(other) => return Err(format!("Unknown sort order: {other}")),
    };

    Ok(AgreementQuery {
        filters: AgreementFilters {
            status,
            search: params.search.clone().filter(|s| !s.trim().is_empty()),
            counterparty: params.counterparty.clone().filter(|s| !s.trim().is_empty()),
        },
        page: params.page.unwrap_or(1).max(1),
        page_size: params.page_size.unwrap_or(10).clamp(1, MAX_PAGE_SIZE),
        sort_by,
        sort_order,
    })
}

/// GET /api/v1/agreements
pub async fn list(
    api: web::Data<dyn AgreementApi>,
    params: web::Query<ApiAgreementListQuery>,
) -> HttpResponse {
    let query = match parse_list_query(&params) {
        Ok(q) => q,
        Err(msg) => return bad_request(msg),
    };
    match api.get_agreements(&query).await {
        Ok(page) => HttpResponse::Ok().json(PaginatedResponse::<Agreement> {
            items: page.data,
            page: query.page,
            page_size: query.page_size,
            total: page.total,
        }),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/agreements/{id}
pub async fn read(api: web::Data<dyn AgreementApi>, path: web::Path<String>) -> HttpResponse {
    let id = path.into_inner();
    match api.get_agreement(&id).await {
        Ok(Some(a)) => HttpResponse::Ok().json(a),
        Ok(None) => error_response(&ApiError::NotFound(id)),
        Err(e) => error_response(&e),
    }
}

/// GET /api/v1/dashboard/stats
pub async fn stats(api: web::Data<dyn AgreementApi>) -> HttpResponse {
    match api.get_dashboard_stats().await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => error_response(&e),
    }
}

async fn mutate(api: &dyn AgreementApi, id: String, action: AgreementAction) -> HttpResponse {
    let result = match action {
        AgreementAction::Approve => api.approve_agreement(&id).await,
        AgreementAction::Decline => api.decline_agreement(&id).await,
    };
    match result {
        Ok(()) => HttpResponse::Ok().json(ApiActionResponse {
            id,
            action,
            status: action.target_status(),
        }),
        Err(e) => error_response(&e),
    }
}

/// POST /api/v1/agreements/{id}/approve
pub async fn approve(api: web::Data<dyn AgreementApi>, path: web::Path<String>) -> HttpResponse {
    mutate(api.get_ref(), path.into_inner(), AgreementAction::Approve).await
}

/// POST /api/v1/agreements/{id}/decline
pub async fn decline(api: web::Data<dyn AgreementApi>, path: web::Path<String>) -> HttpResponse {
    mutate(api.get_ref(), path.into_inner(), AgreementAction::Decline).await
}
