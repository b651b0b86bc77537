use std::time::Instant;

use actix_session::Session;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

use super::{see_other, CsrfOnly};
use crate::dashboard::{ConfirmOutcome, DashboardHandle, DashboardRegistry};
use crate::errors::{render, AppError};
use crate::session::{csrf, dashboard_for, mark_soft_return, take_soft_return};
use crate::templates_structs::{DashboardTemplate, PageContext};

/// Redirect after one of the page's own form posts. The one-shot marker in
/// the URL keeps that redirect from counting as arriving at the page.
fn back_to_dashboard(session: &Session) -> HttpResponse {
    let marker = mark_soft_return(session);
    see_other(&format!("/dashboard?r={marker}"))
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub r: Option<String>,
}

fn checked(session: &Session, registry: &DashboardRegistry, csrf_token: &str) -> Result<DashboardHandle, AppError> {
    csrf::validate_csrf(session, csrf_token)?;
    dashboard_for(session, registry)
}

/// GET /dashboard
pub async fn index(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse, AppError> {
    let handle = dashboard_for(&session, &registry)?;

    if !take_soft_return(&session, query.r.as_deref()) {
        // Arriving at the page: never show what an earlier visit cached.
        handle.refresh().await;
    }

    let ctx = PageContext::build(&session, "/dashboard");
    let view = handle.render(Instant::now()).await;
    render(DashboardTemplate { ctx, view })
}

#[derive(Deserialize)]
pub struct TabForm {
    pub tab: usize,
    pub csrf_token: String,
}

/// POST /dashboard/tab
pub async fn select_tab(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<TabForm>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle
        .select_tab(form.tab)
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(back_to_dashboard(&session))
}

#[derive(Deserialize)]
pub struct PageForm {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub csrf_token: String,
}

/// POST /dashboard/page
pub async fn paginate(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<PageForm>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    if let Some(size) = form.page_size {
        handle.set_page_size(size).await;
    } else if let Some(page) = form.page {
        handle.set_page(page).await;
    }
    Ok(back_to_dashboard(&session))
}

#[derive(Deserialize)]
pub struct FilterForm {
    pub search: Option<String>,
    pub counterparty: Option<String>,
    pub csrf_token: String,
}

/// POST /dashboard/filters
pub async fn apply_filters(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<FilterForm>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    let FilterForm { search, counterparty, .. } = form.into_inner();
    handle.set_search_filters(search, counterparty).await;
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/refresh
pub async fn refresh(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle.refresh().await;
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/agreements/{id}/approve
pub async fn request_approve(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle.request_approve(&path.into_inner()).await;
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/agreements/{id}/decline
pub async fn request_decline(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    path: web::Path<String>,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle.request_decline(&path.into_inner()).await;
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/confirm
pub async fn confirm(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    match handle.confirm_action().await {
        ConfirmOutcome::NothingPending => log::debug!("Confirm posted with nothing pending"),
        ConfirmOutcome::Succeeded { action, agreement_id } => {
            log::info!("Dashboard {action} of {agreement_id} confirmed");
        }
        ConfirmOutcome::Failed { action, error } => {
            log::warn!("Dashboard {action} failed: {error}");
        }
    }
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/cancel
pub async fn cancel(
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle.cancel_confirmation().await;
    Ok(back_to_dashboard(&session))
}

/// POST /dashboard/toast/close
///
/// The auto-hide script posts in the background and never follows a
/// redirect, so it gets `204` and no soft-return marker.
pub async fn close_toast(
    req: HttpRequest,
    registry: web::Data<DashboardRegistry>,
    session: Session,
    form: web::Form<CsrfOnly>,
) -> Result<HttpResponse, AppError> {
    let handle = checked(&session, &registry, &form.csrf_token)?;
    handle.close_toast().await;
    if req.headers().contains_key(BACKGROUND_HEADER) {
        return Ok(HttpResponse::NoContent().finish());
    }
    Ok(back_to_dashboard(&session))
}

/// Sent by `static/dashboard.js` on requests it makes in the background.
pub const BACKGROUND_HEADER: &str = "x-dashboard-background";
