pub mod agreement_handlers;
pub mod api_v1;
pub mod dashboard;

use serde::Deserialize;

#[derive(Deserialize)]
pub struct CsrfOnly {
    pub csrf_token: String,
}

pub(crate) fn see_other(location: &str) -> actix_web::HttpResponse {
    actix_web::HttpResponse::SeeOther()
        .insert_header(("Location", location))
        .finish()
}

/// HTML and JSON routes, without static files or the fallback page.
pub fn configure(cfg: &mut actix_web::web::ServiceConfig) {
    use actix_web::web;

    cfg.route("/", web::get().to(|| async { see_other("/dashboard") }))
        // Dashboard
        .route("/dashboard", web::get().to(dashboard::index))
        .route("/dashboard/tab", web::post().to(dashboard::select_tab))
        .route("/dashboard/page", web::post().to(dashboard::paginate))
        .route("/dashboard/filters", web::post().to(dashboard::apply_filters))
        .route("/dashboard/refresh", web::post().to(dashboard::refresh))
        .route("/dashboard/agreements/{id}/approve", web::post().to(dashboard::request_approve))
        .route("/dashboard/agreements/{id}/decline", web::post().to(dashboard::request_decline))
        .route("/dashboard/confirm", web::post().to(dashboard::confirm))
        .route("/dashboard/cancel", web::post().to(dashboard::cancel))
        .route("/dashboard/toast/close", web::post().to(dashboard::close_toast))
        // Agreements: /agreements/new BEFORE /agreements/{id} to avoid routing conflict
        .route("/agreements/new", web::get().to(agreement_handlers::new_form))
        .route("/agreements", web::post().to(agreement_handlers::create))
        .route("/agreements/{id}", web::get().to(agreement_handlers::detail))
        // JSON API
        .service(web::scope("/api/v1").configure(api_v1::configure));
}
