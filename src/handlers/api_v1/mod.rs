pub mod agreements;

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{header, Method},
    middleware::{from_fn, Next},
    web, Error, HttpResponse,
};

use crate::templates_structs::ApiErrorResponse;

/// Approve and decline change agreement state, so they only accept JSON
/// bodies. A plain cross-site form post cannot carry that content type,
/// which keeps the cookie session from being ridden into a status change.
async fn json_only_actions(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if req.method() == Method::POST {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if !content_type.starts_with("application/json") {
            log::warn!("API v1: refused {} {} with content type {content_type:?}", req.method(), req.path());
            let response = HttpResponse::UnsupportedMediaType().json(ApiErrorResponse {
                error: "Agreement actions require Content-Type: application/json".to_string(),
                details: (!content_type.is_empty()).then(|| format!("Got {content_type}")),
            });
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

/// Routes under `/api/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/agreements")
            .wrap(from_fn(json_only_actions))
            .route("", web::get().to(agreements::list))
            .route("/{id}", web::get().to(agreements::read))
            .route("/{id}/approve", web::post().to(agreements::approve))
            .route("/{id}/decline", web::post().to(agreements::decline)),
    );
    cfg.route("/dashboard/stats", web::get().to(agreements::stats));
}
