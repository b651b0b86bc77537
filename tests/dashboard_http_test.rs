/// The server-rendered dashboard: session cookie, CSRF-checked form posts and
/// the POST-redirect-GET approve flow.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};

use agreement_dashboard::api::{AgreementApi, SnapshotSource};
use agreement_dashboard::dashboard::{DashboardRegistry, DashboardSettings};
use agreement_dashboard::handlers;

mod common;
use common::*;

/// Browser stand-in that keeps the latest session cookie.
struct Browser {
    cookie: Option<Cookie<'static>>,
}

impl Browser {
    fn new() -> Self {
        Self { cookie: None }
    }

    fn remember<B>(&mut self, resp: &ServiceResponse<B>) {
        if let Some(c) = resp.response().cookies().find(|c| c.name() == "id") {
            self.cookie = Some(c.into_owned());
        }
    }

    fn with_cookie(&self, req: test::TestRequest) -> test::TestRequest {
        match &self.cookie {
            Some(c) => req.cookie(c.clone()),
            None => req,
        }
    }
}

/// GET with the browser's cookie; yields (status, body).
macro_rules! get {
    ($app:expr, $browser:expr, $uri:expr) => {{
        let req = $browser.with_cookie(test::TestRequest::get().uri($uri)).to_request();
        let resp = test::call_service(&$app, req).await;
        $browser.remember(&resp);
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }};
}

/// Form POST with the browser's cookie; yields (status, Location).
macro_rules! post {
    ($app:expr, $browser:expr, $uri:expr, $form:expr) => {
        post!($app, $browser, test::TestRequest::post().uri($uri).set_form($form))
    };
    ($app:expr, $browser:expr, $req:expr) => {{
        let req = $browser.with_cookie($req).to_request();
        let resp = test::call_service(&$app, req).await;
        $browser.remember(&resp);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        (resp.status(), location)
    }};
}

fn csrf_token(html: &str) -> String {
    let marker = r#"name="csrf-token" content=""#;
    let start = html.find(marker).expect("csrf meta tag") + marker.len();
    let end = html[start..].find('"').expect("closing quote");
    html[start..start + end].to_string()
}

macro_rules! dashboard_app {
    () => {
        dashboard_app!(seeded_store())
    };
    ($store:expr) => {{
        let store = $store;
        let api: Arc<dyn AgreementApi> = store.clone();
        let snapshot: Arc<dyn SnapshotSource> = store;
        let registry = DashboardRegistry::new(api.clone(), Some(snapshot), DashboardSettings::default(), 16);
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::from(api))
                .app_data(web::Data::new(registry))
                .configure(handlers::configure),
        )
        .await
    }};
}

#[actix_web::test]
async fn test_dashboard_renders_pending_tab() {
    let app = dashboard_app!();
    let mut browser = Browser::new();

    let (status, html) = get!(app, browser, "/dashboard");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Pending (4)"));
    assert!(html.contains("All (12)"));
    assert!(html.contains("AGR-110"));
    assert!(!html.contains("AGR-102"), "active agreements are not on the pending tab");
    assert!(html.contains("agreement-actions-menu-agr-100"));
}

#[actix_web::test]
async fn test_approve_through_confirmation_modal() {
    let app = dashboard_app!();
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    let (status, location) =
        post!(app, browser, "/dashboard/agreements/agr-100/approve", &[("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.starts_with("/dashboard?r="));

    let (_, html) = get!(app, browser, &location);
    assert!(html.contains(
        "Are you sure you want to approve agreement AGR-100? This will change its status to ACTIVE."
    ));

    let (status, location) = post!(app, browser, "/dashboard/confirm", &[("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, html) = get!(app, browser, &location);
    assert!(html.contains("Agreement AGR-100 approved successfully!"));
    assert!(html.contains("Pending (3)"));
    assert!(html.contains("Active (4)"));
    assert!(!html.contains("Are you sure"));
}

#[actix_web::test]
async fn test_tab_post_switches_filter() {
    let app = dashboard_app!();
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    let (status, location) = post!(app, browser, "/dashboard/tab", &[("tab", "2"), ("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);

    let (_, html) = get!(app, browser, &location);
    assert!(html.contains("AGR-104"));
    assert!(html.contains("AGR-105"));
    assert!(!html.contains("AGR-110"));
}

#[actix_web::test]
async fn test_post_without_csrf_token_is_forbidden() {
    let app = dashboard_app!();
    let mut browser = Browser::new();
    get!(app, browser, "/dashboard");

    let (status, _) = post!(app, browser, "/dashboard/agreements/agr-100/approve", &[("csrf_token", "forged")]);
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_agreement_detail_and_missing() {
    let app = dashboard_app!();
    let mut browser = Browser::new();

    let (status, html) = get!(app, browser, "/agreements/agr-101");
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Office lease, Oslo"));

    let (status, _) = get!(app, browser, "/agreements/agr-999");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_create_form_round_trip() {
    let app = dashboard_app!();
    let mut browser = Browser::new();

    let (status, html) = get!(app, browser, "/agreements/new");
    assert_eq!(status, StatusCode::OK);
    let token = csrf_token(&html);

    let form = [
        ("title", "Warehouse lease"),
        ("counterparty", "Acme Corp"),
        ("owner", "Dana Reyes"),
        ("value", "12,500.00"),
        ("currency", "EUR"),
        ("start_date", "2026-11-01"),
        ("end_date", "2027-10-31"),
        ("csrf_token", token.as_str()),
    ];
    let (status, location) = post!(app, browser, "/agreements", &form);
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert!(location.starts_with("/agreements/"));

    let (_, html) = get!(app, browser, "/dashboard");
    assert!(html.contains("Drafts (3)"));
}

#[actix_web::test]
async fn test_following_own_redirect_keeps_cached_page_once() {
    let store = seeded_store();
    let app = dashboard_app!(store.clone());
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    let (status, location) = post!(app, browser, "/dashboard/toast/close", &[("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    store.approve_agreement("agr-110").await.expect("approve behind the page");

    let (_, html) = get!(app, browser, &location);
    assert!(html.contains("Pending (4)"), "the page's own redirect shows what it already had");
    assert!(html.contains("AGR-110"));

    // The marker is spent; the same URL now counts as arriving at the page.
    let (_, html) = get!(app, browser, &location);
    assert!(html.contains("Pending (3)"));
    assert!(!html.contains("AGR-110"));
}

#[actix_web::test]
async fn test_unfollowed_redirect_does_not_suppress_later_arrival() {
    let store = seeded_store();
    let app = dashboard_app!(store.clone());
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    // A background close that never follows its redirect.
    let (status, _) = post!(app, browser, "/dashboard/toast/close", &[("csrf_token", token.as_str())]);
    assert_eq!(status, StatusCode::SEE_OTHER);
    store.approve_agreement("agr-110").await.expect("approve behind the page");

    let (status, _) = get!(app, browser, "/agreements/agr-100");
    assert_eq!(status, StatusCode::OK);

    let (_, html) = get!(app, browser, "/dashboard");
    assert!(html.contains("Pending (3)"));
    assert!(!html.contains("AGR-110"));
}

#[actix_web::test]
async fn test_plain_dashboard_get_refetches_after_unfollowed_redirect() {
    let store = seeded_store();
    let app = dashboard_app!(store.clone());
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    post!(app, browser, "/dashboard/toast/close", &[("csrf_token", token.as_str())]);
    store.approve_agreement("agr-110").await.expect("approve behind the page");

    let (_, html) = get!(app, browser, "/dashboard");
    assert!(html.contains("Pending (3)"));
}

#[actix_web::test]
async fn test_background_toast_close_returns_no_content() {
    let store = seeded_store();
    let app = dashboard_app!(store.clone());
    let mut browser = Browser::new();

    let (_, html) = get!(app, browser, "/dashboard");
    let token = csrf_token(&html);

    let req = test::TestRequest::post()
        .uri("/dashboard/toast/close")
        .insert_header(("X-Dashboard-Background", "1"))
        .set_form([("csrf_token", token.as_str())]);
    let (status, location) = post!(app, browser, req);
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(location.is_empty());

    store.approve_agreement("agr-110").await.expect("approve behind the page");
    let (_, html) = get!(app, browser, "/dashboard");
    assert!(html.contains("Pending (3)"));
}
