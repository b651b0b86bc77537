use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use agreement_dashboard::api::mock_store::MockStore;
use agreement_dashboard::api::postgres::PgAgreementApi;
use agreement_dashboard::api::{AgreementApi, SnapshotSource};
use agreement_dashboard::config::AppConfig;
use agreement_dashboard::dashboard::DashboardRegistry;
use agreement_dashboard::{db, handlers};

/// Pick the agreement backend: Postgres when configured, else the mock store.
async fn build_backend(
    config: &AppConfig,
) -> std::io::Result<(Arc<dyn AgreementApi>, Option<Arc<dyn SnapshotSource>>)> {
    match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url).await.map_err(std::io::Error::other)?;
            db::run_migrations(&pool).await.map_err(std::io::Error::other)?;
            db::seed_agreements(&pool)
                .await
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            log::info!("Using Postgres agreement backend");
            let api: Arc<dyn AgreementApi> = Arc::new(PgAgreementApi::new(pool));
            Ok((api, None))
        }
        None => {
            let store = Arc::new(MockStore::seeded().map_err(std::io::Error::other)?);
            log::warn!("DATABASE_URL not set, using in-memory mock store");
            let api: Arc<dyn AgreementApi> = store.clone();
            let snapshot: Arc<dyn SnapshotSource> = store;
            Ok((api, Some(snapshot)))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();
    let (api, snapshot) = build_backend(&config).await?;

    let registry = DashboardRegistry::new(
        api.clone(),
        snapshot,
        config.dashboard_settings(),
        config.max_dashboard_sessions,
    );

    // Session encryption key: SESSION_KEY keeps sessions valid across restarts
    let secret_key = match &config.session_key {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    log::info!("Starting server at http://{}", config.bind_addr);

    let api_data: web::Data<dyn AgreementApi> = web::Data::from(api);
    let registry_data = web::Data::new(registry);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(false)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(api_data.clone())
            .app_data(registry_data.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
