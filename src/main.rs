use actix_cors::Cors;
use actix_web::{middleware::Compress, App, HttpServer};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi; // bring trait into scope for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

use moddesk::openapi::ApiDoc;
use moddesk::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use moddesk::repo::inmem::InMemRepo;
use moddesk::{config, AppConfig, AppState, SecurityHeaders};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env automatically only in debug builds.
    if cfg!(debug_assertions) {
        let _ = dotenv::dotenv();
    }

    // Structured logging initialisation
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let app_config = Arc::new(AppConfig::from_env()?);
    info!("Bootstrapping moderation back office");
    info!("Frontend URL: {}", app_config.frontend_url);
    info!("Bearer tokens accepted: {}", app_config.jwt_secret.is_some());
    if app_config.jwt_secret.is_none() {
        info!("Requests act as demo moderator '{}'", app_config.demo_moderator);
    }

    // every restart reseeds the mock data
    let repo = InMemRepo::new();
    let limiter = RateLimiterFacade::new(InMemoryRateLimiter::new(true), RateLimitConfig::from_env());
    let state = AppState { repo: Arc::new(repo), config: app_config.clone(), limiter };

    let openapi = ApiDoc::openapi();
    let security = SecurityHeaders::from_env();
    let frontend_url = app_config.frontend_url.clone();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allow_any_header()
            .allowed_methods(["GET", "POST", "PATCH", "OPTIONS"])
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(security.clone())
            .wrap(cors)
            .app_data(actix_web::web::Data::new(state.clone()))
            .configure(config)
            .service(SwaggerUi::new("/docs/{_:.*}").url("/docs/openapi.json", openapi.clone()))
    })
    .bind(app_config.bind_addr.as_str())?;

    info!("Listening on http://{}", app_config.bind_addr);
    server.run().await?;
    Ok(())
}
