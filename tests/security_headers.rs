#![cfg(feature = "inmem-store")]

use actix_web::{test, web, App};
use moddesk::rate_limit::RateLimiterFacade;
use moddesk::repo::inmem::InMemRepo;
use moddesk::{config, AppConfig, AppState, SecurityHeaders};
use std::sync::Arc;

fn state() -> web::Data<AppState> {
    web::Data::new(AppState {
        repo: Arc::new(InMemRepo::new()),
        config: Arc::new(AppConfig::instant()),
        limiter: RateLimiterFacade::disabled(),
    })
}

#[actix_web::test]
#[serial_test::serial]
async fn security_headers_present() {
    std::env::remove_var("ENABLE_HSTS");
    let app = test::init_service(App::new().wrap(SecurityHeaders::from_env()).app_data(state()).configure(config)).await;
    let req = test::TestRequest::get().uri("/api/v1/dashboard").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert!(headers.get("content-security-policy").is_some());
    assert_eq!(headers.get("referrer-policy").unwrap(), "no-referrer");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
    assert!(headers.get("strict-transport-security").is_none());
}

#[actix_web::test]
#[serial_test::serial]
async fn headers_also_on_errors() {
    let app = test::init_service(App::new().wrap(SecurityHeaders::default()).app_data(state()).configure(config)).await;
    let req = test::TestRequest::get().uri("/api/v1/content/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.headers().get("x-content-type-options").unwrap(), "nosniff");
}

#[actix_web::test]
#[serial_test::serial]
async fn hsts_enabled_via_builder() {
    let sec = SecurityHeaders::default().with_hsts(true);
    let app = test::init_service(App::new().wrap(sec).app_data(state()).configure(config)).await;
    let req = test::TestRequest::get().uri("/api/v1/websites").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.headers().get("strict-transport-security").is_some(), "HSTS header missing");
}

#[actix_web::test]
#[serial_test::serial]
async fn env_var_enables_hsts() {
    std::env::set_var("ENABLE_HSTS", "1");
    let app = test::init_service(App::new().wrap(SecurityHeaders::from_env()).app_data(state()).configure(config)).await;
    let req = test::TestRequest::get().uri("/api/v1/websites").to_request();
    let resp = test::call_service(&app, req).await;
    std::env::remove_var("ENABLE_HSTS");
    assert!(resp.headers().get("strict-transport-security").is_some());
}
