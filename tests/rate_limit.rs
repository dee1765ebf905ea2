#![cfg(feature = "inmem-store")]

use actix_web::{test, web, App};
use moddesk::rate_limit::{InMemoryRateLimiter, RateLimitConfig, RateLimiterFacade};
use moddesk::repo::inmem::InMemRepo;
use moddesk::{config, AppConfig, AppState};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn limited_state(cfg: RateLimitConfig) -> web::Data<AppState> {
    web::Data::new(AppState {
        repo: Arc::new(InMemRepo::new()),
        config: Arc::new(AppConfig::instant()),
        limiter: RateLimiterFacade::new(InMemoryRateLimiter::new(true), cfg),
    })
}

#[actix_web::test]
async fn password_reset_is_limited_per_email() {
    let cfg = RateLimitConfig { reset_limit: 2, reset_window: Duration::from_secs(300), ..Default::default() };
    let app = test::init_service(App::new().app_data(limited_state(cfg)).configure(config)).await;

    let send = |email: &str| {
        test::TestRequest::post()
            .uri("/api/v1/auth/forgot-password")
            .set_json(json!({ "email": email }))
            .to_request()
    };
    assert!(test::call_service(&app, send("jane.smith@company.com")).await.status().is_success());
    assert!(test::call_service(&app, send("Jane.Smith@company.com")).await.status().is_success());
    let resp = test::call_service(&app, send("jane.smith@company.com")).await;
    assert_eq!(resp.status(), 429);

    // other addresses are unaffected
    assert!(test::call_service(&app, send("omar.haddad@company.com")).await.status().is_success());
}

#[actix_web::test]
async fn invite_resend_is_limited_per_account() {
    let cfg = RateLimitConfig { invite_limit: 1, invite_window: Duration::from_secs(300), ..Default::default() };
    let app = test::init_service(App::new().app_data(limited_state(cfg)).configure(config)).await;

    let resend = || test::TestRequest::post().uri("/api/v1/users/mod_4/resend-invite").to_request();
    assert!(test::call_service(&app, resend()).await.status().is_success());
    assert_eq!(test::call_service(&app, resend()).await.status(), 429);
}

#[actix_web::test]
async fn rejected_resends_do_not_spend_quota() {
    let cfg = RateLimitConfig { invite_limit: 1, invite_window: Duration::from_secs(300), ..Default::default() };
    let app = test::init_service(App::new().app_data(limited_state(cfg)).configure(config)).await;

    let resend = |id: &str| test::TestRequest::post().uri(&format!("/api/v1/users/{id}/resend-invite")).to_request();
    for _ in 0..3 {
        assert_eq!(test::call_service(&app, resend("mod_404")).await.status(), 404);
        // mod_2 is active, not pending
        assert_eq!(test::call_service(&app, resend("mod_2")).await.status(), 409);
    }
    assert!(test::call_service(&app, resend("mod_4")).await.status().is_success());
    assert_eq!(test::call_service(&app, resend("mod_4")).await.status(), 429);
}
