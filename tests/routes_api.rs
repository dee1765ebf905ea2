#![cfg(feature = "inmem-store")]

use actix_web::{body::MessageBody, dev::ServiceResponse, test, App};
use moddesk::rate_limit::RateLimiterFacade;
use moddesk::repo::inmem::InMemRepo;
use moddesk::{config, AppConfig, AppState, SecurityHeaders};
use serde_json::{json, Value};
use std::sync::Arc;

fn state() -> AppState {
    AppState {
        repo: Arc::new(InMemRepo::new()),
        config: Arc::new(AppConfig::instant()),
        limiter: RateLimiterFacade::disabled(),
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(SecurityHeaders::default())
                .app_data(actix_web::web::Data::new($state))
                .configure(config),
        )
        .await
    };
}

async fn body_json<B: MessageBody>(resp: ServiceResponse<B>) -> Value {
    serde_json::from_slice(&test::read_body(resp).await).unwrap()
}

#[actix_web::test]
async fn dashboard_reports_counts() {
    let app = app!(state());
    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/dashboard").to_request()).await;
    assert!(resp.status().is_success());
    let v = body_json(resp).await;
    let pending = v["stats"]["total_pending"].as_u64().unwrap();
    assert!(pending > 0);
    let recent = v["recent_pending"].as_array().unwrap();
    assert!(recent.len() <= 5);
    assert!(recent.iter().all(|c| c["status"] == "pending"));
    assert!(v["pending_reports"].as_u64().unwrap() > 0);
}

#[actix_web::test]
async fn content_review_flow() {
    let app = app!(state());

    let req = test::TestRequest::get().uri("/api/v1/content?status=pending&type=review").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let items = body_json(resp).await;
    let items = items.as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.iter().all(|c| c["type"] == "review" && c["status"] == "pending"));
    let id = items[0]["id"].as_str().unwrap().to_string();

    // a takedown without a reason changes nothing
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/content/{id}/take-down"))
        .set_json(json!({"reason": ""}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/content/{id}/take-down"))
        .set_json(json!({"reason": "Spam"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let item = body_json(resp).await;
    assert_eq!(item["status"], "taken_down");
    assert_eq!(item["reason"], "Spam");
    assert_eq!(item["moderated_by"], "Admin User");

    // reversal is allowed
    let req = test::TestRequest::post().uri(&format!("/api/v1/content/{id}/approve")).to_request();
    let item = body_json(test::call_service(&app, req).await).await;
    assert_eq!(item["status"], "approved");
    assert!(item["reason"].is_null());

    let req = test::TestRequest::get().uri("/api/v1/content/activity").to_request();
    let log = body_json(test::call_service(&app, req).await).await;
    let log = log.as_array().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0]["action"], "approved");
    assert_eq!(log[1]["action"], "taken_down");

    let req = test::TestRequest::get().uri("/api/v1/content/activity?action=taken_down").to_request();
    let log = body_json(test::call_service(&app, req).await).await;
    assert_eq!(log.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn unknown_content_is_404() {
    let app = app!(state());
    let req = test::TestRequest::post().uri("/api/v1/content/missing/approve").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let v = body_json(resp).await;
    assert!(v["error"].is_string());

    let req = test::TestRequest::get().uri("/api/v1/content/missing").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn bad_filter_value_is_400() {
    let app = app!(state());
    for uri in [
        "/api/v1/content?status=deleted",
        "/api/v1/reports?priority=urgent",
        "/api/v1/violators?status=jailed",
        "/api/v1/users?role=owner",
    ] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(resp.status(), 400, "{uri}");
    }
    // "all" is the same as no filter
    let req = test::TestRequest::get().uri("/api/v1/content?status=all&type=all").to_request();
    let all = body_json(test::call_service(&app, req).await).await;
    let req = test::TestRequest::get().uri("/api/v1/content").to_request();
    let none = body_json(test::call_service(&app, req).await).await;
    assert_eq!(all.as_array().unwrap().len(), none.as_array().unwrap().len());
}

#[actix_web::test]
async fn takedown_reasons_listed() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/v1/content/takedown-reasons").to_request();
    let v = body_json(test::call_service(&app, req).await).await;
    let reasons: Vec<_> = v.as_array().unwrap().iter().map(|r| r.as_str().unwrap().to_string()).collect();
    assert!(reasons.contains(&"Spam".to_string()));
    assert!(reasons.contains(&"Other".to_string()));
}

#[actix_web::test]
async fn report_resolution_flow() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/v1/reports?priority=high&status=pending").to_request();
    let rows = body_json(test::call_service(&app, req).await).await;
    let rows = rows.as_array().unwrap();
    assert!(!rows.is_empty());
    assert!(rows.iter().all(|r| r["priority"] == "high" && r["report_count"].as_u64().unwrap() >= 3));
    let id = rows[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get().uri(&format!("/api/v1/reports/{id}")).to_request();
    let detail = body_json(test::call_service(&app, req).await).await;
    assert_eq!(detail["reporters"].as_array().unwrap().len() as u64, detail["report_count"].as_u64().unwrap());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/reports/{id}/resolve"))
        .set_json(json!({"resolution": "no_action"}))
        .to_request();
    let row = body_json(test::call_service(&app, req).await).await;
    assert_eq!(row["status"], "dismissed");
    assert_eq!(row["resolution"], "no_action");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/reports/{id}/resolve"))
        .set_json(json!({"resolution": "content_removed"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::post()
        .uri("/api/v1/reports/nope/resolve")
        .set_json(json!({"resolution": "warning_issued"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::get().uri("/api/v1/reports/activity").to_request();
    let log = body_json(test::call_service(&app, req).await).await;
    assert_eq!(log.as_array().unwrap().len(), 1);
    assert_eq!(log[0]["action"], "dismissed");
}

#[actix_web::test]
async fn penalty_flow() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/v1/violators?status=banned").to_request();
    let rows = body_json(test::call_service(&app, req).await).await;
    let id = rows[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/violators/{id}/penalty"))
        .set_json(json!({"status": "none"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let row = body_json(resp).await;
    assert_eq!(row["penalty_status"], "none");
    assert!(row["account_age_days"].is_number());

    let req = test::TestRequest::get().uri("/api/v1/violators/activity").to_request();
    let log = body_json(test::call_service(&app, req).await).await;
    assert_eq!(log[0]["previous_status"], "banned");
    assert_eq!(log[0]["new_status"], "none");
    assert_eq!(log[0]["escalation"], false);

    let req = test::TestRequest::post()
        .uri("/api/v1/violators/v404/penalty")
        .set_json(json!({"status": "warned"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn user_admin_flow() {
    let app = app!(state());

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": "Priya Nair", "email": "priya@company.com", "role": "moderator", "websites": []}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);

    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": "Priya Nair", "email": "priya@company.com", "role": "moderator", "websites": ["w1"]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let user = body_json(resp).await;
    assert_eq!(user["status"], "pending");
    let id = user["id"].as_str().unwrap().to_string();

    // duplicate email
    let req = test::TestRequest::post()
        .uri("/api/v1/users")
        .set_json(json!({"name": "Priya Again", "email": "PRIYA@company.com", "role": "admin"}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::get().uri(&format!("/api/v1/users/{id}/invite-link")).to_request();
    let link = body_json(test::call_service(&app, req).await).await;
    assert!(link["link"].as_str().unwrap().starts_with("http://localhost:3000/auth/set-password?token="));

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/users/{id}"))
        .set_json(json!({"role": "moderator", "websites": ["w1", "w3"]}))
        .to_request();
    let user = body_json(test::call_service(&app, req).await).await;
    assert_eq!(user["website_access"]["assigned"], json!(["w1", "w3"]));

    let req = test::TestRequest::post().uri(&format!("/api/v1/users/{id}/resend-invite")).to_request();
    assert!(test::call_service(&app, req).await.status().is_success());

    let req = test::TestRequest::post().uri(&format!("/api/v1/users/{id}/activate")).to_request();
    let user = body_json(test::call_service(&app, req).await).await;
    assert_eq!(user["status"], "active");

    // no longer pending: no link, no resend
    let req = test::TestRequest::get().uri(&format!("/api/v1/users/{id}/invite-link")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
    let req = test::TestRequest::post().uri(&format!("/api/v1/users/{id}/resend-invite")).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 409);

    let req = test::TestRequest::get().uri("/api/v1/users/activity").to_request();
    let log = body_json(test::call_service(&app, req).await).await;
    let actions: Vec<_> = log.as_array().unwrap().iter().map(|l| l["action"].as_str().unwrap().to_string()).collect();
    assert_eq!(actions, ["Activated User", "Resent Invitation", "Updated User", "Created User"]);
    assert_eq!(log[2]["details"], "Changed added websites: Travel Reviews");

    let req = test::TestRequest::get().uri("/api/v1/users?website=w3&role=moderator").to_request();
    let users = body_json(test::call_service(&app, req).await).await;
    assert!(users.as_array().unwrap().iter().any(|u| u["id"] == id));
}

#[actix_web::test]
async fn websites_listed() {
    let app = app!(state());
    let req = test::TestRequest::get().uri("/api/v1/websites").to_request();
    let sites = body_json(test::call_service(&app, req).await).await;
    assert_eq!(sites.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn password_screens() {
    let app = app!(state());

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/forgot-password")
        .set_json(json!({"email": "  "}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/forgot-password")
        .set_json(json!({"email": "jane.smith@company.com"}))
        .to_request();
    let v = body_json(test::call_service(&app, req).await).await;
    assert_eq!(v["sent"], true);
    assert_eq!(v["email"], "jane.smith@company.com");

    // invite lookup never fails; garbage falls back to the demo address
    let req = test::TestRequest::get().uri("/api/v1/auth/invite?token=not-a-token").to_request();
    let v = body_json(test::call_service(&app, req).await).await;
    assert_eq!(v["email"], "demo@company.com");
    assert_eq!(v["valid"], true);

    let token = moddesk::invite::generate_token("leo.turner@company.com", chrono::Utc::now());
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/auth/invite?token={}", urlencoding::encode(&token)))
        .to_request();
    let v = body_json(test::call_service(&app, req).await).await;
    assert_eq!(v["email"], "leo.turner@company.com");

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/set-password")
        .set_json(json!({"token": token, "password": "short", "confirm_password": "other"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
    let err = body_json(resp).await;
    assert!(err["error"].as_str().unwrap().contains("Passwords must match"));

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/set-password")
        .set_json(json!({"token": token, "password": "Str0ngPass!", "confirm_password": "Str0ngPass!"}))
        .to_request();
    let v = body_json(test::call_service(&app, req).await).await;
    assert_eq!(v["success"], true);
    assert_eq!(v["email"], "leo.turner@company.com");
}
