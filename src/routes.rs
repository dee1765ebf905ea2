use std::sync::Arc;

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Actor;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::filters::*;
use crate::invite;
use crate::models::*;
use crate::rate_limit::RateLimiterFacade;
use crate::repo::Repo;
use crate::seed::TAKEDOWN_REASONS;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(web::resource("/dashboard").route(web::get().to(dashboard)))
            .service(web::resource("/websites").route(web::get().to(list_websites)))
            // content queue (fixed paths before /content/{id})
            .service(web::resource("/content").route(web::get().to(list_content)))
            .service(web::resource("/content/activity").route(web::get().to(content_activity)))
            .service(web::resource("/content/takedown-reasons").route(web::get().to(takedown_reasons)))
            .service(web::resource("/content/{id}").route(web::get().to(get_content)))
            .service(web::resource("/content/{id}/approve").route(web::post().to(approve_content)))
            .service(web::resource("/content/{id}/take-down").route(web::post().to(take_down_content)))
            // reports
            .service(web::resource("/reports").route(web::get().to(list_reports)))
            .service(web::resource("/reports/activity").route(web::get().to(report_activity)))
            .service(web::resource("/reports/{id}").route(web::get().to(get_report)))
            .service(web::resource("/reports/{id}/resolve").route(web::post().to(resolve_report)))
            // repeat violators
            .service(web::resource("/violators").route(web::get().to(list_violators)))
            .service(web::resource("/violators/activity").route(web::get().to(penalty_activity)))
            .service(web::resource("/violators/{id}/penalty").route(web::post().to(set_penalty)))
            // moderator accounts
            .service(
                web::resource("/users")
                    .route(web::get().to(list_users))
                    .route(web::post().to(create_user)),
            )
            .service(web::resource("/users/activity").route(web::get().to(user_activity)))
            .service(web::resource("/users/{id}").route(web::patch().to(update_user)))
            .service(web::resource("/users/{id}/activate").route(web::post().to(activate_user)))
            .service(web::resource("/users/{id}/deactivate").route(web::post().to(deactivate_user)))
            .service(web::resource("/users/{id}/resend-invite").route(web::post().to(resend_invite)))
            .service(web::resource("/users/{id}/invite-link").route(web::get().to(invite_link)))
            // auth screens
            .service(web::resource("/auth/forgot-password").route(web::post().to(forgot_password)))
            .service(web::resource("/auth/invite").route(web::get().to(lookup_invite)))
            .service(web::resource("/auth/set-password").route(web::post().to(set_password))),
    );
}

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repo>,
    pub config: Arc<AppConfig>,
    pub limiter: RateLimiterFacade,
}

macro_rules! ensure_admin { ($actor:expr) => { if !$actor.is_admin() { return Err(ApiError::Forbidden); } }; }

// ---------------- Dashboard ---------------------------------------

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: ModerationStats,
    pub recent_pending: Vec<ContentItem>,
    pub pending_reports: usize,
}

const RECENT_PENDING: usize = 5;

#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses((status = 200, description = "Moderation overview", body = DashboardResponse))
)]
pub async fn dashboard(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let stats = data.repo.content_stats().await?;
    let pending = ContentFilter { status: Some(ContentStatus::Pending), ..Default::default() };
    let mut recent_pending = data.repo.list_content(pending).await?;
    recent_pending.truncate(RECENT_PENDING);
    let pending_reports = data.repo.pending_report_count().await?;
    Ok(HttpResponse::Ok().json(DashboardResponse { stats, recent_pending, pending_reports }))
}

#[utoipa::path(
    get,
    path = "/api/v1/websites",
    responses((status = 200, description = "Moderated websites", body = [Website]))
)]
pub async fn list_websites(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.list_websites().await?))
}

// ---------------- Content queue -----------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/content",
    params(ContentQuery),
    responses(
        (status = 200, description = "Content matching every given filter", body = [ContentItem]),
        (status = 400, description = "Unknown filter value")
    )
)]
pub async fn list_content(data: web::Data<AppState>, query: web::Query<ContentQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(data.repo.list_content(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/{id}",
    params(("id" = String, Path, description = "Content id")),
    responses(
        (status = 200, description = "Content item", body = ContentItem),
        (status = 404, description = "Content not found")
    )
)]
pub async fn get_content(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.get_content(&path.into_inner()).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/content/{id}/approve",
    params(("id" = String, Path, description = "Content id")),
    responses(
        (status = 200, description = "Content approved", body = ContentItem),
        (status = 404, description = "Content not found")
    )
)]
pub async fn approve_content(actor: Actor, data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let item = data.repo.approve_content(&path.into_inner(), &actor.name).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TakeDownRequest {
    pub reason: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/content/{id}/take-down",
    params(("id" = String, Path, description = "Content id")),
    request_body = TakeDownRequest,
    responses(
        (status = 200, description = "Content taken down", body = ContentItem),
        (status = 404, description = "Content not found"),
        (status = 422, description = "Reason missing")
    )
)]
pub async fn take_down_content(
    actor: Actor,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<TakeDownRequest>,
) -> Result<HttpResponse, ApiError> {
    let item = data.repo.take_down_content(&path.into_inner(), &payload.reason, &actor.name).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/activity",
    params(ContentActivityQuery),
    responses((status = 200, description = "Content decisions, newest first", body = [ContentActivity]))
)]
pub async fn content_activity(data: web::Data<AppState>, query: web::Query<ContentActivityQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(data.repo.content_activity(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/content/takedown-reasons",
    responses((status = 200, description = "Preset takedown reasons", body = [String]))
)]
pub async fn takedown_reasons() -> HttpResponse {
    HttpResponse::Ok().json(TAKEDOWN_REASONS)
}

// ---------------- Reports -----------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Reports with derived priority", body = [ReportRow]),
        (status = 400, description = "Unknown filter value")
    )
)]
pub async fn list_reports(data: web::Data<AppState>, query: web::Query<ReportQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(data.repo.list_reports(filter).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/{id}",
    params(("id" = String, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report with every reporter of the same content", body = ReportDetail),
        (status = 404, description = "Report not found")
    )
)]
pub async fn get_report(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.get_report(&path.into_inner()).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    pub resolution: Resolution,
}

#[utoipa::path(
    post,
    path = "/api/v1/reports/{id}/resolve",
    params(("id" = String, Path, description = "Report id")),
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Report resolved or dismissed", body = ReportRow),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report already settled")
    )
)]
pub async fn resolve_report(
    actor: Actor,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ResolveRequest>,
) -> Result<HttpResponse, ApiError> {
    let row = data.repo.resolve_report(&path.into_inner(), payload.resolution, &actor.name).await?;
    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/activity",
    responses((status = 200, description = "Report decisions, newest first", body = [ReportActivity]))
)]
pub async fn report_activity(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.report_activity().await?))
}

// ---------------- Violators ---------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/violators",
    params(ViolatorQuery),
    responses(
        (status = 200, description = "Violators, most violations first", body = [ViolatorRow]),
        (status = 400, description = "Unknown filter value")
    )
)]
pub async fn list_violators(data: web::Data<AppState>, query: web::Query<ViolatorQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(data.repo.list_violators(filter).await?))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PenaltyRequest {
    pub status: PenaltyStatus,
}

#[utoipa::path(
    post,
    path = "/api/v1/violators/{id}/penalty",
    params(("id" = String, Path, description = "Violator id")),
    request_body = PenaltyRequest,
    responses(
        (status = 200, description = "Penalty applied", body = ViolatorRow),
        (status = 404, description = "Violator not found")
    )
)]
pub async fn set_penalty(
    actor: Actor,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<PenaltyRequest>,
) -> Result<HttpResponse, ApiError> {
    let row = data.repo.set_penalty(&path.into_inner(), payload.status, &actor.name).await?;
    Ok(HttpResponse::Ok().json(row))
}

#[utoipa::path(
    get,
    path = "/api/v1/violators/activity",
    responses((status = 200, description = "Penalty changes, newest first", body = [PenaltyActivity]))
)]
pub async fn penalty_activity(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.penalty_activity().await?))
}

// ---------------- Moderator accounts ------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Moderator accounts", body = [ModeratorUser]),
        (status = 400, description = "Unknown filter value")
    )
)]
pub async fn list_users(data: web::Data<AppState>, query: web::Query<UserQuery>) -> Result<HttpResponse, ApiError> {
    let filter = query.into_inner().into_filter().map_err(ApiError::BadRequest)?;
    Ok(HttpResponse::Ok().json(data.repo.list_users(filter).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = NewModeratorUser,
    responses(
        (status = 201, description = "Account created and invited", body = ModeratorUser),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Missing name, email or websites")
    )
)]
pub async fn create_user(
    actor: Actor,
    data: web::Data<AppState>,
    payload: web::Json<NewModeratorUser>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(actor);
    let user = data.repo.create_user(payload.into_inner(), &actor.name).await?;
    Ok(HttpResponse::Created().json(user))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "Account id")),
    request_body = UpdateModeratorUser,
    responses(
        (status = 200, description = "Account updated", body = ModeratorUser),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Moderator without websites")
    )
)]
pub async fn update_user(
    actor: Actor,
    data: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateModeratorUser>,
) -> Result<HttpResponse, ApiError> {
    ensure_admin!(actor);
    let user = data.repo.update_user(&path.into_inner(), payload.into_inner(), &actor.name).await?;
    Ok(HttpResponse::Ok().json(user))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/activate",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account active", body = ModeratorUser),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn activate_user(actor: Actor, data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    ensure_admin!(actor);
    Ok(HttpResponse::Ok().json(data.repo.set_user_active(&path.into_inner(), true, &actor.name).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/deactivate",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account inactive", body = ModeratorUser),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn deactivate_user(actor: Actor, data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    ensure_admin!(actor);
    Ok(HttpResponse::Ok().json(data.repo.set_user_active(&path.into_inner(), false, &actor.name).await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/resend-invite",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "New invitation issued", body = ModeratorUser),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account is not pending"),
        (status = 429, description = "Too many invitations")
    )
)]
pub async fn resend_invite(actor: Actor, data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    ensure_admin!(actor);
    let id = path.into_inner();
    // only a resend that would go out counts against the quota
    if data.repo.get_user(&id).await?.status != UserStatus::Pending {
        return Err(ApiError::Conflict);
    }
    if !data.limiter.allow_invite_resend(&id) {
        return Err(ApiError::TooManyRequests);
    }
    Ok(HttpResponse::Ok().json(data.repo.resend_invite(&id, &actor.name).await?))
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InviteLinkResponse {
    pub link: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/invite-link",
    params(("id" = String, Path, description = "Account id")),
    responses(
        (status = 200, description = "Set-password link", body = InviteLinkResponse),
        (status = 404, description = "Account not found or not invited")
    )
)]
pub async fn invite_link(data: web::Data<AppState>, path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let user = data.repo.get_user(&path.into_inner()).await?;
    let token = match (&user.status, &user.invite_token) {
        (UserStatus::Pending, Some(token)) => token,
        _ => return Err(ApiError::NotFound),
    };
    Ok(HttpResponse::Ok().json(InviteLinkResponse { link: invite::invite_link(&data.config.frontend_url, token) }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/activity",
    responses((status = 200, description = "Account changes, newest first", body = [UserActivity]))
)]
pub async fn user_activity(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    Ok(HttpResponse::Ok().json(data.repo.user_activity().await?))
}

// ---------------- Auth screens ------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub sent: bool,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email (simulated) sent", body = ForgotPasswordResponse),
        (status = 422, description = "Email missing"),
        (status = 429, description = "Too many reset requests")
    )
)]
pub async fn forgot_password(data: web::Data<AppState>, payload: web::Json<ForgotPasswordRequest>) -> Result<HttpResponse, ApiError> {
    let email = payload.email.trim();
    if email.is_empty() {
        return Err(ApiError::Validation("Please enter your email address".into()));
    }
    if !data.limiter.allow_password_reset(email) {
        return Err(ApiError::TooManyRequests);
    }
    // no mail is sent; the pause only paces the client like a real send would
    tokio::time::sleep(data.config.reset_email_delay).await;
    tracing::info!(%email, "password reset requested");
    Ok(HttpResponse::Ok().json(ForgotPasswordResponse { sent: true, email: email.to_string() }))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InviteQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InviteLookup {
    pub email: String,
    pub valid: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/invite",
    params(InviteQuery),
    responses((status = 200, description = "Invited email (demo address when the token is unusable)", body = InviteLookup))
)]
pub async fn lookup_invite(query: web::Query<InviteQuery>) -> HttpResponse {
    // unusable tokens are not an error: the screen still renders for the demo address
    HttpResponse::Ok().json(InviteLookup { email: invite::invited_email(query.token.as_deref()), valid: true })
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SetPasswordRequest {
    pub token: Option<String>,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetPasswordResponse {
    pub success: bool,
    pub email: String,
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/set-password",
    request_body = SetPasswordRequest,
    responses(
        (status = 200, description = "Password accepted (nothing is stored)", body = SetPasswordResponse),
        (status = 422, description = "Password rules not met")
    )
)]
pub async fn set_password(data: web::Data<AppState>, payload: web::Json<SetPasswordRequest>) -> Result<HttpResponse, ApiError> {
    let problems = invite::password_problems(&payload.password, &payload.confirm_password);
    if !problems.is_empty() {
        return Err(ApiError::Validation(problems.join("; ")));
    }
    let email = invite::invited_email(payload.token.as_deref());
    tokio::time::sleep(data.config.set_password_delay).await;
    tracing::info!(%email, "password set from invitation");
    Ok(HttpResponse::Ok().json(SetPasswordResponse { success: true, email }))
}
