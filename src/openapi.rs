use utoipa::OpenApi;

use crate::auth::Role;
use crate::invite::Requirement;
use crate::models::*;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::dashboard,
        routes::list_websites,
        routes::list_content,
        routes::get_content,
        routes::approve_content,
        routes::take_down_content,
        routes::content_activity,
        routes::takedown_reasons,
        routes::list_reports,
        routes::get_report,
        routes::resolve_report,
        routes::report_activity,
        routes::list_violators,
        routes::set_penalty,
        routes::penalty_activity,
        routes::list_users,
        routes::create_user,
        routes::update_user,
        routes::activate_user,
        routes::deactivate_user,
        routes::resend_invite,
        routes::invite_link,
        routes::user_activity,
        routes::forgot_password,
        routes::lookup_invite,
        routes::set_password,
    ),
    components(schemas(
        ContentType, ContentStatus, MediaKind, MediaAttachment, ContentItem, ModerationStats,
        ContentAction, ContentActivity,
        ReportStatus, ReportReason, Resolution, Priority, ContentReport, ReportRow, Reporter,
        ReportDetail, ReportAction, ReportActivity,
        PenaltyStatus, ViolationRecord, Violator, ViolatorRow, PenaltyActivity,
        Role, UserStatus, WebsiteAccess, ModeratorUser, NewModeratorUser, UpdateModeratorUser,
        UserActivity, Website, Requirement,
        routes::DashboardResponse, routes::TakeDownRequest, routes::ResolveRequest,
        routes::PenaltyRequest, routes::InviteLinkResponse, routes::ForgotPasswordRequest,
        routes::ForgotPasswordResponse, routes::InviteLookup, routes::SetPasswordRequest,
        routes::SetPasswordResponse,
    )),
    tags((name = "moddesk", description = "Content moderation back office"))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_moderation_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/v1/content/{id}/take-down"));
        assert!(paths.contains_key("/api/v1/violators/{id}/penalty"));
        assert!(paths.contains_key("/api/v1/auth/set-password"));
    }
}
