use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

// String ids throughout; seeded records use short prefixes ("c1", "r1", "v1", "mod_1")
pub type Id = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    ProfilePicture,
    Review,
    Comment,
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentStatus {
    Pending,
    Approved,
    TakenDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MediaAttachment {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentItem {
    pub id: Id,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    pub user_id: Id,
    pub user_name: String,
    pub user_email: String,
    pub content: String, // URL for images, text otherwise
    pub thumbnail: Option<String>,
    pub title: Option<String>, // posts only
    pub rating: Option<u8>,    // reviews only, 1-5
    #[serde(default)]
    pub media: Vec<MediaAttachment>,
    pub website_id: Id,
    pub created_at: DateTime<Utc>,
    pub status: ContentStatus,
    pub moderated_at: Option<DateTime<Utc>>,
    pub moderated_by: Option<String>,
    pub reason: Option<String>, // takedown reason
    pub flag_count: u32,
    #[serde(default)]
    pub report_reasons: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ModerationStats {
    pub total_pending: usize,
    pub total_approved: usize,
    pub total_taken_down: usize,
    pub today_moderated: usize,
    pub flagged_content: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    Approved,
    TakenDown,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentActivity {
    pub id: String,
    pub moderator_name: String,
    pub action: ContentAction,
    pub content_id: Id,
    pub content_type: ContentType,
    pub user_name: String,
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ---------------- Reports -----------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    Spam,
    Harassment,
    HateSpeech,
    Inappropriate,
    Misinformation,
    Copyright,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    ContentRemoved,
    WarningIssued,
    NoAction,
}

impl Resolution {
    /// Dismissing a report is the `no_action` outcome; anything else resolves it.
    pub fn report_status(self) -> ReportStatus {
        match self {
            Resolution::NoAction => ReportStatus::Dismissed,
            Resolution::ContentRemoved | Resolution::WarningIssued => ReportStatus::Resolved,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Priority of a report given how many reports target the same content.
    pub fn from_report_count(count: usize) -> Self {
        match count {
            n if n >= 3 => Priority::High,
            2 => Priority::Medium,
            _ => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ContentReport {
    pub id: Id,
    pub content_id: Id,
    pub content_type: ContentType,
    pub content_preview: String,
    pub content_thumbnail: Option<String>,
    pub reporter_id: Id,
    pub reporter_name: String,
    pub reporter_email: String,
    pub target_user_id: Id,
    pub target_user_name: String,
    pub reason: ReportReason,
    pub description: Option<String>,
    pub reported_at: DateTime<Utc>,
    pub status: ReportStatus,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,
    pub resolution: Option<Resolution>,
}

/// A report row as listed: the report plus its derived priority.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportRow {
    #[serde(flatten)]
    pub report: ContentReport,
    pub priority: Priority,
    pub report_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reporter {
    pub name: String,
    pub email: String,
    pub reason: ReportReason,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub row: ReportRow,
    pub reporters: Vec<Reporter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReportAction {
    Resolved,
    Dismissed,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportActivity {
    pub id: String,
    pub moderator_name: String,
    pub action: ReportAction,
    pub report_id: Id,
    pub reporter_name: String,
    pub target_user_name: String,
    pub reason: ReportReason,
    pub resolution: Resolution,
    pub timestamp: DateTime<Utc>,
}

// ---------------- Violators ---------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyStatus {
    None,
    Warned,
    Restricted,
    Suspended,
    Banned,
}

impl PenaltyStatus {
    /// Position on the escalation ladder. `None` is off the ladder.
    pub fn rank(self) -> Option<u8> {
        match self {
            PenaltyStatus::None => None,
            PenaltyStatus::Warned => Some(0),
            PenaltyStatus::Restricted => Some(1),
            PenaltyStatus::Suspended => Some(2),
            PenaltyStatus::Banned => Some(3),
        }
    }

    /// Whether moving from `self` to `next` climbs the ladder. Moving to
    /// `None` never does; moving from `None` to any ranked status always does.
    pub fn is_escalation_to(self, next: PenaltyStatus) -> bool {
        match (self.rank(), next.rank()) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(prev), Some(new)) => new > prev,
        }
    }

    pub fn action_label(self) -> &'static str {
        match self {
            PenaltyStatus::None => "Remove Penalty",
            PenaltyStatus::Warned => "Issue Warning",
            PenaltyStatus::Restricted => "Restrict Account",
            PenaltyStatus::Suspended => "Suspend Account",
            PenaltyStatus::Banned => "Ban User",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolationRecord {
    pub date: DateTime<Utc>,
    pub content_type: ContentType,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Violator {
    pub id: Id,
    pub user_id: Id,
    pub user_name: String,
    pub user_email: String,
    pub avatar_url: Option<String>,
    pub total_violations: u32,
    pub taken_down_content: u32,
    pub last_violation_date: DateTime<Utc>,
    pub account_created_at: DateTime<Utc>,
    pub penalty_status: PenaltyStatus,
    pub violation_history: Vec<ViolationRecord>,
}

impl Violator {
    pub fn account_age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.account_created_at).num_days()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ViolatorRow {
    #[serde(flatten)]
    pub violator: Violator,
    pub account_age_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PenaltyActivity {
    pub id: String,
    pub moderator_name: String,
    pub action: String,
    pub target_user_name: String,
    pub previous_status: PenaltyStatus,
    pub new_status: PenaltyStatus,
    pub escalation: bool,
    pub timestamp: DateTime<Utc>,
}

// ---------------- Moderator accounts ------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Active,
    Inactive,
}

/// Which websites a moderator account may act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WebsiteAccess {
    All,
    Assigned(Vec<Id>),
}

impl WebsiteAccess {
    pub fn for_role(role: Role, websites: Vec<Id>) -> Self {
        match role {
            Role::Admin => WebsiteAccess::All,
            Role::Moderator => WebsiteAccess::Assigned(websites),
        }
    }

    pub fn covers(&self, website_id: &str) -> bool {
        match self {
            WebsiteAccess::All => true,
            WebsiteAccess::Assigned(ids) => ids.iter().any(|id| id == website_id),
        }
    }

    pub fn assigned(&self) -> &[Id] {
        match self {
            WebsiteAccess::All => &[],
            WebsiteAccess::Assigned(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModeratorUser {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub website_access: WebsiteAccess,
    pub invite_token: Option<String>,
    pub invite_sent_at: Option<DateTime<Utc>>,
    pub last_active: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub actions_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewModeratorUser {
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub websites: Vec<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateModeratorUser {
    pub role: Role,
    #[serde(default)]
    pub websites: Vec<Id>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserActivity {
    pub id: String,
    pub admin_name: String,
    pub action: String,
    pub target_user_name: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Website {
    pub id: Id,
    pub name: String,
    pub domain: String,
}
