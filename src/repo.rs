use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::filters::*;
use crate::models::*;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum RepoError {
    #[error("not found")] NotFound,
    #[error("conflict")] Conflict,
    #[error("{0}")] Invalid(String),
}

pub type RepoResult<T> = Result<T, RepoError>;

#[async_trait]
pub trait ContentRepo: Send + Sync {
    async fn list_content(&self, filter: ContentFilter) -> RepoResult<Vec<ContentItem>>;
    async fn get_content(&self, id: &str) -> RepoResult<ContentItem>;
    async fn approve_content(&self, id: &str, moderator: &str) -> RepoResult<ContentItem>;
    async fn take_down_content(&self, id: &str, reason: &str, moderator: &str) -> RepoResult<ContentItem>;
    async fn content_stats(&self) -> RepoResult<ModerationStats>;
    async fn content_activity(&self, filter: ContentActivityFilter) -> RepoResult<Vec<ContentActivity>>;
}

#[async_trait]
pub trait ReportRepo: Send + Sync {
    async fn list_reports(&self, filter: ReportFilter) -> RepoResult<Vec<ReportRow>>;
    async fn get_report(&self, id: &str) -> RepoResult<ReportDetail>;
    async fn resolve_report(&self, id: &str, resolution: Resolution, moderator: &str) -> RepoResult<ReportRow>;
    async fn pending_report_count(&self) -> RepoResult<usize>;
    async fn report_activity(&self) -> RepoResult<Vec<ReportActivity>>;
}

#[async_trait]
pub trait ViolatorRepo: Send + Sync {
    async fn list_violators(&self, filter: ViolatorFilter) -> RepoResult<Vec<ViolatorRow>>;
    async fn set_penalty(&self, id: &str, status: PenaltyStatus, moderator: &str) -> RepoResult<ViolatorRow>;
    async fn penalty_activity(&self) -> RepoResult<Vec<PenaltyActivity>>;
}

#[async_trait]
pub trait ModeratorRepo: Send + Sync {
    async fn list_websites(&self) -> RepoResult<Vec<Website>>;
    async fn list_users(&self, filter: UserFilter) -> RepoResult<Vec<ModeratorUser>>;
    async fn get_user(&self, id: &str) -> RepoResult<ModeratorUser>;
    async fn create_user(&self, new: NewModeratorUser, admin: &str) -> RepoResult<ModeratorUser>;
    async fn update_user(&self, id: &str, upd: UpdateModeratorUser, admin: &str) -> RepoResult<ModeratorUser>;
    async fn set_user_active(&self, id: &str, active: bool, admin: &str) -> RepoResult<ModeratorUser>;
    async fn resend_invite(&self, id: &str, admin: &str) -> RepoResult<ModeratorUser>;
    async fn user_activity(&self) -> RepoResult<Vec<UserActivity>>;
}

pub trait Repo: ContentRepo + ReportRepo + ViolatorRepo + ModeratorRepo {}

impl<T> Repo for T where T: ContentRepo + ReportRepo + ViolatorRepo + ModeratorRepo {}

/// Lock helpers. A poisoned lock only means another request panicked
/// mid-handler; the data itself is still a valid snapshot, so keep serving it.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[cfg(feature = "inmem-store")]
pub mod inmem {
    use super::*;
    use std::collections::{HashMap, VecDeque};

    use chrono::Utc;
    use tracing::info;
    use uuid::Uuid;

    use crate::auth::Role;
    use crate::invite;
    use crate::seed;

    /// Everything the back office knows. Activity logs are newest first.
    #[derive(Default)]
    pub struct State {
        pub content: Vec<ContentItem>,
        pub reports: Vec<ContentReport>,
        pub violators: Vec<Violator>,
        pub users: Vec<ModeratorUser>,
        pub websites: Vec<Website>,
        pub content_log: VecDeque<ContentActivity>,
        pub report_log: VecDeque<ReportActivity>,
        pub penalty_log: VecDeque<PenaltyActivity>,
        pub user_log: VecDeque<UserActivity>,
    }

    impl State {
        pub fn seeded() -> Self {
            Self {
                content: seed::content(),
                reports: seed::reports(),
                violators: seed::violators(),
                users: seed::moderator_users(),
                websites: seed::websites(),
                ..Default::default()
            }
        }

        fn report_counts(&self) -> HashMap<&str, usize> {
            let mut counts = HashMap::new();
            for r in &self.reports {
                *counts.entry(r.content_id.as_str()).or_insert(0) += 1;
            }
            counts
        }

        fn report_row(&self, report: &ContentReport, counts: &HashMap<&str, usize>) -> ReportRow {
            let report_count = counts.get(report.content_id.as_str()).copied().unwrap_or(1);
            ReportRow {
                report: report.clone(),
                priority: Priority::from_report_count(report_count),
                report_count,
            }
        }

        /// Website names for ids, in the given order; unknown ids are skipped.
        fn website_names(&self, ids: &[Id]) -> String {
            ids.iter()
                .filter_map(|id| self.websites.iter().find(|w| &w.id == id))
                .map(|w| w.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        }

        /// Website assignment for `role`. Admins ignore the list; moderators
        /// need at least one known website, stored once each in submitted order.
        fn assignable_websites(&self, role: Role, ids: Vec<Id>) -> RepoResult<Vec<Id>> {
            if role == Role::Admin {
                return Ok(Vec::new());
            }
            let mut sites: Vec<Id> = Vec::with_capacity(ids.len());
            for id in ids {
                if !self.websites.iter().any(|w| w.id == id) {
                    return Err(RepoError::Invalid(format!("unknown website '{id}'")));
                }
                if !sites.contains(&id) {
                    sites.push(id);
                }
            }
            if sites.is_empty() {
                return Err(RepoError::Invalid("moderators need at least one website".into()));
            }
            Ok(sites)
        }

        fn log_user(&mut self, admin: &str, action: &str, target: &str, details: String) {
            self.user_log.push_front(UserActivity {
                id: Uuid::new_v4().to_string(),
                admin_name: admin.to_string(),
                action: action.to_string(),
                target_user_name: target.to_string(),
                details,
                timestamp: Utc::now(),
            });
        }

        fn set_content_status(&mut self, id: &str, status: ContentStatus, reason: Option<String>, moderator: &str) -> RepoResult<ContentItem> {
            let item = self.content.iter_mut().find(|c| c.id == id).ok_or(RepoError::NotFound)?;
            item.status = status;
            item.moderated_at = Some(Utc::now());
            item.moderated_by = Some(moderator.to_string());
            item.reason = reason;
            let item = item.clone();
            self.content_log.push_front(ContentActivity {
                id: Uuid::new_v4().to_string(),
                moderator_name: moderator.to_string(),
                action: match status {
                    ContentStatus::TakenDown => ContentAction::TakenDown,
                    _ => ContentAction::Approved,
                },
                content_id: item.id.clone(),
                content_type: item.content_type,
                user_name: item.user_name.clone(),
                reason: item.reason.clone(),
                timestamp: Utc::now(),
            });
            Ok(item)
        }
    }

    /// Items whose id is in `a` but not in `b`, keeping `a`'s order.
    fn difference(a: &[Id], b: &[Id]) -> Vec<Id> {
        a.iter().filter(|id| !b.contains(id)).cloned().collect()
    }

    #[derive(Clone)]
    pub struct InMemRepo {
        state: Arc<RwLock<State>>,
    }

    impl InMemRepo {
        /// A repository seeded with the mock data set.
        pub fn new() -> Self {
            Self::with_state(State::seeded())
        }

        pub fn with_state(state: State) -> Self {
            Self { state: Arc::new(RwLock::new(state)) }
        }
    }

    impl Default for InMemRepo {
        fn default() -> Self { Self::new() }
    }

    #[async_trait]
    impl ContentRepo for InMemRepo {
        async fn list_content(&self, filter: ContentFilter) -> RepoResult<Vec<ContentItem>> {
            let s = read(&self.state);
            Ok(s.content.iter().filter(|c| filter.matches(c)).cloned().collect())
        }

        async fn get_content(&self, id: &str) -> RepoResult<ContentItem> {
            let s = read(&self.state);
            s.content.iter().find(|c| c.id == id).cloned().ok_or(RepoError::NotFound)
        }

        async fn approve_content(&self, id: &str, moderator: &str) -> RepoResult<ContentItem> {
            let item = write(&self.state).set_content_status(id, ContentStatus::Approved, None, moderator)?;
            info!(content_id = %id, %moderator, "content approved");
            Ok(item)
        }

        async fn take_down_content(&self, id: &str, reason: &str, moderator: &str) -> RepoResult<ContentItem> {
            let reason = reason.trim();
            if reason.is_empty() {
                return Err(RepoError::Invalid("a takedown reason is required".into()));
            }
            let item = write(&self.state).set_content_status(id, ContentStatus::TakenDown, Some(reason.to_string()), moderator)?;
            info!(content_id = %id, %moderator, %reason, "content taken down");
            Ok(item)
        }

        async fn content_stats(&self) -> RepoResult<ModerationStats> {
            let s = read(&self.state);
            let today = Utc::now().date_naive();
            let count = |status: ContentStatus| s.content.iter().filter(|c| c.status == status).count();
            Ok(ModerationStats {
                total_pending: count(ContentStatus::Pending),
                total_approved: count(ContentStatus::Approved),
                total_taken_down: count(ContentStatus::TakenDown),
                today_moderated: s
                    .content
                    .iter()
                    .filter(|c| c.moderated_at.is_some_and(|at| at.date_naive() == today))
                    .count(),
                flagged_content: s.content.iter().filter(|c| c.flag_count > 0).count(),
            })
        }

        async fn content_activity(&self, filter: ContentActivityFilter) -> RepoResult<Vec<ContentActivity>> {
            let s = read(&self.state);
            Ok(s.content_log.iter().filter(|l| filter.matches(l)).cloned().collect())
        }
    }

    #[async_trait]
    impl ReportRepo for InMemRepo {
        async fn list_reports(&self, filter: ReportFilter) -> RepoResult<Vec<ReportRow>> {
            let s = read(&self.state);
            let counts = s.report_counts();
            Ok(s.reports
                .iter()
                .map(|r| s.report_row(r, &counts))
                .filter(|row| filter.matches(&row.report, row.priority))
                .collect())
        }

        async fn get_report(&self, id: &str) -> RepoResult<ReportDetail> {
            let s = read(&self.state);
            let report = s.reports.iter().find(|r| r.id == id).ok_or(RepoError::NotFound)?;
            let counts = s.report_counts();
            let reporters = s
                .reports
                .iter()
                .filter(|r| r.content_id == report.content_id)
                .map(|r| Reporter {
                    name: r.reporter_name.clone(),
                    email: r.reporter_email.clone(),
                    reason: r.reason,
                    date: r.reported_at,
                })
                .collect();
            Ok(ReportDetail { row: s.report_row(report, &counts), reporters })
        }

        async fn resolve_report(&self, id: &str, resolution: Resolution, moderator: &str) -> RepoResult<ReportRow> {
            let mut s = write(&self.state);
            let report = s.reports.iter_mut().find(|r| r.id == id).ok_or(RepoError::NotFound)?;
            if report.status != ReportStatus::Pending {
                return Err(RepoError::Conflict);
            }
            let status = resolution.report_status();
            report.status = status;
            report.resolved_at = Some(Utc::now());
            report.resolved_by = Some(moderator.to_string());
            report.resolution = Some(resolution);
            let report = report.clone();

            s.report_log.push_front(ReportActivity {
                id: Uuid::new_v4().to_string(),
                moderator_name: moderator.to_string(),
                action: match status {
                    ReportStatus::Dismissed => ReportAction::Dismissed,
                    _ => ReportAction::Resolved,
                },
                report_id: report.id.clone(),
                reporter_name: report.reporter_name.clone(),
                target_user_name: report.target_user_name.clone(),
                reason: report.reason,
                resolution,
                timestamp: Utc::now(),
            });
            let row = {
                let counts = s.report_counts();
                s.report_row(&report, &counts)
            };
            drop(s);
            info!(report_id = %id, %moderator, ?resolution, "report settled");
            Ok(row)
        }

        async fn pending_report_count(&self) -> RepoResult<usize> {
            let s = read(&self.state);
            Ok(s.reports.iter().filter(|r| r.status == ReportStatus::Pending).count())
        }

        async fn report_activity(&self) -> RepoResult<Vec<ReportActivity>> {
            Ok(read(&self.state).report_log.iter().cloned().collect())
        }
    }

    #[async_trait]
    impl ViolatorRepo for InMemRepo {
        async fn list_violators(&self, filter: ViolatorFilter) -> RepoResult<Vec<ViolatorRow>> {
            let s = read(&self.state);
            let now = Utc::now();
            let mut v: Vec<_> = s
                .violators
                .iter()
                .filter(|v| filter.matches(v))
                .map(|v| ViolatorRow { account_age_days: v.account_age_days(now), violator: v.clone() })
                .collect();
            v.sort_by(|a, b| b.violator.total_violations.cmp(&a.violator.total_violations)); // worst first
            Ok(v)
        }

        async fn set_penalty(&self, id: &str, status: PenaltyStatus, moderator: &str) -> RepoResult<ViolatorRow> {
            let mut s = write(&self.state);
            let violator = s.violators.iter_mut().find(|v| v.id == id).ok_or(RepoError::NotFound)?;
            // no transition table: any status may follow any other
            let previous = std::mem::replace(&mut violator.penalty_status, status);
            let violator = violator.clone();
            let escalation = previous.is_escalation_to(status);
            s.penalty_log.push_front(PenaltyActivity {
                id: Uuid::new_v4().to_string(),
                moderator_name: moderator.to_string(),
                action: status.action_label().to_string(),
                target_user_name: violator.user_name.clone(),
                previous_status: previous,
                new_status: status,
                escalation,
                timestamp: Utc::now(),
            });
            drop(s);
            info!(violator_id = %id, %moderator, ?previous, new = ?status, escalation, "penalty changed");
            Ok(ViolatorRow { account_age_days: violator.account_age_days(Utc::now()), violator })
        }

        async fn penalty_activity(&self) -> RepoResult<Vec<PenaltyActivity>> {
            Ok(read(&self.state).penalty_log.iter().cloned().collect())
        }
    }

    #[async_trait]
    impl ModeratorRepo for InMemRepo {
        async fn list_websites(&self) -> RepoResult<Vec<Website>> {
            Ok(read(&self.state).websites.clone())
        }

        async fn list_users(&self, filter: UserFilter) -> RepoResult<Vec<ModeratorUser>> {
            let s = read(&self.state);
            Ok(s.users.iter().filter(|u| filter.matches(u)).cloned().collect())
        }

        async fn get_user(&self, id: &str) -> RepoResult<ModeratorUser> {
            let s = read(&self.state);
            s.users.iter().find(|u| u.id == id).cloned().ok_or(RepoError::NotFound)
        }

        async fn create_user(&self, new: NewModeratorUser, admin: &str) -> RepoResult<ModeratorUser> {
            let name = new.name.trim();
            let email = new.email.trim();
            if name.is_empty() || email.is_empty() {
                return Err(RepoError::Invalid("name and email are required".into()));
            }
            if !email.contains('@') {
                return Err(RepoError::Invalid("email address is not valid".into()));
            }
            let mut s = write(&self.state);
            let websites = s.assignable_websites(new.role, new.websites)?;
            if s.users.iter().any(|u| u.email.eq_ignore_ascii_case(email)) {
                return Err(RepoError::Conflict);
            }
            let now = Utc::now();
            let user = ModeratorUser {
                id: format!("mod_{}", Uuid::new_v4().simple()),
                name: name.to_string(),
                email: email.to_string(),
                role: new.role,
                status: UserStatus::Pending,
                website_access: WebsiteAccess::for_role(new.role, websites),
                invite_token: Some(invite::generate_token(email, now)),
                invite_sent_at: Some(now),
                last_active: now,
                created_at: now,
                actions_count: 0,
            };
            let details = match &user.website_access {
                WebsiteAccess::All => format!("Created new {} account (access to all websites)", user.role.label()),
                WebsiteAccess::Assigned(ids) => {
                    format!("Created new {} account for {}", user.role.label(), s.website_names(ids))
                }
            };
            s.users.push(user.clone());
            s.log_user(admin, "Created User", &user.name, details);
            drop(s);
            info!(user_id = %user.id, %admin, role = ?user.role, "moderator account created");
            Ok(user)
        }

        async fn update_user(&self, id: &str, upd: UpdateModeratorUser, admin: &str) -> RepoResult<ModeratorUser> {
            let mut s = write(&self.state);
            let websites = s.assignable_websites(upd.role, upd.websites)?;
            let user = s.users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
            let old_role = user.role;
            let old_sites = user.website_access.assigned().to_vec();
            user.role = upd.role;
            user.website_access = WebsiteAccess::for_role(upd.role, websites);
            let user = user.clone();

            let mut changes = Vec::new();
            if old_role != user.role {
                changes.push(format!("role from {} to {}", old_role.label(), user.role.label()));
            }
            if let WebsiteAccess::Assigned(new_sites) = &user.website_access {
                let added = difference(new_sites, &old_sites);
                let removed = difference(&old_sites, new_sites);
                if !added.is_empty() {
                    changes.push(format!("added websites: {}", s.website_names(&added)));
                }
                if !removed.is_empty() {
                    changes.push(format!("removed websites: {}", s.website_names(&removed)));
                }
            }
            if !changes.is_empty() {
                s.log_user(admin, "Updated User", &user.name, format!("Changed {}", changes.join("; ")));
            }
            drop(s);
            info!(user_id = %id, %admin, changes = changes.len(), "moderator account updated");
            Ok(user)
        }

        async fn set_user_active(&self, id: &str, active: bool, admin: &str) -> RepoResult<ModeratorUser> {
            let mut s = write(&self.state);
            let user = s.users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
            let (status, action, word) = if active {
                (UserStatus::Active, "Activated User", "active")
            } else {
                (UserStatus::Inactive, "Deactivated User", "inactive")
            };
            user.status = status;
            let user = user.clone();
            s.log_user(admin, action, &user.name, format!("Status changed to {word}"));
            drop(s);
            info!(user_id = %id, %admin, status = word, "moderator status changed");
            Ok(user)
        }

        async fn resend_invite(&self, id: &str, admin: &str) -> RepoResult<ModeratorUser> {
            let mut s = write(&self.state);
            let user = s.users.iter_mut().find(|u| u.id == id).ok_or(RepoError::NotFound)?;
            if user.status != UserStatus::Pending {
                return Err(RepoError::Conflict);
            }
            let now = Utc::now();
            user.invite_token = Some(invite::generate_token(&user.email, now));
            user.invite_sent_at = Some(now);
            let user = user.clone();
            s.log_user(admin, "Resent Invitation", &user.name, format!("Resent invitation to {}", user.email));
            drop(s);
            info!(user_id = %id, %admin, "invitation resent");
            Ok(user)
        }

        async fn user_activity(&self) -> RepoResult<Vec<UserActivity>> {
            Ok(read(&self.state).user_log.iter().cloned().collect())
        }
    }
}
