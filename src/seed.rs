//! Mock records loaded into the in-memory store at startup.

use chrono::{DateTime, Duration, Utc};

use crate::auth::Role;
use crate::models::*;

fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

fn hours_ago(hours: i64) -> DateTime<Utc> {
    Utc::now() - Duration::hours(hours)
}

pub fn websites() -> Vec<Website> {
    [
        ("w1", "Marketplace", "market.example.com"),
        ("w2", "Community Forum", "forum.example.com"),
        ("w3", "Travel Reviews", "travel.example.com"),
    ]
    .into_iter()
    .map(|(id, name, domain)| Website { id: id.into(), name: name.into(), domain: domain.into() })
    .collect()
}

struct Author {
    id: &'static str,
    name: &'static str,
    email: &'static str,
}

const ALICE: Author = Author { id: "u1", name: "Alice Johnson", email: "alice.johnson@example.com" };
const BOB: Author = Author { id: "u2", name: "Bob Martinez", email: "bob.m@example.com" };
const CAROL: Author = Author { id: "u3", name: "Carol White", email: "carol.white@example.com" };
const DAVE: Author = Author { id: "u4", name: "Dave Kim", email: "dkim@example.com" };
const ERIN: Author = Author { id: "u5", name: "Erin Lopez", email: "erin.lopez@example.com" };
const FRANK: Author = Author { id: "u6", name: "Frank Osei", email: "frank.osei@example.com" };

fn item(id: &str, content_type: ContentType, author: &Author, content: &str, website: &str, age_hours: i64) -> ContentItem {
    ContentItem {
        id: id.into(),
        content_type,
        user_id: author.id.into(),
        user_name: author.name.into(),
        user_email: author.email.into(),
        content: content.into(),
        thumbnail: None,
        title: None,
        rating: None,
        media: Vec::new(),
        website_id: website.into(),
        created_at: hours_ago(age_hours),
        status: ContentStatus::Pending,
        moderated_at: None,
        moderated_by: None,
        reason: None,
        flag_count: 0,
        report_reasons: Vec::new(),
    }
}

fn moderated(mut c: ContentItem, status: ContentStatus, by: &str, reason: Option<&str>) -> ContentItem {
    c.status = status;
    c.moderated_at = Some(c.created_at + Duration::hours(2));
    c.moderated_by = Some(by.into());
    c.reason = reason.map(Into::into);
    c
}

fn flagged(mut c: ContentItem, reasons: &[&str]) -> ContentItem {
    c.flag_count = reasons.len() as u32;
    c.report_reasons = reasons.iter().map(|r| r.to_string()).collect();
    c
}

pub fn content() -> Vec<ContentItem> {
    let avatar = "https://images.example.com/avatars/u1.jpg";
    let mut pic = item("c1", ContentType::ProfilePicture, &ALICE, avatar, "w1", 3);
    pic.thumbnail = Some(avatar.into());

    let mut review = item("c2", ContentType::Review, &BOB, "Great seller, fast shipping and the item was exactly as described.", "w1", 5);
    review.rating = Some(5);

    let mut spam_review = item("c3", ContentType::Review, &DAVE, "BUY CHEAP FOLLOWERS at cheap-followers.example.net !!!", "w3", 8);
    spam_review.rating = Some(1);

    let mut post = item("c5", ContentType::Post, &CAROL, "Here are my photos from the trip, the hotel was wonderful.", "w3", 12);
    post.title = Some("Weekend in Lisbon".into());
    post.media = vec![
        MediaAttachment { kind: MediaKind::Image, url: "https://images.example.com/posts/c5-1.jpg".into(), thumbnail: None },
        MediaAttachment {
            kind: MediaKind::Video,
            url: "https://videos.example.com/posts/c5-2.mp4".into(),
            thumbnail: Some("https://images.example.com/posts/c5-2-thumb.jpg".into()),
        },
    ];

    let mut heated = item("c8", ContentType::Post, &FRANK, "Anyone who disagrees with me is an idiot and should leave.", "w2", 20);
    heated.title = Some("Read this before posting".into());

    let mut old_review = item("c10", ContentType::Review, &CAROL, "Room was fine, breakfast could be better.", "w3", 72);
    old_review.rating = Some(3);

    let mut stolen = item("c11", ContentType::ProfilePicture, &DAVE, "https://images.example.com/avatars/u4.jpg", "w2", 96);
    stolen.thumbnail = Some(stolen.content.clone());

    vec![
        pic,
        review,
        flagged(spam_review, &["spam", "spam", "misinformation"]),
        flagged(item("c4", ContentType::Comment, &ERIN, "You are the worst, nobody wants you here.", "w2", 6), &["harassment", "harassment"]),
        post,
        item("c6", ContentType::Comment, &BOB, "Thanks for the helpful answer!", "w2", 14),
        flagged(item("c7", ContentType::Comment, &DAVE, "Click here for free gift cards: giftcards.example.net", "w2", 18), &["spam"]),
        flagged(heated, &["hate_speech"]),
        moderated(item("c9", ContentType::Comment, &ALICE, "Does anyone know when the store opens?", "w1", 48), ContentStatus::Approved, "Jane Smith", None),
        moderated(old_review, ContentStatus::Approved, "Admin User", None),
        moderated(flagged(stolen, &["copyright"]), ContentStatus::TakenDown, "Jane Smith", Some("Copyright")),
        {
            let mut r = item("c12", ContentType::Review, &ERIN, "Terrible place, the owner is a scammer, avoid!!", "w1", 30);
            r.rating = Some(1);
            r
        },
    ]
}

fn report(
    id: &str,
    content: &ContentItem,
    reporter: &Author,
    reason: ReportReason,
    description: Option<&str>,
    age_hours: i64,
) -> ContentReport {
    ContentReport {
        id: id.into(),
        content_id: content.id.clone(),
        content_type: content.content_type,
        content_preview: content.title.clone().unwrap_or_else(|| content.content.chars().take(80).collect()),
        content_thumbnail: content.thumbnail.clone(),
        reporter_id: reporter.id.into(),
        reporter_name: reporter.name.into(),
        reporter_email: reporter.email.into(),
        target_user_id: content.user_id.clone(),
        target_user_name: content.user_name.clone(),
        reason,
        description: description.map(Into::into),
        reported_at: hours_ago(age_hours),
        status: ReportStatus::Pending,
        resolved_at: None,
        resolved_by: None,
        resolution: None,
    }
}

/// Reports over the seeded content: `c3` carries three reports, `c4` two,
/// and the rest one each.
pub fn reports() -> Vec<ContentReport> {
    let content = content();
    let by_id = |id: &str| content.iter().find(|c| c.id == id).cloned().unwrap_or_else(|| content[0].clone());
    let (c3, c4, c7, c8, c11) = (by_id("c3"), by_id("c4"), by_id("c7"), by_id("c8"), by_id("c11"));

    let mut settled = report("r8", &c11, &CAROL, ReportReason::Copyright, Some("This is my photo, used without permission."), 100);
    settled.status = ReportStatus::Resolved;
    settled.resolved_at = Some(hours_ago(90));
    settled.resolved_by = Some("Jane Smith".into());
    settled.resolution = Some(Resolution::ContentRemoved);

    vec![
        report("r1", &c3, &ALICE, ReportReason::Spam, Some("Advertising a follower farm."), 7),
        report("r2", &c3, &BOB, ReportReason::Spam, None, 6),
        report("r3", &c3, &CAROL, ReportReason::Misinformation, Some("Fake review, never bought anything."), 4),
        report("r4", &c4, &BOB, ReportReason::Harassment, Some("Personal attack in the thread."), 5),
        report("r5", &c4, &FRANK, ReportReason::Harassment, None, 2),
        report("r6", &c7, &ERIN, ReportReason::Spam, None, 10),
        report("r7", &c8, &ALICE, ReportReason::HateSpeech, Some("Insulting everyone who replies."), 15),
        settled,
    ]
}

fn violation(days: i64, content_type: ContentType, reason: &str) -> ViolationRecord {
    ViolationRecord { date: days_ago(days), content_type, reason: reason.into() }
}

pub fn violators() -> Vec<Violator> {
    let make = |id: &str, author: &Author, penalty: PenaltyStatus, account_days: i64, history: Vec<ViolationRecord>, taken_down: u32| {
        let last = history.iter().map(|h| h.date).max().unwrap_or_else(Utc::now);
        Violator {
            id: id.into(),
            user_id: author.id.into(),
            user_name: author.name.into(),
            user_email: author.email.into(),
            avatar_url: None,
            total_violations: history.len() as u32,
            taken_down_content: taken_down,
            last_violation_date: last,
            account_created_at: days_ago(account_days),
            penalty_status: penalty,
            violation_history: history,
        }
    };
    vec![
        make("v1", &DAVE, PenaltyStatus::Suspended, 40, vec![
            violation(1, ContentType::Review, "Spam"),
            violation(3, ContentType::Comment, "Spam"),
            violation(9, ContentType::ProfilePicture, "Copyright"),
            violation(20, ContentType::Comment, "Spam"),
            violation(31, ContentType::Review, "Spam"),
        ], 4),
        make("v2", &ERIN, PenaltyStatus::Warned, 210, vec![
            violation(2, ContentType::Comment, "Harassment"),
            violation(14, ContentType::Comment, "Harassment"),
        ], 1),
        make("v3", &FRANK, PenaltyStatus::Restricted, 365, vec![
            violation(1, ContentType::Post, "Hate Speech"),
            violation(6, ContentType::Post, "Hate Speech"),
            violation(45, ContentType::Comment, "Harassment"),
        ], 2),
        make("v4", &BOB, PenaltyStatus::None, 720, vec![
            violation(60, ContentType::Review, "Other"),
            violation(90, ContentType::Review, "Spam"),
        ], 0),
        make("v5", &Author { id: "u9", name: "Gina Park", email: "gina.park@example.com" }, PenaltyStatus::Banned, 15, vec![
            violation(5, ContentType::Post, "Nudity"),
            violation(6, ContentType::ProfilePicture, "Nudity"),
            violation(7, ContentType::Post, "Nudity"),
            violation(8, ContentType::Comment, "Harassment"),
            violation(10, ContentType::Post, "Nudity"),
            violation(12, ContentType::Post, "Nudity"),
        ], 6),
    ]
}

pub fn moderator_users() -> Vec<ModeratorUser> {
    let make = |id: &str, name: &str, email: &str, role: Role, status: UserStatus, sites: &[&str], actions: u64, age_days: i64| ModeratorUser {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        role,
        status,
        website_access: WebsiteAccess::for_role(role, sites.iter().map(|s| s.to_string()).collect()),
        invite_token: None,
        invite_sent_at: None,
        last_active: hours_ago(age_days),
        created_at: days_ago(age_days * 30),
        actions_count: actions,
    };
    let mut invited = make("mod_4", "Leo Turner", "leo.turner@company.com", Role::Moderator, UserStatus::Pending, &["w3"], 0, 1);
    invited.invite_token = Some(crate::invite::generate_token(&invited.email, days_ago(1)));
    invited.invite_sent_at = Some(days_ago(1));
    vec![
        make("mod_1", "Admin User", "admin@company.com", Role::Admin, UserStatus::Active, &[], 1284, 12),
        make("mod_2", "Jane Smith", "jane.smith@company.com", Role::Moderator, UserStatus::Active, &["w1", "w2"], 532, 6),
        make("mod_3", "Omar Haddad", "omar.haddad@company.com", Role::Moderator, UserStatus::Inactive, &["w2"], 87, 4),
        invited,
    ]
}

/// Reasons offered when taking content down; `Other` takes free text.
pub const TAKEDOWN_REASONS: &[&str] = &["Spam", "Hate Speech", "Harassment", "Nudity", "Copyright", "Other"];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = content().into_iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), content().len());
        let ids: HashSet<_> = reports().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), reports().len());
    }

    #[test]
    fn reports_point_at_seeded_content() {
        let content = content();
        for r in reports() {
            let c = content.iter().find(|c| c.id == r.content_id).unwrap();
            assert_eq!(c.user_id, r.target_user_id);
        }
    }

    #[test]
    fn seeded_moderators_have_sites() {
        for u in moderator_users() {
            if u.role == Role::Moderator {
                assert!(!u.website_access.assigned().is_empty(), "{} has no sites", u.name);
            } else {
                assert_eq!(u.website_access, WebsiteAccess::All);
            }
        }
    }
}
