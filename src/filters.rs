//! Predicates behind every list view. A `None` field means "all".

use serde::de::DeserializeOwned;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::auth::Role;
use crate::models::*;

/// Case-insensitive substring test; `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[derive(Debug, Clone, Default)]
pub struct ContentFilter {
    pub content_type: Option<ContentType>,
    pub status: Option<ContentStatus>,
    pub search: Option<String>,
    pub website: Option<Id>,
}

impl ContentFilter {
    pub fn matches(&self, item: &ContentItem) -> bool {
        if self.content_type.is_some_and(|t| t != item.content_type) { return false; }
        if self.status.is_some_and(|s| s != item.status) { return false; }
        if let Some(site) = &self.website {
            if &item.website_id != site { return false; }
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(q) => {
                contains_ci(&item.user_name, &q)
                    || contains_ci(&item.user_email, &q)
                    || contains_ci(&item.content, &q)
                    || item.title.as_deref().is_some_and(|t| contains_ci(t, &q))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentActivityFilter {
    pub action: Option<ContentAction>,
    pub content_type: Option<ContentType>,
    pub search: Option<String>,
}

impl ContentActivityFilter {
    pub fn matches(&self, log: &ContentActivity) -> bool {
        if self.action.is_some_and(|a| a != log.action) { return false; }
        if self.content_type.is_some_and(|t| t != log.content_type) { return false; }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(q) => {
                contains_ci(&log.user_name, &q)
                    || contains_ci(&log.moderator_name, &q)
                    || log.reason.as_deref().is_some_and(|r| contains_ci(r, &q))
            }
            None => true,
        }
    }
}

/// Report filter. Priority depends on the whole report set, so the caller
/// supplies it alongside the report.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub reason: Option<ReportReason>,
    pub priority: Option<Priority>,
}

impl ReportFilter {
    pub fn matches(&self, report: &ContentReport, priority: Priority) -> bool {
        self.status.map_or(true, |s| s == report.status)
            && self.reason.map_or(true, |r| r == report.reason)
            && self.priority.map_or(true, |p| p == priority)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViolatorFilter {
    pub status: Option<PenaltyStatus>,
}

impl ViolatorFilter {
    pub fn matches(&self, v: &Violator) -> bool {
        self.status.map_or(true, |s| s == v.penalty_status)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
    pub website: Option<Id>,
}

impl UserFilter {
    pub fn matches(&self, u: &ModeratorUser) -> bool {
        if self.role.is_some_and(|r| r != u.role) { return false; }
        if self.status.is_some_and(|s| s != u.status) { return false; }
        match &self.website {
            Some(site) => u.website_access.covers(site),
            None => true,
        }
    }
}

// ---------------- Query-string parsing ----------------------------

/// Parse one filter value from the query string. Missing, empty and `all`
/// mean no filter; anything else must name a variant of `T`.
pub fn parse_choice<T: DeserializeOwned>(field: &str, raw: Option<&str>) -> Result<Option<T>, String> {
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(v) => serde_json::from_value(serde_json::Value::String(v.to_string()))
            .map(Some)
            .map_err(|_| format!("unknown {field} '{v}'")),
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty() && s != "all")
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentQuery {
    /// profile_picture | review | comment | post | all
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    /// pending | approved | taken_down | all
    pub status: Option<String>,
    pub search: Option<String>,
    pub website: Option<String>,
}

impl ContentQuery {
    pub fn into_filter(self) -> Result<ContentFilter, String> {
        Ok(ContentFilter {
            content_type: parse_choice("type", self.content_type.as_deref())?,
            status: parse_choice("status", self.status.as_deref())?,
            search: self.search.filter(|s| !s.trim().is_empty()),
            website: non_empty(self.website),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentActivityQuery {
    /// approved | taken_down | all
    pub action: Option<String>,
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    pub search: Option<String>,
}

impl ContentActivityQuery {
    pub fn into_filter(self) -> Result<ContentActivityFilter, String> {
        Ok(ContentActivityFilter {
            action: parse_choice("action", self.action.as_deref())?,
            content_type: parse_choice("type", self.content_type.as_deref())?,
            search: self.search.filter(|s| !s.trim().is_empty()),
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    pub status: Option<String>,
    pub reason: Option<String>,
    /// high | medium | low | all
    pub priority: Option<String>,
}

impl ReportQuery {
    pub fn into_filter(self) -> Result<ReportFilter, String> {
        Ok(ReportFilter {
            status: parse_choice("status", self.status.as_deref())?,
            reason: parse_choice("reason", self.reason.as_deref())?,
            priority: parse_choice("priority", self.priority.as_deref())?,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ViolatorQuery {
    /// none | warned | restricted | suspended | banned | all
    pub status: Option<String>,
}

impl ViolatorQuery {
    pub fn into_filter(self) -> Result<ViolatorFilter, String> {
        Ok(ViolatorFilter { status: parse_choice("status", self.status.as_deref())? })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    pub role: Option<String>,
    pub status: Option<String>,
    pub website: Option<String>,
}

impl UserQuery {
    pub fn into_filter(self) -> Result<UserFilter, String> {
        Ok(UserFilter {
            role: parse_choice("role", self.role.as_deref())?,
            status: parse_choice("status", self.status.as_deref())?,
            website: non_empty(self.website),
        })
    }
}
