//! Invitation tokens and the password rules of the set-password screen.
//!
//! Tokens are base64 of `"<email>_<unix millis>"`. They identify an invite,
//! they do not authenticate anyone: anybody can mint or read one.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Shown when a set-password link carries no usable token.
pub const FALLBACK_EMAIL: &str = "demo@company.com";

pub fn generate_token(email: &str, at: DateTime<Utc>) -> String {
    STANDARD.encode(format!("{email}_{}", at.timestamp_millis()))
}

/// Recover the invited email, if the token decodes to something that looks
/// like one.
pub fn decode_email(token: &str) -> Option<String> {
    let bytes = STANDARD.decode(token.trim()).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    // split at the last '_' so underscores in the local part survive
    let (email, _) = decoded.rsplit_once('_')?;
    email.contains('@').then(|| email.to_string())
}

/// Email to greet on the set-password screen. Bad or missing tokens fall
/// back to the demo address instead of failing.
pub fn invited_email(token: Option<&str>) -> String {
    token
        .and_then(decode_email)
        .unwrap_or_else(|| FALLBACK_EMAIL.to_string())
}

pub fn invite_link(frontend_url: &str, token: &str) -> String {
    format!("{frontend_url}/auth/set-password?token={}", urlencoding::encode(token))
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Requirement {
    pub label: &'static str,
    pub met: bool,
}

pub fn password_requirements(password: &str) -> Vec<Requirement> {
    vec![
        Requirement { label: "At least 8 characters", met: password.chars().count() >= 8 },
        Requirement { label: "Contains uppercase letter", met: password.chars().any(|c| c.is_ascii_uppercase()) },
        Requirement { label: "Contains lowercase letter", met: password.chars().any(|c| c.is_ascii_lowercase()) },
        Requirement { label: "Contains number", met: password.chars().any(|c| c.is_ascii_digit()) },
    ]
}

/// Unmet requirement labels, plus a mismatch note when the confirmation
/// differs. Empty means the password is acceptable.
pub fn password_problems(password: &str, confirm: &str) -> Vec<&'static str> {
    let mut problems: Vec<&'static str> = password_requirements(password)
        .into_iter()
        .filter(|r| !r.met)
        .map(|r| r.label)
        .collect();
    if confirm.is_empty() || password != confirm {
        problems.push("Passwords must match");
    }
    problems
}
