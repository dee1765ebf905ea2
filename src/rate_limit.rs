use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;

/// Sliding window in-memory rate limiter (process local).
#[derive(Clone)]
pub struct InMemoryRateLimiter {
    store: Arc<DashMap<String, VecDeque<Instant>>>,
    pub enabled: bool,
}

impl InMemoryRateLimiter {
    pub fn new(enabled: bool) -> Self {
        Self { store: Arc::new(DashMap::new()), enabled }
    }

    /// Returns true if allowed, false if limited.
    pub fn check(&self, key: &str, limit: usize, window: Duration) -> bool {
        if !self.enabled { return true; }
        let now = Instant::now();
        let mut entry = self.store.entry(key.to_string()).or_default();
        while let Some(front) = entry.front() {
            if now.duration_since(*front) >= window { entry.pop_front(); } else { break; }
        }
        if entry.len() < limit {
            entry.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Limits for the simulated email flows.
#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    pub reset_limit: usize,
    pub reset_window: Duration,
    pub invite_limit: usize,
    pub invite_window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            reset_limit: 3,
            reset_window: Duration::from_secs(900),
            invite_limit: 5,
            invite_window: Duration::from_secs(3600),
        }
    }
}

impl RateLimitConfig {
    pub fn from_env() -> Self {
        fn usize_env(name: &str, default: usize) -> usize { std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default) }
        fn dur_env(name: &str, default: Duration) -> Duration {
            std::env::var(name).ok().and_then(|v| v.parse().ok()).map(Duration::from_secs).unwrap_or(default)
        }
        let d = Self::default();
        Self {
            reset_limit: usize_env("RL_RESET_LIMIT", d.reset_limit),
            reset_window: dur_env("RL_RESET_WINDOW", d.reset_window),
            invite_limit: usize_env("RL_INVITE_LIMIT", d.invite_limit),
            invite_window: dur_env("RL_INVITE_WINDOW", d.invite_window),
        }
    }
}

/// High level guard used by handlers.
#[derive(Clone)]
pub struct RateLimiterFacade {
    pub limiter: InMemoryRateLimiter,
    pub cfg: RateLimitConfig,
}

impl RateLimiterFacade {
    pub fn new(limiter: InMemoryRateLimiter, cfg: RateLimitConfig) -> Self { Self { limiter, cfg } }

    /// Always-allow facade, for tests that do not exercise limits.
    pub fn disabled() -> Self { Self::new(InMemoryRateLimiter::new(false), RateLimitConfig::default()) }

    pub fn allow_password_reset(&self, email: &str) -> bool {
        self.limiter.check(&format!("reset:{}", email.trim().to_lowercase()), self.cfg.reset_limit, self.cfg.reset_window)
    }

    pub fn allow_invite_resend(&self, user_id: &str) -> bool {
        self.limiter.check(&format!("invite:{user_id}"), self.cfg.invite_limit, self.cfg.invite_window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sliding_window_basic() {
        let rl = InMemoryRateLimiter::new(true);
        let window = Duration::from_millis(50);
        for _ in 0..3 { assert!(rl.check("k", 3, window)); }
        assert!(!rl.check("k", 3, window));
    }

    #[test]
    fn reset_key_ignores_email_case() {
        let cfg = RateLimitConfig { reset_limit: 1, ..Default::default() };
        let rl = RateLimiterFacade::new(InMemoryRateLimiter::new(true), cfg);
        assert!(rl.allow_password_reset("Jane.Smith@company.com"));
        assert!(!rl.allow_password_reset(" jane.smith@company.com"));
        assert!(rl.allow_password_reset("someone.else@company.com"));
    }

    #[test]
    fn disabled_never_limits() {
        let rl = RateLimiterFacade::disabled();
        for _ in 0..20 { assert!(rl.allow_invite_resend("mod_4")); }
    }
}
