use std::time::Duration;

/// Runtime settings, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_addr: String,
    pub frontend_url: String,
    /// HS256 secret for optional bearer tokens. Unset means tokens are refused.
    pub jwt_secret: Option<String>,
    /// Display name used when a request carries no token.
    pub demo_moderator: String,
    pub reset_email_delay: Duration,
    pub set_password_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".into(),
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: None,
            demo_moderator: "Admin User".into(),
            reset_email_delay: Duration::from_millis(1500),
            set_password_delay: Duration::from_millis(1000),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        fn ms_env(name: &str, default: Duration) -> Duration {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        }
        let defaults = Self::default();
        let jwt_secret = std::env::var("JWT_SECRET").ok().filter(|s| !s.is_empty());
        if let Some(secret) = &jwt_secret {
            if secret.len() < 32 {
                anyhow::bail!("JWT_SECRET must be at least 32 characters long");
            }
        }
        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            frontend_url: std::env::var("FRONTEND_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            jwt_secret,
            demo_moderator: std::env::var("DEMO_MODERATOR_NAME").unwrap_or(defaults.demo_moderator),
            reset_email_delay: ms_env("RESET_EMAIL_DELAY_MS", defaults.reset_email_delay),
            set_password_delay: ms_env("SET_PASSWORD_DELAY_MS", defaults.set_password_delay),
        })
    }

    /// Settings for tests: no simulated delays.
    pub fn instant() -> Self {
        Self {
            reset_email_delay: Duration::ZERO,
            set_password_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn short_secret_is_refused() {
        std::env::set_var("JWT_SECRET", "short");
        assert!(AppConfig::from_env().is_err());
        std::env::remove_var("JWT_SECRET");
        let cfg = AppConfig::from_env().unwrap();
        assert!(cfg.jwt_secret.is_none());
    }

    #[test]
    #[serial_test::serial]
    fn delays_come_from_env() {
        std::env::set_var("RESET_EMAIL_DELAY_MS", "25");
        std::env::set_var("FRONTEND_URL", "https://mod.example.com/");
        let cfg = AppConfig::from_env().unwrap();
        assert_eq!(cfg.reset_email_delay, Duration::from_millis(25));
        assert_eq!(cfg.frontend_url, "https://mod.example.com");
        std::env::remove_var("RESET_EMAIL_DELAY_MS");
        std::env::remove_var("FRONTEND_URL");
    }
}
