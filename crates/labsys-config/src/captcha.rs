use std::env;

/// Verification code challenges shown on the login form.
#[derive(Clone, Debug)]
pub struct CaptchaConfig {
    /// When false every code is accepted
    pub enabled: bool,
    /// HMAC-style secret the codes are derived from
    pub secret: String,
    /// Seconds a challenge stays valid
    pub ttl_seconds: i64,
}

impl CaptchaConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: crate::env_or("CAPTCHA_ENABLED", true),
            secret: env::var("CAPTCHA_SECRET")
                .unwrap_or_else(|_| "captcha-secret-change-in-production".to_string()),
            ttl_seconds: crate::env_or("CAPTCHA_TTL", 300),
        }
    }
}
