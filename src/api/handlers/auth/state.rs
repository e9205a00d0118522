//! Auth configuration and shared state.

use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::rate_limit::RateLimiter;

use super::tokens::TokenService;

const DEFAULT_MAX_LOGIN_ATTEMPTS: u32 = 5;
const DEFAULT_LOGIN_WINDOW_SECONDS: u64 = 15 * 60;
const DEFAULT_LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    jwt_secret: SecretString,
    seed_secret: Option<SecretString>,
    max_login_attempts: u32,
    login_window_seconds: u64,
    lockout_minutes: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String, jwt_secret: SecretString) -> Self {
        Self {
            frontend_base_url,
            jwt_secret,
            seed_secret: None,
            max_login_attempts: DEFAULT_MAX_LOGIN_ATTEMPTS,
            login_window_seconds: DEFAULT_LOGIN_WINDOW_SECONDS,
            lockout_minutes: DEFAULT_LOCKOUT_MINUTES,
        }
    }

    #[must_use]
    pub fn with_seed_secret(mut self, seed_secret: SecretString) -> Self {
        self.seed_secret = Some(seed_secret);
        self
    }

    #[must_use]
    pub fn with_max_login_attempts(mut self, attempts: u32) -> Self {
        self.max_login_attempts = attempts;
        self
    }

    #[must_use]
    pub fn with_login_window_seconds(mut self, seconds: u64) -> Self {
        self.login_window_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_lockout_minutes(mut self, minutes: i64) -> Self {
        self.lockout_minutes = minutes;
        self
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    pub(super) fn seed_secret(&self) -> Option<&SecretString> {
        self.seed_secret.as_ref()
    }

    /// Consecutive recorded failures before the account row is locked.
    /// Matches the in-memory throttle threshold.
    pub(super) fn failed_logins_before_lock(&self) -> i32 {
        i32::try_from(self.max_login_attempts).unwrap_or(i32::MAX)
    }

    pub(super) fn lockout_minutes(&self) -> i64 {
        self.lockout_minutes
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(super) fn cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }

    fn jwt_secret(&self) -> &SecretString {
        &self.jwt_secret
    }
}

pub struct AuthState {
    config: AuthConfig,
    tokens: TokenService,
    throttle: Arc<RateLimiter>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig) -> Self {
        let tokens = TokenService::new(config.jwt_secret());
        let throttle = Arc::new(RateLimiter::new(
            config.max_login_attempts,
            Duration::from_secs(config.login_window_seconds),
        ));
        Self {
            config,
            tokens,
            throttle,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub(crate) fn throttle(&self) -> &RateLimiter {
        &self.throttle
    }

    /// Shared handle for the background sweeper.
    pub(crate) fn throttle_handle(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.throttle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig::new(
            "http://localhost:3000".to_string(),
            SecretString::from("test-secret".to_string()),
        )
    }

    #[test]
    fn defaults_and_overrides() {
        let config = config();
        assert_eq!(config.max_login_attempts, DEFAULT_MAX_LOGIN_ATTEMPTS);
        assert_eq!(config.login_window_seconds, DEFAULT_LOGIN_WINDOW_SECONDS);
        assert_eq!(config.lockout_minutes(), DEFAULT_LOCKOUT_MINUTES);
        assert!(config.seed_secret().is_none());

        let config = config
            .with_seed_secret(SecretString::from("seed".to_string()))
            .with_max_login_attempts(3)
            .with_login_window_seconds(60)
            .with_lockout_minutes(5);
        assert!(config.seed_secret().is_some());
        assert_eq!(config.failed_logins_before_lock(), 3);
        assert_eq!(config.login_window_seconds, 60);
        assert_eq!(config.lockout_minutes(), 5);
    }

    #[test]
    fn cookie_secure_follows_frontend_scheme() {
        assert!(!config().cookie_secure());

        let https = AuthConfig::new(
            "https://hala-events.iq".to_string(),
            SecretString::from("test-secret".to_string()),
        );
        assert!(https.cookie_secure());
    }

    #[test]
    fn state_wires_throttle_to_config() {
        let state = AuthState::new(config().with_max_login_attempts(2));
        state.throttle().record_failure("key");
        state.throttle().record_failure("key");
        assert!(!state.throttle().check("key").allowed);
    }
}
