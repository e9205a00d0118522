//! Voting contest configuration and shared state.

use std::sync::Arc;
use std::time::Duration;

use crate::api::handlers::rate_limit::RateLimiter;

const DEFAULT_VOTE_MAX_REQUESTS: u32 = 10;
const DEFAULT_VOTE_WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Clone)]
pub struct VoteConfig {
    contest_salt: String,
    vote_max_requests: u32,
    vote_window_seconds: u64,
}

impl VoteConfig {
    #[must_use]
    pub fn new(contest_salt: String) -> Self {
        Self {
            contest_salt,
            vote_max_requests: DEFAULT_VOTE_MAX_REQUESTS,
            vote_window_seconds: DEFAULT_VOTE_WINDOW_SECONDS,
        }
    }

    #[must_use]
    pub fn with_vote_max_requests(mut self, max_requests: u32) -> Self {
        self.vote_max_requests = max_requests;
        self
    }

    #[must_use]
    pub fn with_vote_window_seconds(mut self, seconds: u64) -> Self {
        self.vote_window_seconds = seconds;
        self
    }

    pub(crate) fn contest_salt(&self) -> &str {
        &self.contest_salt
    }
}

pub struct VoteState {
    config: VoteConfig,
    vote_limiter: Arc<RateLimiter>,
}

impl VoteState {
    #[must_use]
    pub fn new(config: VoteConfig) -> Self {
        let vote_limiter = Arc::new(RateLimiter::new(
            config.vote_max_requests,
            Duration::from_secs(config.vote_window_seconds),
        ));
        Self {
            config,
            vote_limiter,
        }
    }

    #[must_use]
    pub fn config(&self) -> &VoteConfig {
        &self.config
    }

    pub(crate) fn vote_limiter(&self) -> &RateLimiter {
        &self.vote_limiter
    }

    /// Shared handle for the background sweeper.
    pub(crate) fn vote_limiter_handle(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.vote_limiter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_and_overrides() {
        let config = VoteConfig::new("hala-baghdad-vote".to_string());
        assert_eq!(config.contest_salt(), "hala-baghdad-vote");
        assert_eq!(config.vote_max_requests, DEFAULT_VOTE_MAX_REQUESTS);
        assert_eq!(config.vote_window_seconds, DEFAULT_VOTE_WINDOW_SECONDS);

        let config = config
            .with_vote_max_requests(3)
            .with_vote_window_seconds(10);
        assert_eq!(config.vote_max_requests, 3);
        assert_eq!(config.vote_window_seconds, 10);
    }

    #[test]
    fn state_wires_limiter_to_config() {
        let state = VoteState::new(
            VoteConfig::new("salt".to_string())
                .with_vote_max_requests(2)
                .with_vote_window_seconds(60),
        );
        assert!(state.vote_limiter().register("1.2.3.4").allowed);
        assert!(state.vote_limiter().register("1.2.3.4").allowed);
        assert!(!state.vote_limiter().register("1.2.3.4").allowed);
    }
}
