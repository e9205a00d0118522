//! In-memory sliding-window rate limiting with exponential lockout extension.
//!
//! One `RateLimiter` instance is constructed per concern at process start:
//! login attempts (keyed `ip:username`), vote submissions (keyed `ip`), and
//! participant registration (keyed `ip`). State is process-local: correct
//! for a single instance, and it fails open after a restart. Multi-instance
//! deployments must put this behind a shared counter store; the interface
//! is the migration seam.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Ceiling for the exponential lockout extension.
const MAX_LOCKOUT: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy)]
struct AttemptEntry {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining_attempts: u32,
    pub retry_after_seconds: Option<u64>,
}

#[derive(Debug)]
pub struct RateLimiter {
    max_attempts: u32,
    window: Duration,
    entries: Mutex<HashMap<String, AttemptEntry>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Read-only check; does not consume budget.
    pub fn check(&self, key: &str) -> RateDecision {
        self.check_at(key, Instant::now())
    }

    /// Count this request and decide. Used on public endpoints where every
    /// request consumes budget, not just failures.
    pub fn register(&self, key: &str) -> RateDecision {
        self.register_at(key, Instant::now())
    }

    /// Record a failed attempt. Once the count reaches the threshold, each
    /// further failure doubles the extension window; an existing lockout
    /// never shortens.
    pub fn record_failure(&self, key: &str) {
        self.record_failure_at(key, Instant::now());
    }

    /// Forget a key entirely (called on successful login).
    pub fn clear(&self, key: &str) {
        self.lock_entries().remove(key);
    }

    /// Drop expired entries, bounding memory growth.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    /// Run `sweep` on a fixed interval for the life of the process.
    pub fn spawn_sweeper(self: Arc<Self>, period: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                self.sweep();
            }
        });
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, AttemptEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_at(&self, key: &str, now: Instant) -> RateDecision {
        let entries = self.lock_entries();
        let Some(entry) = entries.get(key).copied() else {
            return self.allowed_full();
        };
        if now > entry.reset_at {
            return self.allowed_full();
        }
        if entry.count < self.max_attempts {
            return RateDecision {
                allowed: true,
                remaining_attempts: self.max_attempts - entry.count,
                retry_after_seconds: None,
            };
        }
        RateDecision {
            allowed: false,
            remaining_attempts: 0,
            retry_after_seconds: Some(retry_after(entry.reset_at, now)),
        }
    }

    fn register_at(&self, key: &str, now: Instant) -> RateDecision {
        let mut entries = self.lock_entries();
        match entries.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                if entry.count >= self.max_attempts {
                    return RateDecision {
                        allowed: false,
                        remaining_attempts: 0,
                        retry_after_seconds: Some(retry_after(entry.reset_at, now)),
                    };
                }
                entry.count += 1;
                RateDecision {
                    allowed: true,
                    remaining_attempts: self.max_attempts - entry.count,
                    retry_after_seconds: None,
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    AttemptEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                RateDecision {
                    allowed: true,
                    remaining_attempts: self.max_attempts.saturating_sub(1),
                    retry_after_seconds: None,
                }
            }
        }
    }

    fn record_failure_at(&self, key: &str, now: Instant) {
        let mut entries = self.lock_entries();
        match entries.get_mut(key) {
            Some(entry) if now <= entry.reset_at => {
                entry.count += 1;
                if entry.count >= self.max_attempts {
                    let exponent = entry.count - self.max_attempts;
                    let extension = self
                        .window
                        .saturating_mul(2u32.saturating_pow(exponent))
                        .min(MAX_LOCKOUT);
                    // Anchor to the later of the two; extensions compound,
                    // they never shorten an existing lockout.
                    entry.reset_at = entry.reset_at.max(now + extension);
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    AttemptEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
            }
        }
    }

    fn sweep_at(&self, now: Instant) {
        self.lock_entries().retain(|_, entry| now <= entry.reset_at);
    }

    const fn allowed_full(&self) -> RateDecision {
        RateDecision {
            allowed: true,
            remaining_attempts: self.max_attempts,
            retry_after_seconds: None,
        }
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.lock_entries().len()
    }
}

/// Whole seconds until `reset_at`, rounded up, at least 1.
fn retry_after(reset_at: Instant, now: Instant) -> u64 {
    let remaining = reset_at.saturating_duration_since(now);
    let secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(900);

    fn limiter() -> RateLimiter {
        RateLimiter::new(5, WINDOW)
    }

    #[test]
    fn fresh_key_has_full_budget() {
        let limiter = limiter();
        let decision = limiter.check_at("1.2.3.4:root", Instant::now());
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 5);
        assert_eq!(decision.retry_after_seconds, None);
    }

    #[test]
    fn failures_consume_budget_then_block() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..4 {
            limiter.record_failure_at("key", now);
        }
        let decision = limiter.check_at("key", now);
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 1);

        limiter.record_failure_at("key", now);
        let decision = limiter.check_at("key", now);
        assert!(!decision.allowed);
        assert_eq!(decision.remaining_attempts, 0);
        assert!(decision.retry_after_seconds.is_some());
    }

    #[test]
    fn expired_window_resets_budget() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..5 {
            limiter.record_failure_at("key", now);
        }
        assert!(!limiter.check_at("key", now).allowed);

        let later = now + WINDOW + Duration::from_secs(1);
        let decision = limiter.check_at("key", later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 5);

        // The next failure after expiry starts a fresh window with count 1.
        limiter.record_failure_at("key", later);
        let decision = limiter.check_at("key", later);
        assert_eq!(decision.remaining_attempts, 4);
    }

    #[test]
    fn lockout_extends_exponentially_past_threshold() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..5 {
            limiter.record_failure_at("key", now);
        }
        // 5th failure: extension = window * 2^0, still blocked at window edge.
        assert!(!limiter.check_at("key", now + WINDOW - Duration::from_secs(1)).allowed);

        // 6th failure doubles the extension: blocked well past one window.
        limiter.record_failure_at("key", now);
        let decision = limiter.check_at("key", now + WINDOW + Duration::from_secs(1));
        assert!(!decision.allowed);

        // 2 * window from the 6th failure is the new horizon.
        let decision = limiter.check_at("key", now + WINDOW * 2 + Duration::from_secs(1));
        assert!(decision.allowed);
    }

    #[test]
    fn lockout_never_shortens() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..8 {
            limiter.record_failure_at("key", now);
        }
        let blocked = limiter.check_at("key", now);
        let horizon = blocked.retry_after_seconds.expect("should be blocked");

        // A later failure with a smaller extension keeps the existing horizon.
        limiter.record_failure_at("key", now + Duration::from_secs(1));
        let still_blocked = limiter.check_at("key", now + Duration::from_secs(1));
        let new_horizon = still_blocked.retry_after_seconds.expect("still blocked");
        assert!(new_horizon + 1 >= horizon);
    }

    #[test]
    fn lockout_extension_is_capped() {
        let limiter = limiter();
        let now = Instant::now();
        // Enough failures that an uncapped doubling would overflow any window.
        for _ in 0..64 {
            limiter.record_failure_at("key", now);
        }
        let decision = limiter.check_at("key", now);
        let horizon = decision.retry_after_seconds.expect("should be blocked");
        assert!(horizon <= MAX_LOCKOUT.as_secs() + WINDOW.as_secs());
    }

    #[test]
    fn clear_removes_entry() {
        let limiter = limiter();
        let now = Instant::now();
        for _ in 0..5 {
            limiter.record_failure_at("key", now);
        }
        assert!(!limiter.check_at("key", now).allowed);

        limiter.clear("key");
        let decision = limiter.check_at("key", now);
        assert!(decision.allowed);
        assert_eq!(decision.remaining_attempts, 5);
    }

    #[test]
    fn register_counts_every_request() {
        let limiter = RateLimiter::new(10, Duration::from_secs(60));
        let now = Instant::now();
        for i in 0..10 {
            let decision = limiter.register_at("1.2.3.4", now);
            assert!(decision.allowed, "request {} should pass", i + 1);
        }
        let decision = limiter.register_at("1.2.3.4", now);
        assert!(!decision.allowed);
        assert_eq!(decision.retry_after_seconds, Some(60));

        // After the window the same IP is welcome again.
        let later = now + Duration::from_secs(61);
        assert!(limiter.register_at("1.2.3.4", later).allowed);
    }

    #[test]
    fn register_isolates_keys() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.register_at("1.1.1.1", now).allowed);
        assert!(!limiter.register_at("1.1.1.1", now).allowed);
        assert!(limiter.register_at("2.2.2.2", now).allowed);
    }

    #[test]
    fn sweep_drops_only_expired_entries() {
        let limiter = limiter();
        let now = Instant::now();
        limiter.record_failure_at("old", now);
        limiter.record_failure_at("fresh", now + WINDOW);
        assert_eq!(limiter.entry_count(), 2);

        limiter.sweep_at(now + WINDOW + Duration::from_secs(1));
        assert_eq!(limiter.entry_count(), 1);
        assert!(limiter.check_at("fresh", now + WINDOW).allowed);
    }

    #[test]
    fn retry_after_rounds_up() {
        let now = Instant::now();
        assert_eq!(retry_after(now + Duration::from_millis(1500), now), 2);
        assert_eq!(retry_after(now + Duration::from_secs(3), now), 3);
        assert_eq!(retry_after(now, now), 1);
    }
}
