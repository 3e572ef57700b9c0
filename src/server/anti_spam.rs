use std::time::{Duration, Instant};
use log::warn;

use crate::config::anti_spam::{BAN_DURATION_SECONDS, MAX_REQUESTS_PER_SECOND};

/// Tracks flood-protection state for a single connection.
pub struct AntiSpamState {
    // Last error code sent (for suppression)
    last_error_code: Option<String>,
    // Timestamp of last reset (for per-second counters)
    last_tick: Instant,
    // Number of requests received in the current second
    requests_this_tick: u32,
    // Ban state
    banned_until: Option<Instant>,
}

impl Default for AntiSpamState {
    fn default() -> Self {
        Self::new()
    }
}

impl AntiSpamState {
    pub fn new() -> Self {
        Self {
            last_error_code: None,
            last_tick: Instant::now(),
            requests_this_tick: 0,
            banned_until: None,
        }
    }

    /// Call at the start of every incoming message.
    /// Returns true if the connection is currently banned.
    pub fn record_request(&mut self, who: &str) -> bool {
        self.tick();
        self.requests_this_tick += 1;
        if self.requests_this_tick > MAX_REQUESTS_PER_SECOND && !self.is_banned() {
            self.ban(who, "Too many requests per second");
        }
        self.is_banned()
    }

    /// Call when sending a non-fatal error. Returns true if the error should be sent (not suppressed).
    pub fn should_send_error(&mut self, error_code: &str, who: &str) -> bool {
        if self.last_error_code.as_deref() == Some(error_code) {
            warn!("[AntiSpam] Suppressed duplicate error '{}' for connection={}", error_code, who);
            return false;
        }
        self.last_error_code = Some(error_code.to_string());
        true
    }

    /// Call when a valid action is performed.
    pub fn reset_on_valid_action(&mut self) {
        self.last_error_code = None;
    }

    pub fn is_banned(&self) -> bool {
        self.banned_until.is_some_and(|until| Instant::now() < until)
    }

    /// Returns the remaining ban duration in seconds, or 0 if not banned.
    pub fn ban_remaining_secs(&self) -> u64 {
        self.banned_until
            .map(|until| until.saturating_duration_since(Instant::now()).as_secs())
            .unwrap_or(0)
    }

    fn ban(&mut self, who: &str, reason: &str) {
        let until = Instant::now() + Duration::from_secs(BAN_DURATION_SECONDS);
        self.banned_until = Some(until);
        warn!("[AntiSpam] Banned connection={} until {:?} for reason: {}", who, until, reason);
    }

    /// Reset per-second counters if a new second has started.
    fn tick(&mut self) {
        let now = Instant::now();
        if now.duration_since(self.last_tick) >= Duration::from_secs(1) {
            self.last_tick = now;
            self.requests_this_tick = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bans_after_request_burst() {
        let mut state = AntiSpamState::new();
        for _ in 0..MAX_REQUESTS_PER_SECOND {
            assert!(!state.record_request("c1"));
        }
        assert!(state.record_request("c1"));
        assert!(state.is_banned());
        assert!(state.ban_remaining_secs() > 0);
    }

    #[test]
    fn duplicate_errors_are_suppressed_until_valid_action() {
        let mut state = AntiSpamState::new();
        assert!(state.should_send_error("NOT_JOINED", "c1"));
        assert!(!state.should_send_error("NOT_JOINED", "c1"));
        assert!(state.should_send_error("INVALID_MESSAGE", "c1"));
        state.reset_on_valid_action();
        assert!(state.should_send_error("INVALID_MESSAGE", "c1"));
    }

    #[test]
    fn fresh_state_is_not_banned() {
        let state = AntiSpamState::new();
        assert!(!state.is_banned());
        assert_eq!(state.ban_remaining_secs(), 0);
    }
}
