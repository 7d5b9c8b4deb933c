//! Rate-limit cooldown shared by every call through one gateway.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct RateLimitHit {
    at: Instant,
    wall_clock: DateTime<Utc>,
}

/// Time of the most recent rate-limit signal from any provider.
#[derive(Debug, Default)]
pub struct CooldownState {
    last_hit: Mutex<Option<RateLimitHit>>,
}

impl CooldownState {
    pub fn new() -> Self {
        Self::default()
    }

    fn last(&self) -> Option<RateLimitHit> {
        *self.last_hit.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a rate-limit signal now.
    pub fn record_hit(&self) {
        let hit = RateLimitHit {
            at: Instant::now(),
            wall_clock: Utc::now(),
        };
        *self.last_hit.lock().unwrap_or_else(PoisonError::into_inner) = Some(hit);
    }

    /// Wall-clock time of the last rate-limit signal, if any.
    pub fn last_hit(&self) -> Option<DateTime<Utc>> {
        self.last().map(|hit| hit.wall_clock)
    }

    /// Time left in the cooldown `window`, or `None` when calls are allowed.
    pub fn remaining(&self, window: Duration) -> Option<Duration> {
        let hit = self.last()?;
        window
            .checked_sub(hit.at.elapsed())
            .filter(|left| !left.is_zero())
    }

    pub fn is_active(&self, window: Duration) -> bool {
        self.remaining(window).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inactive_without_hit() {
        let cooldown = CooldownState::new();
        assert!(!cooldown.is_active(Duration::from_secs(60)));
        assert!(cooldown.last_hit().is_none());
    }

    #[test]
    fn test_active_right_after_hit() {
        let cooldown = CooldownState::new();
        cooldown.record_hit();

        let remaining = cooldown
            .remaining(Duration::from_secs(60))
            .expect("cooldown should be active");
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(55));
        assert!(cooldown.last_hit().is_some());
    }

    #[test]
    fn test_expires_after_window() {
        let cooldown = CooldownState::new();
        cooldown.record_hit();

        std::thread::sleep(Duration::from_millis(40));
        assert!(!cooldown.is_active(Duration::from_millis(20)));
        assert!(cooldown.is_active(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_window_never_active() {
        let cooldown = CooldownState::new();
        cooldown.record_hit();
        assert!(!cooldown.is_active(Duration::ZERO));
    }
}
