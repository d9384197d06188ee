//! Audio admission rate limiter.
//!
//! Caps how many audio chunks may enter the NORMAL queue per rolling
//! one-second window, bounding steady-state link bandwidth even while the
//! queue itself has headroom.  The ceiling has two operating points —
//! quiet (15/s) and active (30/s) — switched by the voice-activity
//! detector; the change takes effect on the next admission check with no
//! averaging or ramp.
//!
//! The window state has a single owner (this struct): admission check and
//! count increment are one operation, so no caller can observe or corrupt
//! a half-updated window.

use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Mutex, PoisonError};

use log::info;

/// Length of the admission window.
pub const WINDOW_MS: u32 = 1000;

#[derive(Debug, Clone, Copy)]
struct RateWindow {
    start_ms: u32,
    count: u16,
}

/// Sliding-window admission limiter for the audio stream.
pub struct RateLimiter {
    /// Packets admitted per window.  Atomic: the VAD edge logic stores a
    /// new ceiling from the audio task while admission checks read it.
    limit: AtomicU16,
    window: Mutex<RateWindow>,
}

impl RateLimiter {
    pub fn new(limit_per_sec: u16) -> Self {
        Self {
            limit: AtomicU16::new(limit_per_sec),
            window: Mutex::new(RateWindow {
                start_ms: 0,
                count: 0,
            }),
        }
    }

    /// Check admission at `now_ms` and, if admitted, consume one slot of
    /// the current window.  `wrapping_sub` keeps the window correct across
    /// the ~49-day u32 millisecond wrap.
    pub fn admit(&self, now_ms: u32) -> bool {
        let mut w = self.window.lock().unwrap_or_else(PoisonError::into_inner);

        if now_ms.wrapping_sub(w.start_ms) >= WINDOW_MS {
            w.start_ms = now_ms;
            w.count = 0;
        }

        if w.count < self.limit.load(Ordering::Relaxed) {
            w.count += 1;
            true
        } else {
            false
        }
    }

    /// Change the per-second ceiling.  Effective on the next `admit` call.
    pub fn set_limit(&self, per_sec: u16) {
        self.limit.store(per_sec, Ordering::Relaxed);
        info!("audio rate limit set to {per_sec} pkt/s");
    }

    pub fn limit(&self) -> u16 {
        self.limit.load(Ordering::Relaxed)
    }

    /// (admitted this window, current ceiling) — diagnostics only.
    pub fn occupancy(&self) -> (u16, u16) {
        let w = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        (w.count, self.limit.load(Ordering::Relaxed))
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_limit_within_window() {
        let rate = RateLimiter::new(15);
        let admitted = (0..20).filter(|_| rate.admit(100)).count();
        assert_eq!(admitted, 15);
    }

    #[test]
    fn window_reset_reopens_admission() {
        let rate = RateLimiter::new(2);
        assert!(rate.admit(0));
        assert!(rate.admit(0));
        assert!(!rate.admit(999));
        // 1000 ms past window start — fresh window.
        assert!(rate.admit(1000));
    }

    #[test]
    fn limit_raise_effective_on_next_check() {
        let rate = RateLimiter::new(2);
        assert!(rate.admit(0));
        assert!(rate.admit(0));
        assert!(!rate.admit(0));

        rate.set_limit(4);
        assert!(rate.admit(0));
        assert!(rate.admit(0));
        assert!(!rate.admit(0));
    }

    #[test]
    fn limit_lower_applies_immediately() {
        let rate = RateLimiter::new(30);
        for _ in 0..10 {
            assert!(rate.admit(0));
        }
        rate.set_limit(5);
        // Already past the lowered ceiling — nothing more this window.
        assert!(!rate.admit(0));
        assert!(rate.admit(1000));
    }

    #[test]
    fn occupancy_reports_count_and_limit() {
        let rate = RateLimiter::new(15);
        assert!(rate.admit(0));
        assert!(rate.admit(0));
        assert_eq!(rate.occupancy(), (2, 15));
    }

    #[test]
    fn window_survives_millis_wraparound() {
        let rate = RateLimiter::new(1);
        assert!(rate.admit(u32::MAX - 100));
        assert!(!rate.admit(u32::MAX - 50));
        // Wrapped past zero, more than a window later.
        assert!(rate.admit(900));
    }
}
