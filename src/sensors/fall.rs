//! Fall detection — acceleration spike followed by stillness.
//!
//! A fall signature is a high linear-acceleration spike (impact) and then
//! a near-motionless period (the wearer down).  Movement shortly after the
//! spike disarms the detector — that was a jump, a door slam against the
//! chest strap, or a catch.
//!
//! The detector latches once confirmed; `reset` re-arms it (alert
//! acknowledged or cancelled as a false alarm).

use log::{info, warn};

use crate::config::BeaconConfig;

pub struct FallDetector {
    spike_threshold_ms2: f32,
    motion_threshold_ms2: f32,
    stationary_time_ms: u32,
    update_interval_ms: u32,
    wake_threshold_ms2: f32,

    last_update_ms: u32,
    spike_at_ms: Option<u32>,
    fall_latched: bool,
    current_magnitude: f32,
}

impl FallDetector {
    pub fn new(config: &BeaconConfig) -> Self {
        Self {
            spike_threshold_ms2: config.fall_spike_threshold_ms2,
            motion_threshold_ms2: config.fall_motion_threshold_ms2,
            stationary_time_ms: config.fall_stationary_time_ms,
            update_interval_ms: config.imu_update_interval_ms,
            wake_threshold_ms2: config.motion_wake_threshold_ms2,
            last_update_ms: 0,
            spike_at_ms: None,
            fall_latched: false,
            current_magnitude: 0.0,
        }
    }

    /// Latest linear-acceleration magnitude seen (m/s²).
    pub fn current_magnitude(&self) -> f32 {
        self.current_magnitude
    }

    /// True once a fall has been confirmed and not yet acknowledged.
    pub fn is_latched(&self) -> bool {
        self.fall_latched
    }

    /// Re-arm after the alert is acknowledged or cancelled.
    pub fn reset(&mut self) {
        self.fall_latched = false;
        self.spike_at_ms = None;
    }

    /// Feed one IMU reading (linear acceleration magnitude, m/s²).
    /// Returns `true` exactly once per confirmed fall.
    pub fn update(&mut self, now_ms: u32, magnitude_ms2: f32) -> bool {
        if now_ms.wrapping_sub(self.last_update_ms) < self.update_interval_ms {
            return false;
        }
        self.last_update_ms = now_ms;
        self.current_magnitude = magnitude_ms2;

        if self.spike_at_ms.is_none() && magnitude_ms2 > self.spike_threshold_ms2 {
            self.spike_at_ms = Some(now_ms);
            info!("acceleration spike: {magnitude_ms2:.1} m/s²");
            return false;
        }

        let Some(spike_at) = self.spike_at_ms else {
            return false;
        };
        if self.fall_latched {
            return false;
        }

        let since_spike = now_ms.wrapping_sub(spike_at);

        if magnitude_ms2 < self.motion_threshold_ms2 {
            if since_spike >= self.stationary_time_ms {
                self.fall_latched = true;
                self.spike_at_ms = None;
                warn!("fall confirmed: stationary {since_spike} ms after spike");
                return true;
            }
        } else if since_spike > self.stationary_time_ms + 1000 {
            // Moving again well past the window — not a fall.
            self.spike_at_ms = None;
        }

        false
    }

    /// Motion check used by the power manager's sleep wake path.
    pub fn motion_wake(&self, magnitude_ms2: f32) -> bool {
        magnitude_ms2 > self.wake_threshold_ms2
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const SPIKE: f32 = 30.0; // above 24.525
    const STILL: f32 = 0.5; // below 1.962
    const WALKING: f32 = 5.0; // ordinary motion

    fn detector() -> FallDetector {
        FallDetector::new(&BeaconConfig::default())
    }

    /// Drive readings at the IMU cadence, returning whether any update
    /// confirmed a fall.
    fn feed(d: &mut FallDetector, start_ms: u32, magnitude: f32, duration_ms: u32) -> bool {
        let mut fell = false;
        let mut t = start_ms;
        while t < start_ms + duration_ms {
            fell |= d.update(t, magnitude);
            t += 50;
        }
        fell
    }

    #[test]
    fn spike_then_stillness_confirms_fall() {
        let mut d = detector();
        assert!(!d.update(50, SPIKE));
        assert!(feed(&mut d, 100, STILL, 3000));
        assert!(d.is_latched());
    }

    #[test]
    fn fall_reported_exactly_once() {
        let mut d = detector();
        let _ = d.update(50, SPIKE);
        assert!(feed(&mut d, 100, STILL, 3000));
        // Still motionless — no second report while latched.
        assert!(!feed(&mut d, 3200, STILL, 5000));
    }

    #[test]
    fn movement_after_spike_disarms() {
        let mut d = detector();
        let _ = d.update(50, SPIKE);
        // Walking through the whole window and past its grace.
        assert!(!feed(&mut d, 100, WALKING, 4000));
        // Later stillness alone is not a fall.
        assert!(!feed(&mut d, 4200, STILL, 4000));
        assert!(!d.is_latched());
    }

    #[test]
    fn stillness_without_spike_is_ignored() {
        let mut d = detector();
        assert!(!feed(&mut d, 50, STILL, 10_000));
    }

    #[test]
    fn brief_stillness_does_not_confirm() {
        let mut d = detector();
        let _ = d.update(50, SPIKE);
        // Only 1 s of stillness, then movement again.
        assert!(!feed(&mut d, 100, STILL, 1000));
        assert!(!feed(&mut d, 1150, WALKING, 3000));
        assert!(!d.is_latched());
    }

    #[test]
    fn reset_rearms_detection() {
        let mut d = detector();
        let _ = d.update(50, SPIKE);
        assert!(feed(&mut d, 100, STILL, 3000));

        d.reset();
        assert!(!d.is_latched());
        let _ = d.update(10_000, SPIKE);
        assert!(feed(&mut d, 10_050, STILL, 3000));
    }

    #[test]
    fn update_cadence_gates_readings() {
        let mut d = detector();
        assert!(!d.update(50, SPIKE));
        // 10 ms later — ignored, magnitude unchanged.
        d.update(60, STILL);
        assert!((d.current_magnitude() - SPIKE).abs() < f32::EPSILON);
    }

    #[test]
    fn motion_wake_threshold() {
        let d = detector();
        assert!(!d.motion_wake(1.0));
        assert!(d.motion_wake(5.0));
    }
}
