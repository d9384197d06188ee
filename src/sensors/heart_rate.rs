//! Heart-rate monitor — rolling BPM average and heart-stop detection.
//!
//! Consumes IR level and beat flags from the pulse-oximeter driver (peak
//! detection is the driver's job).  Samples are taken at the configured
//! cadence; confirmed beats feed a small rolling average, and transmission
//! is throttled to 1 Hz to keep the HIGH tier at its design rate.
//!
//! Heart-stop is an edge: one event when no beat has been seen for the
//! timeout, re-armed by the next confirmed beat.

use log::{debug, warn};

use crate::config::BeaconConfig;

/// IR level below which no finger/skin contact is assumed; beat detection
/// is meaningless under this floor.
const CONTACT_IR_MIN: f32 = 1000.0;

/// Upper bound on the rolling-average window.
const MAX_AVERAGE_BEATS: usize = 8;

/// Output of one monitor step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrEvent {
    /// A throttled BPM sample ready for transmission.
    Sample(u8),
    /// No beat for the configured timeout — raise a CRITICAL alert.
    HeartStop,
}

pub struct HeartRateMonitor {
    sample_interval_ms: u32,
    update_interval_ms: u32,
    no_beat_timeout_ms: u32,
    average_beats: usize,

    rates: [u8; MAX_AVERAGE_BEATS],
    rate_spot: usize,
    rates_filled: usize,

    last_sample_ms: u32,
    last_beat_ms: Option<u32>,
    last_update_ms: u32,
    current_bpm: u8,
    heart_stop_sent: bool,
}

impl HeartRateMonitor {
    pub fn new(config: &BeaconConfig) -> Self {
        let average_beats = config.hr_average_beats.clamp(1, MAX_AVERAGE_BEATS);
        if average_beats != config.hr_average_beats {
            warn!(
                "hr_average_beats clamped to {average_beats} (configured {})",
                config.hr_average_beats
            );
        }
        Self {
            sample_interval_ms: config.hr_sample_interval_ms,
            update_interval_ms: config.hr_update_interval_ms,
            no_beat_timeout_ms: config.hr_no_beat_timeout_ms,
            average_beats,
            rates: [0; MAX_AVERAGE_BEATS],
            rate_spot: 0,
            rates_filled: 0,
            last_sample_ms: 0,
            last_beat_ms: None,
            last_update_ms: 0,
            current_bpm: 0,
            heart_stop_sent: false,
        }
    }

    /// Latest averaged BPM (0 until the first confirmed beat).
    pub fn current_bpm(&self) -> u8 {
        self.current_bpm
    }

    /// Process one driver reading.  Call at the driver's native rate; the
    /// monitor enforces its own sampling cadence internally.
    pub fn on_sample(&mut self, now_ms: u32, ir_value: f32, beat: bool) -> Option<HrEvent> {
        if now_ms.wrapping_sub(self.last_sample_ms) < self.sample_interval_ms {
            return None;
        }
        self.last_sample_ms = now_ms;

        if ir_value < CONTACT_IR_MIN {
            return self.check_heart_stop(now_ms);
        }

        if !beat {
            return self.check_heart_stop(now_ms);
        }

        let delta_ms = self
            .last_beat_ms
            .map(|last| now_ms.wrapping_sub(last))
            .unwrap_or(u32::MAX);
        self.last_beat_ms = Some(now_ms);
        self.heart_stop_sent = false;

        let bpm = if delta_ms == 0 || delta_ms == u32::MAX {
            0.0
        } else {
            60_000.0 / delta_ms as f32
        };

        // Discard implausible intervals (double-triggered peaks, first beat).
        if !(20.0..255.0).contains(&bpm) {
            return None;
        }

        self.rates[self.rate_spot] = bpm as u8;
        self.rate_spot = (self.rate_spot + 1) % self.average_beats;
        self.rates_filled = (self.rates_filled + 1).min(self.average_beats);

        let sum: u32 = self.rates[..self.average_beats]
            .iter()
            .take(self.rates_filled)
            .map(|&r| u32::from(r))
            .sum();
        self.current_bpm = (sum / self.rates_filled as u32) as u8;

        if now_ms.wrapping_sub(self.last_update_ms) >= self.update_interval_ms {
            self.last_update_ms = now_ms;
            debug!("heart rate: {} BPM", self.current_bpm);
            return Some(HrEvent::Sample(self.current_bpm));
        }
        None
    }

    fn check_heart_stop(&mut self, now_ms: u32) -> Option<HrEvent> {
        let Some(last_beat) = self.last_beat_ms else {
            // Never saw a beat — nothing to lose yet.
            return None;
        };

        if now_ms.wrapping_sub(last_beat) > self.no_beat_timeout_ms && !self.heart_stop_sent {
            self.heart_stop_sent = true;
            self.current_bpm = 0;
            warn!("no heartbeat for {} ms", now_ms.wrapping_sub(last_beat));
            return Some(HrEvent::HeartStop);
        }
        None
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const IR_OK: f32 = 50_000.0;

    fn monitor() -> HeartRateMonitor {
        HeartRateMonitor::new(&BeaconConfig::default())
    }

    /// Drive a steady 60 BPM pulse: beat every 1000 ms, sampled at 50 ms.
    fn run_steady_pulse(m: &mut HeartRateMonitor, start_ms: u32, beats: u32) -> Vec<HrEvent> {
        let mut events = Vec::new();
        for i in 0..beats * 20 {
            let now = start_ms + i * 50;
            let beat = now % 1000 == 0 && now > start_ms;
            if let Some(e) = m.on_sample(now, IR_OK, beat) {
                events.push(e);
            }
        }
        events
    }

    #[test]
    fn steady_pulse_reports_sixty_bpm() {
        let mut m = monitor();
        let events = run_steady_pulse(&mut m, 0, 10);
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|e| matches!(e, HrEvent::Sample(bpm) if (58..=62).contains(bpm))));
        assert_eq!(m.current_bpm(), 60);
    }

    #[test]
    fn samples_throttled_to_one_hz() {
        let mut m = monitor();
        // 5 beats over 5 seconds — at a 1 Hz throttle at most 5 samples,
        // and consecutive samples at least 1000 ms apart by construction.
        let events = run_steady_pulse(&mut m, 0, 5);
        assert!(events.len() <= 5, "got {} samples", events.len());
    }

    #[test]
    fn implausible_intervals_discarded() {
        let mut m = monitor();
        // Two "beats" 100 ms apart → 600 BPM, outside plausibility.
        assert!(m.on_sample(0, IR_OK, true).is_none());
        assert!(m.on_sample(100, IR_OK, true).is_none());
        assert_eq!(m.current_bpm(), 0);
    }

    #[test]
    fn heart_stop_fires_after_timeout() {
        let mut m = monitor();
        run_steady_pulse(&mut m, 0, 3);

        // Silence: keep sampling with no beats past the 5 s timeout.
        let mut stop_events = 0;
        for i in 0..200 {
            let now = 3000 + i * 50;
            if let Some(HrEvent::HeartStop) = m.on_sample(now, IR_OK, false) {
                stop_events += 1;
            }
        }
        assert_eq!(stop_events, 1, "heart-stop must be an edge, not a level");
        assert_eq!(m.current_bpm(), 0);
    }

    #[test]
    fn heart_stop_rearms_after_beat_returns() {
        let mut m = monitor();
        run_steady_pulse(&mut m, 0, 3);

        let mut stops = 0;
        for i in 0..200 {
            if let Some(HrEvent::HeartStop) = m.on_sample(3000 + i * 50, IR_OK, false) {
                stops += 1;
            }
        }
        assert_eq!(stops, 1);

        // Pulse returns, then disappears again — second edge fires.
        run_steady_pulse(&mut m, 13_000, 3);
        for i in 0..200 {
            if let Some(HrEvent::HeartStop) = m.on_sample(16_000 + i * 50, IR_OK, false) {
                stops += 1;
            }
        }
        assert_eq!(stops, 2);
    }

    #[test]
    fn no_heart_stop_before_first_beat() {
        let mut m = monitor();
        for i in 0..400 {
            assert!(m.on_sample(i * 50, IR_OK, false).is_none());
        }
    }

    #[test]
    fn low_ir_suppresses_beat_processing() {
        let mut m = monitor();
        // Beats flagged but IR below the contact floor: ignored.
        for i in 1..40 {
            let _ = m.on_sample(i * 1000, 100.0, true);
        }
        assert_eq!(m.current_bpm(), 0);
    }

    #[test]
    fn sampling_cadence_enforced() {
        let mut m = monitor();
        assert!(m.on_sample(0, IR_OK, false).is_none());
        // 10 ms later — inside the 50 ms cadence, not even evaluated.
        assert!(m.on_sample(10, IR_OK, true).is_none());
        assert!(m.last_beat_ms.is_none());
    }
}
