//! Voice activity detection — RMS energy against a fixed threshold.
//!
//! The detector widens the audio rate budget only while the wearer is
//! likely vocalizing.  To keep noisy per-chunk decisions from churning
//! the rate limiter, evaluation runs at most once per check interval and
//! only *edges* (inactive→active, active→inactive) are reported; steady
//! states are `None`.

/// Minimum spacing between VAD evaluations, regardless of audio
/// throughput.  Bounds the CPU cost of the energy computation.
pub const VAD_CHECK_INTERVAL_MS: u32 = 100;

/// RMS amplitude of a sample window.
pub fn rms_amplitude(samples: &[i16]) -> i16 {
    if samples.is_empty() {
        return 0;
    }
    // i64 accumulator: 256 full-scale samples overflow i32.
    let sum: i64 = samples.iter().map(|&s| i64::from(s) * i64::from(s)).sum();
    let mean = sum / samples.len() as i64;
    (mean as f32).sqrt() as i16
}

/// True if window energy exceeds the given RMS threshold.
pub fn voice_active(samples: &[i16], threshold: i16) -> bool {
    rms_amplitude(samples) > threshold
}

/// A reported activity transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VadEdge {
    /// Voice detected — widen the audio rate budget.
    Active,
    /// Voice gone — fall back to the quiet budget.
    Inactive,
}

/// Edge-triggered voice activity detector.
pub struct VoiceActivityDetector {
    threshold: i16,
    last_check_ms: Option<u32>,
    active: bool,
}

impl VoiceActivityDetector {
    pub fn new(threshold: i16) -> Self {
        Self {
            threshold,
            last_check_ms: None,
            active: false,
        }
    }

    /// Current steady state.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Evaluate a window at `now_ms`.  Returns a transition if (and only
    /// if) the activity state changed; calls inside the check interval
    /// are skipped entirely.
    pub fn check(&mut self, samples: &[i16], now_ms: u32) -> Option<VadEdge> {
        if let Some(last) = self.last_check_ms {
            if now_ms.wrapping_sub(last) < VAD_CHECK_INTERVAL_MS {
                return None;
            }
        }
        self.last_check_ms = Some(now_ms);

        let active = voice_active(samples, self.threshold);
        if active == self.active {
            return None;
        }
        self.active = active;
        Some(if active {
            VadEdge::Active
        } else {
            VadEdge::Inactive
        })
    }
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_silence_is_zero() {
        assert_eq!(rms_amplitude(&[0; 64]), 0);
        assert_eq!(rms_amplitude(&[]), 0);
    }

    #[test]
    fn rms_of_constant_signal() {
        // RMS of a constant is its magnitude, sign-independent.
        assert_eq!(rms_amplitude(&[2000; 32]), 2000);
        assert_eq!(rms_amplitude(&[-2000; 32]), 2000);
    }

    #[test]
    fn rms_full_scale_does_not_overflow() {
        let r = rms_amplitude(&[i16::MIN; 256]);
        assert!(r >= 32000);
    }

    #[test]
    fn first_check_reports_active_edge() {
        let mut vad = VoiceActivityDetector::new(1500);
        let loud = [4000i16; 64];
        assert_eq!(vad.check(&loud, 0), Some(VadEdge::Active));
        assert!(vad.is_active());
    }

    #[test]
    fn checks_inside_interval_are_skipped() {
        let mut vad = VoiceActivityDetector::new(1500);
        let quiet = [0i16; 64];
        let loud = [4000i16; 64];

        assert_eq!(vad.check(&quiet, 0), None);
        // 50 ms later: inside the interval, not even evaluated.
        assert_eq!(vad.check(&loud, 50), None);
        assert!(!vad.is_active());
        // 100 ms later: evaluated, edge fires.
        assert_eq!(vad.check(&loud, 100), Some(VadEdge::Active));
    }

    #[test]
    fn steady_state_is_silent() {
        let mut vad = VoiceActivityDetector::new(1500);
        let loud = [4000i16; 64];
        assert_eq!(vad.check(&loud, 0), Some(VadEdge::Active));
        assert_eq!(vad.check(&loud, 200), None);
        assert_eq!(vad.check(&loud, 400), None);
    }

    #[test]
    fn falling_edge_reported_once() {
        let mut vad = VoiceActivityDetector::new(1500);
        let loud = [4000i16; 64];
        let quiet = [10i16; 64];

        assert_eq!(vad.check(&loud, 0), Some(VadEdge::Active));
        assert_eq!(vad.check(&quiet, 150), Some(VadEdge::Inactive));
        assert_eq!(vad.check(&quiet, 300), None);
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut vad = VoiceActivityDetector::new(1500);
        // Exactly at threshold: not active.
        assert_eq!(vad.check(&[1500i16; 64], 0), None);
        assert!(!vad.is_active());
    }
}
