//! System configuration parameters
//!
//! All tunable parameters for the beacon.  State is volatile by design —
//! values can be adjusted at runtime over the control channel but are not
//! persisted across power cycles.

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconConfig {
    // --- Heart rate ---
    /// No detected beat for this long (while worn) triggers a heart-stop alert
    pub hr_no_beat_timeout_ms: u32,
    /// Heart-rate sampling cadence (milliseconds)
    pub hr_sample_interval_ms: u32,
    /// Number of beats in the rolling BPM average
    pub hr_average_beats: usize,
    /// Minimum spacing between transmitted heart-rate samples (1 Hz throttle)
    pub hr_update_interval_ms: u32,

    // --- Fall detection ---
    /// Acceleration spike that arms fall detection (m/s², ~2.5 g)
    pub fall_spike_threshold_ms2: f32,
    /// Near-zero motion ceiling after a spike (m/s², ~0.2 g)
    pub fall_motion_threshold_ms2: f32,
    /// Required stationary duration after a spike (milliseconds)
    pub fall_stationary_time_ms: u32,
    /// IMU reading cadence (milliseconds)
    pub imu_update_interval_ms: u32,
    /// Motion magnitude that wakes the device from sleep (m/s², ~0.3 g)
    pub motion_wake_threshold_ms2: f32,

    // --- Wear detection ---
    /// IR level above which the device is definitely worn
    pub wear_ir_high: f32,
    /// IR level below which the device is definitely not worn
    pub wear_ir_low: f32,
    /// Wear check cadence (milliseconds)
    pub wear_check_interval_ms: u32,
    /// A wear state change must hold this long before it is committed
    pub wear_debounce_ms: u32,
    /// Not worn for this long starts the low-power countdown
    pub not_worn_timeout_ms: u32,

    // --- Power management ---
    /// No sleep transitions during this window after boot
    pub startup_grace_ms: u32,
    /// No link + idle for this long enters deep sleep
    pub idle_deep_sleep_ms: u32,
    /// Light sleep interval between periodic wake checks (microseconds)
    pub light_sleep_duration_us: u64,
    /// Deep sleep periodic wake interval (microseconds)
    pub wake_check_interval_us: u64,

    // --- Audio ---
    /// VAD RMS threshold (fixed, not adaptive)
    pub audio_vad_threshold: i16,
    /// Audio packet ceiling with no voice activity (packets/second)
    pub audio_rate_quiet_pps: u16,
    /// Audio packet ceiling while voice is active (packets/second)
    pub audio_rate_active_pps: u16,
    /// Capture sample rate (Hz)
    pub audio_sample_rate_hz: u32,
    /// Reduced sample rate when idle (Hz)
    pub audio_low_power_sample_rate_hz: u32,

    // --- Button ---
    /// Debounce time (milliseconds)
    pub button_debounce_ms: u32,
    /// Window for classifying a double press (milliseconds)
    pub double_press_window_ms: u32,

    // --- Link ---
    /// Scheduler statistics log cadence (milliseconds)
    pub stats_log_interval_ms: u32,
    /// NORMAL-tier dequeue wait per pump iteration (milliseconds)
    pub pump_wait_ms: u32,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        Self {
            // Heart rate
            hr_no_beat_timeout_ms: 5000,
            hr_sample_interval_ms: 50,
            hr_average_beats: 4,
            hr_update_interval_ms: 1000,

            // Fall detection
            fall_spike_threshold_ms2: 24.525, // ~2.5 g
            fall_motion_threshold_ms2: 1.962, // ~0.2 g
            fall_stationary_time_ms: 2000,
            imu_update_interval_ms: 50,
            motion_wake_threshold_ms2: 2.943, // ~0.3 g

            // Wear detection
            wear_ir_high: 10_000.0,
            wear_ir_low: 5_000.0,
            wear_check_interval_ms: 2000,
            wear_debounce_ms: 3000,
            not_worn_timeout_ms: 60_000,

            // Power
            startup_grace_ms: 30_000,
            idle_deep_sleep_ms: 30_000,
            light_sleep_duration_us: 5_000_000,
            wake_check_interval_us: 10_000_000,

            // Audio
            audio_vad_threshold: 1500,
            audio_rate_quiet_pps: 15,
            audio_rate_active_pps: 30,
            audio_sample_rate_hz: 16_000,
            audio_low_power_sample_rate_hz: 8_000,

            // Button
            button_debounce_ms: 50,
            double_press_window_ms: 1000,

            // Link
            stats_log_interval_ms: 10_000,
            pump_wait_ms: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = BeaconConfig::default();
        assert!(c.hr_no_beat_timeout_ms > c.hr_sample_interval_ms);
        assert!(c.hr_average_beats > 0);
        assert!(c.fall_stationary_time_ms > 0);
        assert!(c.audio_vad_threshold > 0);
        assert!(c.wear_debounce_ms > 0);
        assert!(c.pump_wait_ms > 0);
    }

    #[test]
    fn active_rate_above_quiet_rate() {
        let c = BeaconConfig::default();
        assert!(
            c.audio_rate_active_pps > c.audio_rate_quiet_pps,
            "voice activity must widen the audio budget, not shrink it"
        );
    }

    #[test]
    fn wear_hysteresis_band_is_open() {
        let c = BeaconConfig::default();
        assert!(
            c.wear_ir_high > c.wear_ir_low,
            "hysteresis thresholds must leave a dead band to prevent oscillation"
        );
    }

    #[test]
    fn fall_spike_above_motion_floor() {
        let c = BeaconConfig::default();
        assert!(c.fall_spike_threshold_ms2 > c.fall_motion_threshold_ms2);
        assert!(c.motion_wake_threshold_ms2 < c.fall_spike_threshold_ms2);
    }

    #[test]
    fn timing_ratios_make_sense() {
        let c = BeaconConfig::default();
        assert!(
            c.hr_sample_interval_ms < c.hr_update_interval_ms,
            "sampling must outpace the transmit throttle"
        );
        assert!(c.wear_check_interval_ms < c.not_worn_timeout_ms);
        assert!(c.startup_grace_ms >= c.idle_deep_sleep_ms);
    }

    #[test]
    fn serde_roundtrip() {
        let c = BeaconConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: BeaconConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.hr_no_beat_timeout_ms, c2.hr_no_beat_timeout_ms);
        assert!((c.fall_spike_threshold_ms2 - c2.fall_spike_threshold_ms2).abs() < 0.001);
        assert_eq!(c.audio_rate_active_pps, c2.audio_rate_active_pps);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = BeaconConfig::default();
        let bytes = postcard::to_allocvec(&c).unwrap();
        let c2: BeaconConfig = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(c.audio_rate_quiet_pps, c2.audio_rate_quiet_pps);
        assert!((c.wear_ir_high - c2.wear_ir_high).abs() < 0.001);
    }
}
